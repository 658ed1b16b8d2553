//! Absolute-time timers for the measurement schedule.
//! Every method takes the host's monotonic `now` in seconds; none of them
//! reads a clock on its own.

/// Throttle window - at most one fire per `interval`
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: f32,
    last_fire: Option<f32>,
}

impl Throttle {
    /// Create a throttle that is open immediately
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            last_fire: None,
        }
    }

    /// Time left until the window reopens; zero when open
    pub fn remaining(&self, now: f32) -> f32 {
        match self.last_fire {
            Some(last) => (self.interval - (now - last)).max(0.0),
            None => 0.0,
        }
    }

    pub fn is_open(&self, now: f32) -> bool {
        self.remaining(now) <= 0.0
    }

    /// Record a fire at `now`, closing the window
    pub fn fire(&mut self, now: f32) {
        self.last_fire = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// Repeating timer - due once per `period` while started
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: f32,
    next_due: Option<f32>,
}

impl Interval {
    /// Create a stopped interval
    pub fn new(period: f32) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true once per elapsed period; missed periods collapse into one fire
    pub fn poll(&mut self, now: f32) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

/// One-shot timer - fires once at an absolute time unless cancelled
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<f32>,
}

impl Deadline {
    /// Arm the deadline, replacing any pending one
    pub fn set(&mut self, at: f32) {
        self.at = Some(at);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    /// Returns true, disarming the deadline, once `now` has reached it
    pub fn take_due(&mut self, now: f32) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}
