use log::debug;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::timer::{Deadline, Interval, Throttle};
use crate::config::TrackerConfig;
use crate::traits::{Document, Element, FrameScheduler};
use crate::types::{Rect, Roi};

/// Shared, throttled screen-position tracker.
///
/// One tracker serves every watched element of a host. Tracking (listeners
/// and fallback timer) starts with the first [`ElementWatch`] and stops when
/// the last one is dropped. All elements are measured together in a single
/// pass, at most once per throttle window; callers read the latest smoothed
/// result through [`ElementWatch::sample`] and never wait for a pass.
#[derive(Clone)]
pub struct PositionTracker {
    hub: Rc<RefCell<TrackerHub>>,
}

struct TrackerHub {
    document: Rc<dyn Document>,
    scheduler: Rc<dyn FrameScheduler>,
    config: TrackerConfig,
    watches: BTreeMap<u64, WatchState>,
    next_id: u64,
    running: bool,
    pass_scheduled: bool,
    throttle: Throttle,
    deferred: Deadline,
    fallback: Interval,
    passes: u64,
}

struct WatchState {
    element: Weak<dyn Element>,
    target: Roi,
    current: Roi,
    last_sample: Option<f32>,
}

impl PositionTracker {
    pub fn new(
        document: Rc<dyn Document>,
        scheduler: Rc<dyn FrameScheduler>,
        config: TrackerConfig,
    ) -> Self {
        let hub = TrackerHub {
            document,
            scheduler,
            config,
            watches: BTreeMap::new(),
            next_id: 0,
            running: false,
            pass_scheduled: false,
            throttle: Throttle::new(config.throttle_interval),
            deferred: Deadline::default(),
            fallback: Interval::new(config.fallback_interval),
            passes: 0,
        };
        Self {
            hub: Rc::new(RefCell::new(hub)),
        }
    }

    /// Start watching `element`; tracking stops when the returned handle is dropped
    pub fn watch(&self, element: Weak<dyn Element>) -> ElementWatch {
        let mut hub = self.hub.borrow_mut();
        let id = hub.next_id;
        hub.next_id += 1;
        hub.watches.insert(
            id,
            WatchState {
                element,
                target: Roi::default(),
                current: Roi::default(),
                last_sample: None,
            },
        );
        hub.start();
        hub.schedule_pass();

        ElementWatch {
            hub: Rc::clone(&self.hub),
            id,
        }
    }

    /// Scroll or resize happened at `now`; coalesced into at most one pass per window
    pub fn notify(&self, now: f32) {
        self.hub.borrow_mut().request_update(now);
    }

    /// Advance timers and run the pending measurement pass, if any
    pub fn pump(&self, now: f32) {
        self.hub.borrow_mut().pump(now);
    }

    pub fn watch_count(&self) -> usize {
        self.hub.borrow().watches.len()
    }

    /// Whether global tracking (listeners and fallback timer) is active
    pub fn is_running(&self) -> bool {
        self.hub.borrow().running
    }

    /// Number of measurement passes run so far
    pub fn pass_count(&self) -> u64 {
        self.hub.borrow().passes
    }

    pub fn config(&self) -> TrackerConfig {
        self.hub.borrow().config
    }
}

impl TrackerHub {
    fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.document.set_scroll_listening(true);
        debug!("PositionTracker: tracking started");
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.document.set_scroll_listening(false);
        self.fallback.stop();
        self.throttle.reset();
        self.deferred.cancel();
        self.pass_scheduled = false;
        debug!("PositionTracker: tracking stopped");
    }

    fn release(&mut self, id: u64) {
        self.watches.remove(&id);
        if self.watches.is_empty() {
            self.stop();
        }
    }

    fn schedule_pass(&mut self) {
        if !self.pass_scheduled {
            self.pass_scheduled = true;
            self.scheduler.request_frame();
        }
    }

    fn request_update(&mut self, now: f32) {
        if !self.running {
            return;
        }

        if self.throttle.is_open(now) {
            self.throttle.fire(now);
            self.schedule_pass();
        } else if !self.pass_scheduled {
            // Defer to the end of the window; a newer request replaces the pending one
            self.deferred.set(now + self.throttle.remaining(now));
        }
    }

    fn pump(&mut self, now: f32) {
        if !self.running {
            return;
        }

        if self.deferred.take_due(now) {
            self.throttle.fire(now);
            self.schedule_pass();
        }

        if !self.fallback.is_active() {
            self.fallback.start(now);
        } else if self.fallback.poll(now) {
            self.request_update(now);
        }

        if self.pass_scheduled {
            // Every pass closes the window, including the one a new watch schedules
            self.pass_scheduled = false;
            self.throttle.fire(now);
            self.measure_all();
        }
    }

    fn measure_all(&mut self) {
        let viewport = self.document.viewport_size();
        for watch in self.watches.values_mut() {
            let rect = match watch.element.upgrade() {
                Some(element) if element.is_connected() => element.bounding_rect(),
                _ => Rect::default(),
            };
            watch.target = Roi::measure(rect, viewport);
        }
        self.passes += 1;
    }

    fn sample(&mut self, id: u64, now: f32) -> Roi {
        let smoothing_time = self.config.smoothing_time;
        let Some(watch) = self.watches.get_mut(&id) else {
            return Roi::default();
        };

        let alpha = match watch.last_sample {
            Some(last) if smoothing_time > 0.0 => {
                let dt = (now - last).max(0.0);
                1.0 - (-dt / smoothing_time).exp()
            }
            _ => 1.0,
        };
        watch.last_sample = Some(now);
        watch.current = watch.current.lerp(&watch.target, alpha);
        watch.current
    }
}

/// Handle on one watched element; releases the watch when dropped
pub struct ElementWatch {
    hub: Rc<RefCell<TrackerHub>>,
    id: u64,
}

impl ElementWatch {
    /// Latest measurement, exponentially smoothed towards the last pass result
    pub fn sample(&self, now: f32) -> Roi {
        self.hub.borrow_mut().sample(self.id, now)
    }
}

impl Drop for ElementWatch {
    fn drop(&mut self) {
        self.hub.borrow_mut().release(self.id);
    }
}
