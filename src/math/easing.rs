/// Linear interpolation, exact at both endpoints
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Blend curve selected by a keyframe pair's ease flags
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in, `t²`
    In,
    /// Quadratic ease-out, `t(2 - t)`
    Out,
    /// Smootherstep, `6t⁵ - 15t⁴ + 10t³`
    InOut,
}

impl Easing {
    pub const fn from_flags(ease_in: bool, ease_out: bool) -> Self {
        match (ease_in, ease_out) {
            (true, true) => Easing::InOut,
            (true, false) => Easing::In,
            (false, true) => Easing::Out,
            (false, false) => Easing::Linear,
        }
    }

    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::InOut => t * t * t * (t * (6.0 * t - 15.0) + 10.0),
            Easing::In => t * t,
            Easing::Out => t * (2.0 - t),
            Easing::Linear => t,
        }
    }
}

/// Eases `t` with the curve chosen by the two flags
pub fn ease(t: f32, ease_in: bool, ease_out: bool) -> f32 {
    Easing::from_flags(ease_in, ease_out).apply(t)
}
