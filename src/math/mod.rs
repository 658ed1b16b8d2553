mod easing;
mod rotation;

pub use easing::{ease, lerp, Easing};
pub use rotation::{look_rotation, perpendicular_up};
