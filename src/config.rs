use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sampling cadence of the position tracker, in seconds
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum spacing between two measurement passes
    pub throttle_interval: f32,
    /// Time constant of the exponential smoothing applied to samples
    pub smoothing_time: f32,
    /// Period of the fallback pass that runs without scroll or resize events
    pub fallback_interval: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let throttle_interval = 0.033;
        Self {
            throttle_interval,
            smoothing_time: 2.0 * throttle_interval,
            fallback_interval: 1.0,
        }
    }
}

/// Values used for keyframe attributes left unset at registration
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeDefaults {
    pub camera_pos: Vec3,
    pub camera_up: Vec3,
    pub world_target_pos: Vec3,
    pub world_target_radius: f32,
    pub ease_in: bool,
    pub ease_out: bool,
}

impl Default for KeyframeDefaults {
    fn default() -> Self {
        Self {
            camera_pos: Vec3::ZERO,
            camera_up: Vec3::Y,
            world_target_pos: Vec3::Z,
            world_target_radius: 1.0,
            ease_in: true,
            ease_out: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WirecamOptions {
    /// Start the frame loop on construction
    pub auto_start: bool,
    /// Show the debug overlay
    pub debug: bool,
    pub keyframe_defaults: KeyframeDefaults,
}

impl Default for WirecamOptions {
    fn default() -> Self {
        Self {
            auto_start: true,
            debug: false,
            keyframe_defaults: KeyframeDefaults::default(),
        }
    }
}
