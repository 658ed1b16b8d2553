pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod error;
pub mod math;
pub mod sim;
pub mod traits;
pub mod types;

pub use camera::PerspectiveCamera;
pub use config::{KeyframeDefaults, TrackerConfig, WirecamOptions};
pub use crate::core::{HostContext, KeyframeSpec, Wirecam};
pub use error::WirecamError;
