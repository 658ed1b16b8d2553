mod callbacks;
mod debug;
mod engine;
mod keyframe;
mod pose;
mod registry;
mod selection;
pub mod timer;
mod tracker;

pub use callbacks::UpdateCallback;
pub use engine::{HostContext, Wirecam};
pub use keyframe::{
    DerivedPose, ElementTarget, KeyframeHook, KeyframeLiveValues, KeyframeOptions, KeyframePose,
    KeyframeSpec,
};
pub use pose::{derive_pose, look_at_indicator_scale, Framing};
pub use selection::{select_active_pair, ActivePair, Candidate};
pub use tracker::{ElementWatch, PositionTracker};
