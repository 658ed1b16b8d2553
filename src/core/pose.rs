use glam::{Quat, Vec3};

use super::keyframe::{DerivedPose, KeyframePose};
use crate::math::perpendicular_up;

const EPSILON: f32 = 1e-6;

/// Screen radius, in pixels, of the look-at indicator
const LOOK_AT_INDICATOR_PX: f32 = 25.0;

/// Screen footprint of a keyframe's anchor element relative to the viewport
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Framing {
    /// Horizontal offset of the element center from the viewport center, in pixels
    pub offset_x: f32,
    /// Radius of the circle inscribed in the element, in pixels
    pub ref_radius: f32,
    pub viewport_height: f32,
}

/// Derive the camera pose that makes the target sphere exactly fill the anchor circle.
///
/// With `gamma` the half angle the sphere subtends from the camera, the
/// distance `h` to the projection plane solves
/// `tan(2γ) h² - 2R h + x (x + 2R) tan(2γ) = 0` for the circle edges
/// `x = offset - R` and `x + 2R`. The view is then turned by the horizontal
/// angle `beta` so the target lands on the element center, and the vertical
/// fov follows from `h` and the viewport height.
pub fn derive_pose(pose: &KeyframePose, framing: Framing) -> DerivedPose {
    let camera_pos = pose.camera_pos;
    let target_vec = pose.world_target_pos - camera_pos;
    let dist = target_vec.length();

    // Half angle of the target sphere
    let ratio = (pose.world_target_radius / dist.max(EPSILON)).clamp(-1.0, 1.0);
    let gamma = ratio.asin();

    let radius = framing.ref_radius;
    let diameter = 2.0 * radius;
    let x = framing.offset_x - radius;
    let tan_2gamma = (2.0 * gamma).tan();
    let disc = (diameter * diameter - 4.0 * x * (x + diameter) * tan_2gamma * tan_2gamma).max(0.0);
    let h = (diameter + disc.sqrt()) / (2.0 * tan_2gamma);

    let beta = ((framing.offset_x + radius) / h).atan() - gamma;
    let alpha = (framing.viewport_height / 2.0 / h).atan();

    let up = perpendicular_up(target_vec, pose.camera_up);
    let forward = (Quat::from_axis_angle(up, beta) * target_vec)
        .try_normalize()
        .unwrap_or(Vec3::NEG_Z);

    let px_to_world = dist / h;

    DerivedPose {
        camera_position: camera_pos,
        look_at: camera_pos + forward * dist,
        up,
        fov: (2.0 * alpha).to_degrees(),
        px_to_world,
    }
}

/// Uniform scale of the look-at indicator for a derived pose
pub fn look_at_indicator_scale(derived: &DerivedPose) -> f32 {
    LOOK_AT_INDICATOR_PX * derived.px_to_world
}
