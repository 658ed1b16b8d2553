use glam::{Quat, Vec3};

/// Mutable perspective camera owned by the rendering host
pub trait CameraRig {
    /// Set the camera position in world space
    fn set_position(&mut self, position: Vec3);

    /// Set the camera orientation; the camera looks down its local -Z axis
    fn set_orientation(&mut self, orientation: Quat);

    /// Set the vertical field of view in degrees
    fn set_fov(&mut self, fov_degrees: f32);

    /// Set the viewport aspect ratio (width / height)
    fn set_aspect(&mut self, aspect: f32);

    /// Recompute the projection after the setters above
    fn update_projection(&mut self);
}
