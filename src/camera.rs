use glam::{Mat4, Quat, Vec3};

use crate::traits::CameraRig;

pub const DEFAULT_FOV: f32 = 50.0;
pub const MIN_FOV: f32 = 0.01;
pub const MAX_FOV: f32 = 179.0;

/// Perspective camera driven by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    /// Projection computed by the last `update_projection`
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Project a world point to normalized device coordinates
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.view_projection().project_point3(point)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV, 1.0, 0.1, 2000.0)
    }
}

impl CameraRig for PerspectiveCamera {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    fn set_fov(&mut self, fov_degrees: f32) {
        self.fov = fov_degrees;
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn update_projection(&mut self) {
        // Degenerate keyframe geometry can produce out-of-range fovs
        let fov = if self.fov.is_finite() {
            self.fov.clamp(MIN_FOV, MAX_FOV)
        } else {
            DEFAULT_FOV
        };
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        self.projection = Mat4::perspective_rh(fov.to_radians(), aspect, self.near, self.far);
    }
}
