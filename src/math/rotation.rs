use glam::{Mat3, Quat, Vec3};

const EPSILON: f32 = 1e-6;

/// Up vector perpendicular to `forward`, biased towards `nominal_up`.
/// Falls back to other reference axes when `forward` is colinear with `nominal_up`.
pub fn perpendicular_up(forward: Vec3, nominal_up: Vec3) -> Vec3 {
    let mut right = forward.cross(nominal_up);
    if right.length() < EPSILON {
        right = forward.cross(Vec3::ONE);
        if right.length_squared() < EPSILON {
            right = forward.cross(Vec3::Y);
        }
    }

    right
        .cross(forward)
        .try_normalize()
        .unwrap_or_else(|| nominal_up.try_normalize().unwrap_or(Vec3::Y))
}

/// Orientation of an object at `eye` whose -Z axis points at `target`
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let mut z = eye - target;
    if z.length_squared() == 0.0 {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // up is parallel to the view axis; nudge the axis off it
        if (up.z.abs() - 1.0).abs() < EPSILON {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.try_normalize().unwrap_or(Vec3::X);
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}
