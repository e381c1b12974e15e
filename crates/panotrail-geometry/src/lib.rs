pub mod frustum;
pub mod ray;
pub mod transform;

use cgmath::{InnerSpace, Zero};

pub use cgmath;
pub use frustum::Frustum;
pub use ray::{Plane, Ray};
pub use transform::{
    TransformParts, compose, decompose, from_row_major, look_rotation, to_row_major,
};

pub type Vec3 = cgmath::Vector3<f64>;
pub type Vec4 = cgmath::Vector4<f64>;
pub type Point3 = cgmath::Point3<f64>;
pub type Mat3 = cgmath::Matrix3<f64>;
pub type Mat4 = cgmath::Matrix4<f64>;
pub type Quat = cgmath::Quaternion<f64>;

pub fn normalized(v: Vec3) -> Vec3 {
    let len = v.magnitude();
    if len <= f64::EPSILON {
        Vec3::zero()
    } else {
        v / len
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Field of view at the end of a move of length `distance`.
///
/// The factor `min(d, 1/d)` never exceeds one, so the view narrows for any
/// move other than a unit step. Degenerate distances leave the view unchanged.
pub fn transition_fov(start_fov: f64, distance: f64) -> f64 {
    if !(distance.is_finite() && distance > 0.0) {
        return start_fov;
    }
    start_fov * distance.min(1.0 / distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ease_is_clamped_and_symmetric() {
        assert_eq!(ease_in_out(-1.0), 0.0);
        assert_eq!(ease_in_out(2.0), 1.0);
        assert_relative_eq!(ease_in_out(0.5), 0.5);
        assert_relative_eq!(ease_in_out(0.25) + ease_in_out(0.75), 1.0);
    }

    #[test]
    fn fov_unchanged_for_unit_step() {
        assert_relative_eq!(transition_fov(60.0, 1.0), 60.0);
    }

    #[test]
    fn fov_shrinks_away_from_unit_step() {
        assert_relative_eq!(transition_fov(60.0, 2.0), 30.0);
        assert_relative_eq!(transition_fov(60.0, 0.5), 30.0);
        assert!(transition_fov(60.0, 3.0) < transition_fov(60.0, 2.0));
        assert!(transition_fov(60.0, 0.25) < transition_fov(60.0, 0.5));
    }

    #[test]
    fn fov_ignores_degenerate_distance() {
        assert_eq!(transition_fov(60.0, 0.0), 60.0);
        assert_eq!(transition_fov(60.0, f64::NAN), 60.0);
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(normalized(Vec3::zero()), Vec3::zero());
        assert_relative_eq!(normalized(Vec3::new(3.0, 0.0, 4.0)).magnitude(), 1.0);
    }
}
