/// Vector aliases and small numeric helpers shared by the pipeline.
///
/// Vector arithmetic, dot/cross products, magnitude and `Display` come from
/// nalgebra's generic `Vector2<T>` / `Vector3<T>`. Positions that pass
/// through the projective part of the pipeline are homogeneous `Vector4`s.

use nalgebra::{Vector2, Vector3, Vector4};

pub type Vec2 = Vector2<f32>;
pub type Vec3 = Vector3<f32>;
/// Homogeneous position, `w = 1` for points in model/world/view space.
pub type Vec4 = Vector4<f32>;

/// Magnitude below which a vector is treated as zero length.
pub const NORMAL_EPSILON: f32 = 1e-6;

pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Homogeneous point with `w = 1`.
pub fn point(x: f32, y: f32, z: f32) -> Vec4 {
    Vec4::new(x, y, z, 1.0)
}

pub fn radians(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Unit vector in the direction of `v`, or `None` if `v` is (close to) zero.
///
/// `Vector3::normalize` divides by the magnitude unconditionally and yields
/// NaN components for a zero vector; use this wherever the input may be
/// degenerate.
pub fn try_normalize_eps(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(NORMAL_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_has_unit_length() {
        let samples = [
            vec3(1.0, 0.0, 0.0),
            vec3(3.0, 4.0, 0.0),
            vec3(-2.5, 7.0, 0.25),
            vec3(1e-3, -1e-3, 2e-3),
            vec3(1000.0, -2000.0, 500.0),
        ];
        for v in samples {
            let n = v.normalize();
            assert!((n.magnitude() - 1.0).abs() < 1e-5, "{} -> {}", v, n);
        }
    }

    #[test]
    fn test_try_normalize_rejects_zero() {
        assert!(try_normalize_eps(&Vec3::zeros()).is_none());
        assert!(try_normalize_eps(&vec3(0.0, 2.0, 0.0)).is_some());
    }

    #[test]
    fn test_zero_normalize_propagates_nan() {
        let n = Vec3::zeros().normalize();
        assert!(n.x.is_nan());
    }

    #[test]
    fn test_cross_follows_right_hand_rule() {
        let z = vec3(1.0, 0.0, 0.0).cross(&vec3(0.0, 1.0, 0.0));
        assert!((z - vec3(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_radians() {
        assert!((radians(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((radians(90.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_display() {
        let s = format!("{}", vec3(1.0, 2.0, 3.0));
        assert!(s.contains('1') && s.contains('2') && s.contains('3'));
    }
}
