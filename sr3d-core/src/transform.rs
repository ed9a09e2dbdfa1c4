/// 4x4 transformation matrices and rotation state.
///
/// Matrices use the row-vector convention: a point transforms as `p' = p · M`,
/// the translation sits in row 3, and `Transform::compose(a, b)` applies `a`
/// first and `b` second.

use nalgebra::Matrix4;

use crate::math::{radians, Vec3, Vec4};

pub type Mat4 = Matrix4<f32>;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Matrix builders for the row-vector pipeline
pub struct Transform;

impl Transform {
    pub fn identity() -> Mat4 {
        Mat4::identity()
    }

    /// `a` then `b`.
    pub fn compose(a: &Mat4, b: &Mat4) -> Mat4 {
        a * b
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        )
    }

    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_z(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotate about X first, then Y, then Z.
    pub fn rotation_xyz(x: f32, y: f32, z: f32) -> Mat4 {
        Self::rotation_x(x) * Self::rotation_y(y) * Self::rotation_z(z)
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Mat4 {
        Self::rotation_xyz(rotation.x, rotation.y, rotation.z)
    }

    /// Model-to-world matrix: rotate in place, then move to `offset`.
    pub fn world_matrix(rotation: &RotationState, offset: &Vec3) -> Mat4 {
        Self::rotation_matrix(rotation) * Self::translation(offset.x, offset.y, offset.z)
    }

    /// Camera-to-world matrix looking from `eye` towards `target`.
    ///
    /// Rows are right, up, forward and the eye position. `up` is
    /// re-orthogonalised against the forward axis before the right axis is
    /// derived from it.
    pub fn point_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let up = (up - forward * up.dot(&forward)).normalize();
        let right = up.cross(&forward);

        Mat4::new(
            right.x, right.y, right.z, 0.0, //
            up.x, up.y, up.z, 0.0, //
            forward.x, forward.y, forward.z, 0.0, //
            eye.x, eye.y, eye.z, 1.0,
        )
    }

    /// Inverse of a matrix built by [`Transform::point_at`].
    ///
    /// Only valid for an orthonormal rotation block plus translation; this is
    /// not a general 4x4 inverse.
    pub fn quick_inverse(m: &Mat4) -> Mat4 {
        let mut inv = Mat4::identity();
        for row in 0..3 {
            for col in 0..3 {
                inv[(row, col)] = m[(col, row)];
            }
        }
        for col in 0..3 {
            inv[(3, col)] = -(m[(3, 0)] * inv[(0, col)]
                + m[(3, 1)] * inv[(1, col)]
                + m[(3, 2)] * inv[(2, col)]);
        }
        inv
    }

    /// Perspective projection for a finite far plane.
    ///
    /// `fov` is the vertical field of view in degrees and `aspect` is
    /// height / width. Depth maps to `[0, 1]` after the divide by `w`, which
    /// receives the view-space z through `m[2][3] = 1`.
    pub fn projection(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (radians(fov) * 0.5).tan();
        let q = far / (far - near);

        Mat4::new(
            aspect * f, 0.0, 0.0, 0.0, //
            0.0, f, 0.0, 0.0, //
            0.0, 0.0, q, 1.0, //
            0.0, 0.0, -near * q, 0.0,
        )
    }

    /// Row vector times matrix.
    pub fn apply(p: &Vec4, m: &Mat4) -> Vec4 {
        m.tr_mul(p)
    }

    /// Transform a direction; translation is ignored.
    pub fn apply_dir(v: &Vec3, m: &Mat4) -> Vec3 {
        Self::apply(&Vec4::new(v.x, v.y, v.z, 0.0), m).xyz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{point, vec3};
    use std::f32::consts::FRAC_PI_2;

    fn sample_matrix() -> Mat4 {
        Transform::rotation_xyz(0.3, -1.1, 2.0) * Transform::translation(1.0, -2.0, 3.5)
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_compose_with_identity() {
        let m = sample_matrix();
        let id = Transform::identity();
        assert!((Transform::compose(&m, &id) - m).norm() < 1e-6);
        assert!((Transform::compose(&id, &m) - m).norm() < 1e-6);
    }

    #[test]
    fn test_compose_is_not_commutative() {
        let r = Transform::rotation_y(FRAC_PI_2);
        let t = Transform::translation(5.0, 0.0, 0.0);
        let rt = Transform::apply(&point(0.0, 0.0, 0.0), &Transform::compose(&r, &t));
        let tr = Transform::apply(&point(0.0, 0.0, 0.0), &Transform::compose(&t, &r));
        assert!((rt - point(5.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((tr - point(0.0, 0.0, 5.0)).norm() < 1e-5);
    }

    #[test]
    fn test_translation_moves_points_not_directions() {
        let t = Transform::translation(1.0, 2.0, 3.0);
        let p = Transform::apply(&point(1.0, 1.0, 1.0), &t);
        assert!((p - point(2.0, 3.0, 4.0)).norm() < 1e-6);
        let d = Transform::apply_dir(&vec3(1.0, 1.0, 1.0), &t);
        assert!((d - vec3(1.0, 1.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_axis_rotations() {
        // Quarter turns with the row-vector convention.
        let y = Transform::apply(&point(1.0, 0.0, 0.0), &Transform::rotation_y(FRAC_PI_2));
        assert!((y - point(0.0, 0.0, 1.0)).norm() < 1e-5);

        let x = Transform::apply(&point(0.0, 1.0, 0.0), &Transform::rotation_x(FRAC_PI_2));
        assert!((x - point(0.0, 0.0, 1.0)).norm() < 1e-5);

        let z = Transform::apply(&point(1.0, 0.0, 0.0), &Transform::rotation_z(FRAC_PI_2));
        assert!((z - point(0.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_xyz_order() {
        let (x, y, z) = (0.4, 0.9, -0.7);
        let p = point(0.2, -1.0, 3.0);
        let stepwise = Transform::apply(
            &Transform::apply(
                &Transform::apply(&p, &Transform::rotation_x(x)),
                &Transform::rotation_y(y),
            ),
            &Transform::rotation_z(z),
        );
        let combined = Transform::apply(&p, &Transform::rotation_xyz(x, y, z));
        assert!((stepwise - combined).norm() < 1e-5);
    }

    #[test]
    fn test_point_at_inverse_is_identity() {
        let eye = vec3(3.0, 1.5, -4.0);
        let target = vec3(-1.0, 0.5, 2.0);
        let up = vec3(0.0, 1.0, 0.0);

        let camera = Transform::point_at(&eye, &target, &up);
        let view = Transform::quick_inverse(&camera);

        assert!((view * camera - Mat4::identity()).norm() < 1e-5);
        assert!((camera * view - Mat4::identity()).norm() < 1e-5);
    }

    #[test]
    fn test_view_places_target_on_forward_axis() {
        let eye = vec3(0.0, 2.0, 0.0);
        let target = vec3(0.0, 2.0, 10.0);
        let view = Transform::quick_inverse(&Transform::point_at(&eye, &target, &vec3(0.0, 1.0, 0.0)));
        let p = Transform::apply(&point(0.0, 2.0, 10.0), &view);
        assert!((p - point(0.0, 0.0, 10.0)).norm() < 1e-5);
    }

    #[test]
    fn test_projection_of_axis_point() {
        let proj = Transform::projection(90.0, 1.0, 0.1, 100.0);
        let clip = Transform::apply(&point(0.0, 0.0, 10.0), &proj);
        assert!((clip.w - 10.0).abs() < 1e-5);

        let ndc = clip / clip.w;
        assert!(ndc.iter().all(|c| c.is_finite()));
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_projection_depth_range() {
        let proj = Transform::projection(90.0, 1.0, 0.1, 100.0);
        let near = Transform::apply(&point(0.0, 0.0, 0.1), &proj);
        let far = Transform::apply(&point(0.0, 0.0, 100.0), &proj);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }
}
