/// Geometry primitives for 3D rendering
use crate::decal::TextureHandle;
use crate::math::{point, try_normalize_eps, Vec3, Vec4};

/// Texture coordinates given to triangles that do not carry their own: the
/// first three corners of a full decal.
pub fn default_uv() -> [Vec3; 3] {
    [
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ]
}

/// A triangle face with flat shading.
///
/// `points` are homogeneous positions; `uv` holds `(u, v, w)` per corner,
/// where `w` is the perspective weight used once the triangle has been
/// projected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [Vec4; 3],
    pub uv: [Vec3; 3],
    /// Lighting intensity in `[0, 1]`.
    pub shade: f32,
    pub texture: Option<TextureHandle>,
}

impl Triangle {
    pub fn new(p1: Vec4, p2: Vec4, p3: Vec4) -> Self {
        Self {
            points: [p1, p2, p3],
            uv: default_uv(),
            shade: 1.0,
            texture: None,
        }
    }

    pub fn from_positions(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self::new(
            point(p1.x, p1.y, p1.z),
            point(p2.x, p2.y, p2.z),
            point(p3.x, p3.y, p3.z),
        )
    }

    pub fn with_uv(mut self, uv: [Vec3; 3]) -> Self {
        self.uv = uv;
        self
    }

    /// Same shading and texture, different corners.
    pub fn with_points(&self, points: [Vec4; 3], uv: [Vec3; 3]) -> Self {
        Self {
            points,
            uv,
            shade: self.shade,
            texture: self.texture,
        }
    }

    /// Unit face normal, `cross(p2 - p1, p3 - p1)`.
    ///
    /// `None` for degenerate (zero-area) faces.
    pub fn normal(&self) -> Option<Vec3> {
        let [p1, p2, p3] = self.points;
        let edge1 = p2.xyz() - p1.xyz();
        let edge2 = p3.xyz() - p1.xyz();
        try_normalize_eps(&edge1.cross(&edge2))
    }

    /// Mean z of the three corners.
    pub fn mean_depth(&self) -> f32 {
        (self.points[0].z + self.points[1].z + self.points[2].z) / 3.0
    }

    pub fn area(&self) -> f32 {
        let [p1, p2, p3] = self.points;
        (p2.xyz() - p1.xyz()).cross(&(p3.xyz() - p1.xyz())).norm() * 0.5
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Attach `texture` to every triangle.
    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        for t in &mut self.triangles {
            t.texture = texture;
        }
        self
    }

    /// Axis-aligned cube centred on the origin with outward facing normals.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let v = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
        let quad_uv_a = [
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ];
        let quad_uv_b = [
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];

        // Each face as its four corners, counter-clockwise seen from outside.
        let faces = [
            // Front (+z)
            [v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
            // Back (-z)
            [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            // Top (+y)
            [v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.)],
            // Bottom (-y)
            [v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.)],
            // Right (+x)
            [v(1., -1., 1.), v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.)],
            // Left (-x)
            [v(-1., -1., -1.), v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.)],
        ];

        let mut mesh = Self::with_capacity(faces.len() * 2);
        for [a, b, c, d] in faces {
            mesh.add_triangle(Triangle::from_positions(a, b, c).with_uv(quad_uv_a));
            mesh.add_triangle(Triangle::from_positions(a, c, d).with_uv(quad_uv_b));
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3;

    #[test]
    fn test_normal_of_ccw_triangle() {
        let t = Triangle::from_positions(vec3(0., 0., 0.), vec3(1., 0., 0.), vec3(0., 1., 0.));
        let n = t.normal().expect("non-degenerate");
        assert!((n - vec3(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let t = Triangle::from_positions(vec3(0., 0., 0.), vec3(1., 1., 1.), vec3(2., 2., 2.));
        assert!(t.normal().is_none());
        assert_eq!(t.area(), 0.0);
    }

    #[test]
    fn test_mean_depth_and_area() {
        let t = Triangle::from_positions(vec3(0., 0., 3.), vec3(2., 0., 3.), vec3(0., 2., 6.));
        assert!((t.mean_depth() - 4.0).abs() < 1e-6);

        let flat = Triangle::from_positions(vec3(0., 0., 0.), vec3(2., 0., 0.), vec3(0., 2., 0.));
        assert!((flat.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.len(), 12);
        for t in &mesh.triangles {
            let n = t.normal().expect("cube faces are not degenerate");
            let centre = (t.points[0].xyz() + t.points[1].xyz() + t.points[2].xyz()) / 3.0;
            assert!(n.dot(&centre) > 0.0, "inward normal {} at {}", n, centre);
        }
    }

    #[test]
    fn test_with_texture_tags_every_triangle() {
        let handle = TextureHandle {
            id: 3,
            width: 8,
            height: 8,
        };
        let mesh = Mesh::cube(1.0).with_texture(Some(handle));
        assert!(mesh.triangles.iter().all(|t| t.texture == Some(handle)));
    }
}
