/// Triangle clipping against planes.
///
/// A single routine splits a triangle by a plane into zero, one or two
/// triangles on the side the normal points to. It is used for the near plane
/// in view space and for the four screen edges after projection.

use crate::geometry::Triangle;
use crate::math::{Vec3, Vec4};

/// Plane through `point` with unit `normal`; the normal side is "inside".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// `normal` is normalised here. A zero normal yields NaN distances, which
    /// classify every vertex as outside.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Plane `z = near` facing away from the eye.
    pub fn near(near: f32) -> Self {
        Self::new(Vec3::new(0.0, 0.0, near), Vec3::new(0.0, 0.0, 1.0))
    }

    pub fn signed_distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(p) - self.normal.dot(&self.point)
    }

    /// Parameter `t` along `start -> end` where the segment meets the plane.
    pub fn intersect_t(&self, start: &Vec3, end: &Vec3) -> f32 {
        let plane_d = -self.normal.dot(&self.point);
        let ad = start.dot(&self.normal);
        let bd = end.dot(&self.normal);
        (-plane_d - ad) / (bd - ad)
    }

    /// Intersection point of `start -> end` with the plane, and its `t`.
    pub fn intersect(&self, start: &Vec3, end: &Vec3) -> (Vec3, f32) {
        let t = self.intersect_t(start, end);
        (start + (end - start) * t, t)
    }
}

/// Output of clipping one triangle against one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clipped {
    None,
    One(Triangle),
    Two(Triangle, Triangle),
}

impl Clipped {
    pub fn len(&self) -> usize {
        match self {
            Clipped::None => 0,
            Clipped::One(_) => 1,
            Clipped::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Clipped::None)
    }
}

impl IntoIterator for Clipped {
    type Item = Triangle;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<Triangle>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let pair = match self {
            Clipped::None => [None, None],
            Clipped::One(a) => [Some(a), None],
            Clipped::Two(a, b) => [Some(a), Some(b)],
        };
        pair.into_iter().flatten()
    }
}

/// Corner of a triangle being clipped: position plus texture coordinate.
#[derive(Debug, Clone, Copy)]
struct Corner {
    point: Vec4,
    uv: Vec3,
}

impl Corner {
    /// Point where the edge `self -> other` crosses `plane`.
    fn towards(&self, other: &Corner, plane: &Plane) -> Corner {
        let t = plane.intersect_t(&self.point.xyz(), &other.point.xyz());
        Corner {
            point: self.point + (other.point - self.point) * t,
            uv: self.uv + (other.uv - self.uv) * t,
        }
    }
}

/// Split `tri` by `plane`, keeping the part on the normal side.
///
/// Shade and texture are copied to every output triangle. A triangle with
/// all three corners inside comes back unchanged.
pub fn clip_triangle(plane: &Plane, tri: &Triangle) -> Clipped {
    let mut inside = [Corner {
        point: Vec4::zeros(),
        uv: Vec3::zeros(),
    }; 3];
    let mut outside = inside;
    let (mut n_in, mut n_out) = (0, 0);

    for i in 0..3 {
        let corner = Corner {
            point: tri.points[i],
            uv: tri.uv[i],
        };
        if plane.signed_distance(&corner.point.xyz()) >= 0.0 {
            inside[n_in] = corner;
            n_in += 1;
        } else {
            outside[n_out] = corner;
            n_out += 1;
        }
    }

    let make = |a: Corner, b: Corner, c: Corner| {
        tri.with_points([a.point, b.point, c.point], [a.uv, b.uv, c.uv])
    };

    match n_in {
        3 => Clipped::One(*tri),
        1 => {
            let a = inside[0];
            Clipped::One(make(
                a,
                a.towards(&outside[0], plane),
                a.towards(&outside[1], plane),
            ))
        }
        2 => {
            let (a, b) = (inside[0], inside[1]);
            let ab = a.towards(&outside[0], plane);
            let bb = b.towards(&outside[0], plane);
            Clipped::Two(make(a, b, ab), make(b, ab, bb))
        }
        _ => Clipped::None,
    }
}

/// The four screen-edge planes in clipping order: top, bottom, left, right.
pub fn screen_planes(width: f32, height: f32) -> [Plane; 4] {
    [
        Plane::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        Plane::new(Vec3::new(0.0, height - 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        Plane::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        Plane::new(Vec3::new(width - 1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    ]
}

/// Clips screen-space triangles to the viewport rectangle.
///
/// Each plane pass reads from one buffer and writes to the other; both
/// buffers are kept between calls so steady-state clipping does not
/// allocate.
#[derive(Debug, Clone)]
pub struct ScreenClipper {
    planes: [Plane; 4],
    current: Vec<Triangle>,
    next: Vec<Triangle>,
}

impl ScreenClipper {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            planes: screen_planes(width, height),
            current: Vec::with_capacity(16),
            next: Vec::with_capacity(16),
        }
    }

    /// Fragments of `tri` inside the screen. The slice is valid until the
    /// next call.
    pub fn clip(&mut self, tri: &Triangle) -> &[Triangle] {
        self.current.clear();
        self.current.push(*tri);

        for plane in &self.planes {
            self.next.clear();
            for t in &self.current {
                self.next.extend(clip_triangle(plane, t));
            }
            std::mem::swap(&mut self.current, &mut self.next);
            if self.current.is_empty() {
                break;
            }
        }

        &self.current
    }
}
