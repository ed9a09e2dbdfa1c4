/// Per-frame geometry pipeline.
///
/// For each model triangle: world transform, back-face cull, flat lighting,
/// view transform, near-plane clip, projection with perspective divide,
/// viewport mapping. The survivors are sorted far-to-near (there is no depth
/// buffer), clipped to the screen rectangle and emitted as decal quads.

use tracing::trace;

use crate::camera::CameraState;
use crate::clip::{clip_triangle, Plane, ScreenClipper};
use crate::config::{Lighting, RendererConfig};
use crate::decal::{DecalQuad, DecalSink};
use crate::geometry::{Mesh, Triangle};
use crate::math::{Vec3, Vec4};
use crate::transform::{Mat4, Transform};

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Model triangles considered.
    pub input: usize,
    /// Zero-area faces skipped before culling.
    pub degenerate: usize,
    /// Faces pointing away from the camera.
    pub culled: usize,
    /// Faces entirely behind the near plane.
    pub near_rejected: usize,
    /// Projected triangles handed to the depth sort.
    pub projected: usize,
    /// Screen fragments submitted to the sink.
    pub emitted: usize,
}

pub struct Pipeline {
    projection: Mat4,
    near: Plane,
    width: f32,
    height: f32,
    light: Vec3,
    lighting: Lighting,
    to_raster: Vec<Triangle>,
    clipper: ScreenClipper,
}

impl Pipeline {
    pub fn new(config: &RendererConfig) -> Self {
        let width = config.width as f32;
        let height = config.height as f32;
        Self {
            projection: Transform::projection(config.fov, config.aspect(), config.near, config.far),
            near: Plane::near(config.near),
            width,
            height,
            light: config.light(),
            lighting: config.lighting,
            to_raster: Vec::new(),
            clipper: ScreenClipper::new(width, height),
        }
    }

    /// Pre-size the per-frame buffer, typically to the mesh size.
    pub fn reserve(&mut self, triangles: usize) {
        self.to_raster.reserve(triangles);
    }

    /// Change the viewport, rebuilding the projection for the new aspect.
    pub fn resize(&mut self, config: &RendererConfig) {
        let buffer = std::mem::take(&mut self.to_raster);
        *self = Self::new(config);
        self.to_raster = buffer;
    }

    /// Transform, cull, light, clip and project `mesh`, returning the
    /// screen-space triangles sorted far to near.
    pub fn project(&mut self, mesh: &Mesh, world: &Mat4, camera: &CameraState) -> (&[Triangle], FrameStats) {
        let stats = self.project_into(mesh, world, camera);
        (self.to_raster.as_slice(), stats)
    }

    /// Run the whole frame and submit every fragment to `sink`.
    pub fn render<S: DecalSink + ?Sized>(
        &mut self,
        mesh: &Mesh,
        world: &Mat4,
        camera: &CameraState,
        sink: &mut S,
    ) -> FrameStats {
        let mut stats = self.project_into(mesh, world, camera);

        for tri in &self.to_raster {
            for fragment in self.clipper.clip(tri) {
                sink.draw_decal_quad(&DecalQuad::from_triangle(fragment));
                stats.emitted += 1;
            }
        }

        trace!(?stats, "frame rendered");
        stats
    }

    fn project_into(&mut self, mesh: &Mesh, world: &Mat4, camera: &CameraState) -> FrameStats {
        let view = camera.view_matrix();
        let mut stats = FrameStats {
            input: mesh.len(),
            ..FrameStats::default()
        };
        self.to_raster.clear();

        for tri in &mesh.triangles {
            let transformed = tri.with_points(tri.points.map(|p| Transform::apply(&p, world)), tri.uv);

            let normal = match transformed.normal() {
                Some(n) => n,
                None => {
                    stats.degenerate += 1;
                    continue;
                }
            };

            let camera_ray = transformed.points[0].xyz() - camera.position;
            if normal.dot(&camera_ray) >= 0.0 {
                stats.culled += 1;
                continue;
            }

            let mut viewed = transformed.with_points(
                transformed.points.map(|p| Transform::apply(&p, &view)),
                transformed.uv,
            );
            viewed.shade = self.lighting.intensity(normal.dot(&self.light));

            let clipped = clip_triangle(&self.near, &viewed);
            if clipped.is_empty() {
                stats.near_rejected += 1;
            }
            for piece in clipped {
                let projected = self.to_screen(&piece);
                self.to_raster.push(projected);
            }
        }

        // Painter's order: stored depth grows towards the viewer.
        self.to_raster
            .sort_by(|a, b| a.mean_depth().total_cmp(&b.mean_depth()));
        stats.projected = self.to_raster.len();
        stats
    }

    /// Projection, perspective divide and viewport mapping of a view-space
    /// triangle.
    ///
    /// x and y are flipped so +y is up on screen, and depth is stored as
    /// `1 - z_ndc` so that farther triangles have smaller depth. Texture
    /// coordinates are divided by the clip-space `w` and the weight becomes
    /// `1 / w`.
    fn to_screen(&self, tri: &Triangle) -> Triangle {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        let mut points = [Vec4::zeros(); 3];
        let mut uv = tri.uv;

        for i in 0..3 {
            let clip = Transform::apply(&tri.points[i], &self.projection);
            let w = clip.w;
            let ndc = clip / w;
            points[i] = Vec4::new(
                (1.0 - ndc.x) * half_w,
                (1.0 - ndc.y) * half_h,
                1.0 - ndc.z,
                1.0,
            );
            uv[i] = Vec3::new(uv[i].x / w, uv[i].y / w, uv[i].z / w);
        }

        tri.with_points(points, uv)
    }
}
