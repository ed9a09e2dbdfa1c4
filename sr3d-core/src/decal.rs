/// Textured quad descriptors handed to the host's decal-draw call.
///
/// The pipeline never writes pixels. Each surviving screen-space fragment is
/// turned into a [`DecalQuad`] and passed to a [`DecalSink`], which is
/// whatever the host uses to put textured quads on screen.

use crate::geometry::Triangle;
use crate::math::Vec2;

/// RGBA colour used to tint a decal corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    pub const WHITE: Tint = Tint::rgba(255, 255, 255, 255);
    pub const BLACK: Tint = Tint::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque grey from an intensity in `[0, 1]` (clamped).
    pub fn grey(intensity: f32) -> Self {
        let v = (intensity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(v, v, v, 255)
    }

    /// Perceived brightness in `[0, 1]`.
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Reference to a texture owned by the host.
///
/// Only the dimensions matter to the pipeline; the texels stay with the
/// [`Texture`] the handle was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    /// Size of one texel in normalised texture coordinates.
    pub fn uv_scale(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }
}

/// Luminance texture owned by the host.
#[derive(Debug, Clone)]
pub struct Texture {
    id: u32,
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

impl Texture {
    /// Returns `None` when `texels` does not hold `width * height` values or a
    /// dimension is zero.
    pub fn new(id: u32, width: u32, height: u32, texels: Vec<u8>) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        if len == 0 || texels.len() != len {
            return None;
        }
        Some(Self {
            id,
            width,
            height,
            texels,
        })
    }

    /// Two-tone checkerboard with square cells of `cell` texels.
    pub fn checkerboard(id: u32, width: u32, height: u32, cell: u32, dark: u8, light: u8) -> Self {
        let cell = cell.max(1);
        let (width, height) = (width.max(1), height.max(1));
        let texels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    if ((x / cell) + (y / cell)) % 2 == 0 {
                        light
                    } else {
                        dark
                    }
                })
            })
            .collect();
        Self {
            id,
            width,
            height,
            texels,
        }
    }

    pub fn handle(&self) -> TextureHandle {
        TextureHandle {
            id: self.id,
            width: self.width,
            height: self.height,
        }
    }

    /// Nearest texel for normalised coordinates; wraps outside `[0, 1)`.
    pub fn sample(&self, u: f32, v: f32) -> u8 {
        let scale = self.handle().uv_scale();
        let tx = (u.rem_euclid(1.0) / scale.x) as u32;
        let ty = (v.rem_euclid(1.0) / scale.y) as u32;
        let tx = tx.min(self.width - 1);
        let ty = ty.min(self.height - 1);
        self.texels[(ty * self.width + tx) as usize]
    }
}

/// One textured, tinted, perspective-weighted quad in screen space.
///
/// Triangles are submitted with the last corner repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct DecalQuad {
    pub texture: Option<TextureHandle>,
    pub positions: [Vec2; 4],
    /// Texture coordinates already divided by the clip-space `w`.
    pub uvs: [Vec2; 4],
    /// `1 / w` per corner; the sampler divides `uvs` by these.
    pub weights: [f32; 4],
    pub tints: [Tint; 4],
}

impl DecalQuad {
    /// Quad covering a screen-space triangle with a uniform tint taken from
    /// the triangle's shade.
    pub fn from_triangle(tri: &Triangle) -> Self {
        let tint = Tint::grey(tri.shade);
        let p = &tri.points;
        let t = &tri.uv;
        Self {
            texture: tri.texture,
            positions: [
                Vec2::new(p[0].x, p[0].y),
                Vec2::new(p[1].x, p[1].y),
                Vec2::new(p[2].x, p[2].y),
                Vec2::new(p[2].x, p[2].y),
            ],
            uvs: [
                Vec2::new(t[0].x, t[0].y),
                Vec2::new(t[1].x, t[1].y),
                Vec2::new(t[2].x, t[2].y),
                Vec2::new(t[2].x, t[2].y),
            ],
            weights: [t[0].z, t[1].z, t[2].z, t[2].z],
            tints: [tint; 4],
        }
    }

    /// Perspective-corrected texture coordinate at barycentric position
    /// `bary` inside the triangle formed by `corners`. `uv/w` and `1/w` are
    /// interpolated linearly and then divided.
    pub fn interpolated_uv(&self, corners: [usize; 3], bary: (f32, f32, f32)) -> Vec2 {
        let [i0, i1, i2] = corners;
        let (b0, b1, b2) = bary;
        let uv = self.uvs[i0] * b0 + self.uvs[i1] * b1 + self.uvs[i2] * b2;
        let q = self.weights[i0] * b0 + self.weights[i1] * b1 + self.weights[i2] * b2;
        if q == 0.0 {
            uv
        } else {
            uv / q
        }
    }
}

/// Host-side consumer of decal quads.
pub trait DecalSink {
    fn draw_decal_quad(&mut self, quad: &DecalQuad);

    /// Triangle convenience form: the third corner is repeated and all
    /// weights are 1.
    fn draw_polygon(
        &mut self,
        texture: Option<TextureHandle>,
        positions: [Vec2; 3],
        uvs: [Vec2; 3],
        tint: Tint,
    ) {
        let quad = DecalQuad {
            texture,
            positions: [positions[0], positions[1], positions[2], positions[2]],
            uvs: [uvs[0], uvs[1], uvs[2], uvs[2]],
            weights: [1.0; 4],
            tints: [tint; 4],
        };
        self.draw_decal_quad(&quad);
    }

    /// Overlay text at a screen position. Hosts without text output may
    /// ignore it.
    fn draw_string(&mut self, _x: f32, _y: f32, _text: &str, _tint: Tint) {}
}

/// Records every quad; used by tests and headless runs.
impl DecalSink for Vec<DecalQuad> {
    fn draw_decal_quad(&mut self, quad: &DecalQuad) {
        self.push(quad.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_tint_clamps() {
        assert_eq!(Tint::grey(-1.0), Tint::BLACK);
        assert_eq!(Tint::grey(2.0), Tint::WHITE);
        assert_eq!(Tint::grey(0.5).r, 128);
    }

    #[test]
    fn test_uv_scale() {
        let handle = TextureHandle {
            id: 1,
            width: 64,
            height: 32,
        };
        let scale = handle.uv_scale();
        assert!((scale.x - 1.0 / 64.0).abs() < 1e-9);
        assert!((scale.y - 1.0 / 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_texture_rejects_bad_dimensions() {
        assert!(Texture::new(0, 2, 2, vec![0; 3]).is_none());
        assert!(Texture::new(0, 0, 2, vec![]).is_none());
        assert!(Texture::new(0, 2, 2, vec![0; 4]).is_some());
        // 65536 * 65536 wraps to zero in u32 arithmetic.
        assert!(Texture::new(0, 65536, 65536, vec![]).is_none());
    }

    #[test]
    fn test_checkerboard_sampling() {
        let tex = Texture::checkerboard(7, 4, 4, 2, 10, 200);
        assert_eq!(tex.handle().id, 7);
        assert_eq!(tex.sample(0.0, 0.0), 200);
        assert_eq!(tex.sample(0.6, 0.0), 10);
        assert_eq!(tex.sample(0.6, 0.6), 200);
        // Wraps
        assert_eq!(tex.sample(1.0, 0.0), 200);
    }

    #[test]
    fn test_draw_polygon_repeats_last_corner() {
        let mut sink: Vec<DecalQuad> = Vec::new();
        sink.draw_polygon(
            None,
            [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            [Vec2::zeros(); 3],
            Tint::WHITE,
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].positions[3], sink[0].positions[2]);
        assert_eq!(sink[0].weights, [1.0; 4]);
    }

    #[test]
    fn test_interpolated_uv_divides_by_weight() {
        let quad = DecalQuad {
            texture: None,
            positions: [Vec2::zeros(); 4],
            uvs: [Vec2::new(0.25, 0.5); 4],
            weights: [0.5; 4],
            tints: [Tint::WHITE; 4],
        };
        let uv = quad.interpolated_uv([0, 1, 2], (1.0, 0.0, 0.0));
        assert!((uv - Vec2::new(0.5, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_interpolated_uv_is_perspective_correct() {
        // Corner 0 at w = 1 with u = 0, corner 1 at w = 3 with u = 1. Halfway
        // across the screen the nearer corner dominates: u = 0.25, not 0.5.
        let quad = DecalQuad {
            texture: None,
            positions: [Vec2::zeros(); 4],
            uvs: [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0 / 3.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 0.0),
            ],
            weights: [1.0, 1.0 / 3.0, 1.0, 1.0],
            tints: [Tint::WHITE; 4],
        };
        let uv = quad.interpolated_uv([0, 1, 2], (0.5, 0.5, 0.0));
        assert!((uv.x - 0.25).abs() < 1e-6);
        assert_eq!(quad.interpolated_uv([0, 1, 2], (0.0, 1.0, 0.0)).x, 1.0);
    }
}
