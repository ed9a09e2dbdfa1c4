/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use sr3d_core::{DecalQuad, DecalSink, Texture, Tint, Vec2};
use std::collections::HashMap;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// ASCII renderer that turns decal quads into terminal characters.
///
/// There is no depth buffer: quads arrive far to near and later ones
/// overwrite earlier ones.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    textures: HashMap<u32, Texture>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::DarkGrey; size],
            textures: HashMap::new(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Make a texture available to quads that reference its id.
    pub fn register_texture(&mut self, texture: Texture) {
        self.textures.insert(texture.handle().id, texture);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.char_buffer = vec![' '; width * height];
        self.color_buffer = vec![Color::DarkGrey; width * height];
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::DarkGrey);
    }

    /// Character at a cell, mostly for tests.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    fn rasterize_triangle(&mut self, quad: &DecalQuad, corners: [usize; 3]) {
        let [i0, i1, i2] = corners;
        let (v0, v1, v2) = (quad.positions[i0], quad.positions[i1], quad.positions[i2]);
        let texture = quad.texture.and_then(|handle| self.textures.get(&handle.id));

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        let mut fragments = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) else {
                    // Zero-area: the repeated corner of a triangle quad.
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let tint = blend_tint(&quad.tints, corners, (w0, w1, w2));
                let sample = match texture {
                    Some(texture) => {
                        let uv = quad.interpolated_uv(corners, (w0, w1, w2));
                        texture.sample(uv.x, uv.y) as f32 / 255.0
                    }
                    None => 1.0,
                };
                fragments.push((x as usize, y as usize, tint * sample));
            }
        }

        for (x, y, brightness) in fragments {
            let idx = y * self.width + x;
            self.char_buffer[idx] = ramp(brightness);
            self.color_buffer[idx] = shade_color(brightness);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl DecalSink for AsciiRenderer {
    fn draw_decal_quad(&mut self, quad: &DecalQuad) {
        self.rasterize_triangle(quad, [0, 1, 2]);
        self.rasterize_triangle(quad, [0, 2, 3]);
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str, tint: Tint) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if y >= self.height {
            return;
        }
        let color = Color::Rgb {
            r: tint.r,
            g: tint.g,
            b: tint.b,
        };
        for (offset, c) in text.chars().enumerate() {
            let col = x + offset;
            if col >= self.width {
                break;
            }
            let idx = y * self.width + col;
            self.char_buffer[idx] = c;
            self.color_buffer[idx] = color;
        }
    }
}

/// Brightness in [0, 1] to a ramp character.
fn ramp(brightness: f32) -> char {
    let char_index = (brightness.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn shade_color(brightness: f32) -> Color {
    match brightness {
        b if b < 0.3 => Color::DarkGrey,
        b if b < 0.5 => Color::Grey,
        b if b < 0.8 => Color::White,
        _ => Color::Cyan,
    }
}

fn blend_tint(tints: &[Tint; 4], corners: [usize; 3], weights: (f32, f32, f32)) -> f32 {
    tints[corners[0]].luminance() * weights.0
        + tints[corners[1]].luminance() * weights.1
        + tints[corners[2]].luminance() * weights.2
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: Vec2, v1: Vec2, v2: Vec2, p: Vec2) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
