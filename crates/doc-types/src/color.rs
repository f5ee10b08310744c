use serde::{Deserialize, Serialize};

/// An RGBA colour with 8 bits per channel.
///
/// Persisted as a packed `0xRRGGBBAA` integer, so the channel storage keeps
/// save/restore lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a colour from unit-range float channels. Values are clamped to `[0, 1]`.
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: unit_to_byte(r),
            g: unit_to_byte(g),
            b: unit_to_byte(b),
            a: unit_to_byte(a),
        }
    }

    /// Channels as unit-range floats.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn from_packed(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self { r, g, b, a }
    }

    pub fn packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Surface appearance of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient_color: Color,
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub emissive_color: Color,
    pub shininess: f32,
    pub transparency: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_color: Color::rgba(51, 51, 51, 0),
            diffuse_color: Color::rgba(204, 204, 204, 0),
            specular_color: Color::BLACK,
            emissive_color: Color::BLACK,
            shininess: 0.2,
            transparency: 0.0,
        }
    }
}
