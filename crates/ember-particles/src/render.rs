//! Render output: sprites handed to a renderer, and a packed instance buffer

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Transform2D};

/// One particle quad ready to draw.
///
/// `transform` maps the unit quad centred on the origin (corners at ±0.5)
/// to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite<'a> {
    pub transform: Transform2D,
    pub texture: Option<&'a str>,
    /// 0-based flip-book frame
    pub frame: i32,
    pub color: Color,
}

/// Receives sprites from `ParticleEmitter::render`
pub trait ParticleRenderer {
    fn draw(&mut self, sprite: &ParticleSprite<'_>);
}

/// GPU instance data for one particle quad.
/// 48 bytes, 16-byte aligned rows (3 x vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// xy = U axis, zw = V axis
    pub axes: [f32; 4],
    /// xy = translation, z = frame, w = texture slot (-1 for none)
    pub translation_frame: [f32; 4],
    /// rgba
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub fn from_sprite(sprite: &ParticleSprite<'_>, texture_slot: Option<usize>) -> Self {
        let t = &sprite.transform;
        Self {
            axes: [t.u.x, t.u.y, t.v.x, t.v.y],
            translation_frame: [
                t.t.x,
                t.t.y,
                sprite.frame as f32,
                texture_slot.map_or(-1.0, |s| s as f32),
            ],
            color: sprite.color.to_array(),
        }
    }
}

/// Collects sprites into a contiguous instance buffer with a texture table
#[derive(Debug, Default)]
pub struct InstanceBuffer {
    instances: Vec<ParticleInstance>,
    textures: Vec<String>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.textures.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Texture names indexed by each instance's texture slot
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    fn texture_slot(&mut self, name: &str) -> usize {
        match self.textures.iter().position(|t| t == name) {
            Some(slot) => slot,
            None => {
                self.textures.push(name.to_string());
                self.textures.len() - 1
            }
        }
    }
}

impl ParticleRenderer for InstanceBuffer {
    fn draw(&mut self, sprite: &ParticleSprite<'_>) {
        let slot = sprite.texture.map(|name| self.texture_slot(name));
        self.instances.push(ParticleInstance::from_sprite(sprite, slot));
    }
}
