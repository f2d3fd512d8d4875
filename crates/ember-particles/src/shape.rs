//! Emission shapes: where a new particle appears and which way it heads

use crate::rand::ParticleRng;
use crate::triangulate::CustomShape;
use ember_core::{EmberError, Result, Vec2};

/// Emission shape, sized by the emitter's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterShape {
    /// Centre of the bounding box
    #[default]
    Point,
    /// Horizontal line through the vertical centre
    Line,
    /// Outline of the ellipse inscribed in the bounding box
    Ellipse,
    /// Anywhere inside the bounding box
    Area,
    /// Inside a polygon of user points, oriented clockwise
    Custom,
}

impl EmitterShape {
    pub const NAMES: [&'static str; 5] = ["point", "line", "ellipse", "area", "custom"];

    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "ellipse" => Ok(Self::Ellipse),
            "area" => Ok(Self::Area),
            "custom" => Ok(Self::Custom),
            _ => Err(EmberError::invalid_enum("shape", name, &Self::NAMES)),
        }
    }
}

/// Which side of the shape particles leave from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionSide {
    /// Nothing is emitted
    None,
    /// Reversed direction
    Inner,
    #[default]
    Outer,
    /// Either side, chosen per particle
    Both,
}

impl EmissionSide {
    pub const NAMES: [&'static str; 4] = ["none", "inner", "outer", "both"];

    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "inner" => Ok(Self::Inner),
            "outer" => Ok(Self::Outer),
            "both" => Ok(Self::Both),
            _ => Err(EmberError::invalid_enum("emission", name, &Self::NAMES)),
        }
    }

    /// Extra rotation for a new particle, or `None` when nothing is emitted
    pub fn direction_offset(&self, rng: &mut ParticleRng) -> Option<f32> {
        match self {
            Self::None => None,
            Self::Outer => Some(0.0),
            Self::Inner => Some(180.0),
            Self::Both => Some(if rng.coin() { 180.0 } else { 0.0 }),
        }
    }
}

/// Spawn location in emitter-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSample {
    pub position: Vec2,
    /// Added to the sampled emission direction (ellipse outward normal)
    pub direction_offset: f32,
}

/// Sample a spawn position for `shape` within a box of `size`.
pub fn sample_shape(
    shape: EmitterShape,
    size: Vec2,
    custom: &CustomShape,
    rng: &mut ParticleRng,
) -> ShapeSample {
    let (position, direction_offset) = match shape {
        EmitterShape::Point => (size * 0.5, 0.0),
        EmitterShape::Line => (Vec2::new(rng.next_f32() * size.x, size.y * 0.5), 0.0),
        EmitterShape::Ellipse => {
            let angle = rng.range(0.0, 360.0);
            let on_circle = Vec2::from_angle_deg(angle);
            ((on_circle + Vec2::ONE).scale(size) * 0.5, angle)
        }
        EmitterShape::Area => (
            Vec2::new(rng.next_f32() * size.x, rng.next_f32() * size.y),
            0.0,
        ),
        EmitterShape::Custom => (custom.sample(rng), 0.0),
    };
    ShapeSample {
        position,
        direction_offset,
    }
}
