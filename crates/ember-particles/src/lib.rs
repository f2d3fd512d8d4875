//! Ember Particles - 2D particle emitter simulation
//!
//! Provides pooled per-emitter particle simulation with:
//! - Rate-based and immortal (steady population) emission
//! - Point, line, ellipse, area and custom polygon emission shapes
//! - Velocity, spin, wind, gravity, magnets and Catmull-Rom random motion
//! - Modifier profiles with flip-book frames and keyframed multipliers
//! - Preroll of `time_shift` seconds on the first update
//! - Instance packing for instanced quad draws

pub mod curves;
pub mod emission;
pub mod emitter;
pub mod host;
pub mod integrator;
pub mod magnet;
pub mod modifier;
pub mod particle;
pub mod preroll;
pub mod rand;
pub mod range;
pub mod render;
pub mod shape;
pub mod system;
mod toml_util;
pub mod triangulate;

pub use emitter::{EmitterConfig, ParticleEmitter, RandomMotion, SimulationContext};
pub use host::{HostNode, HostTransform, ParticlesLinkage, StaticHost};
pub use magnet::{Magnet, MagnetFalloff, PointMagnet};
pub use modifier::{ModifierProfile, Multipliers, ParticleModifier};
pub use particle::{Particle, ParticlePool};
pub use rand::ParticleRng;
pub use range::NumericRange;
pub use render::{InstanceBuffer, ParticleInstance, ParticleRenderer, ParticleSprite};
pub use shape::{EmissionSide, EmitterShape};
pub use system::{EmitterSlot, ParticleDrawData, ParticleSystem};
pub use triangulate::CustomShape;
