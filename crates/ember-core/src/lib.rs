//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the core types that the other Ember crates depend on:
//! - `Vec2`, `Transform2D` - 2D spatial types (angles in degrees, y down)
//! - `Color` - RGBA color with component-wise tinting
//! - Catmull-Rom spline evaluation
//! - Error types and Result alias

mod error;
pub mod spline;
mod types;

pub use error::{EmberError, Result};
pub use types::{Color, Transform2D, Vec2};
