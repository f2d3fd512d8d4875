//! `(median, dispersion)` ranges for stochastic emitter parameters

use crate::rand::ParticleRng;
use crate::toml_util::toml_number;
use ember_core::{EmberError, Result};

/// A stochastic scalar described by its centre and spread.
///
/// Uniform sampling covers `[median - dispersion, median + dispersion]`;
/// normal sampling uses the dispersion as a standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    pub median: f32,
    pub dispersion: f32,
}

impl NumericRange {
    pub const fn new(median: f32, dispersion: f32) -> Self {
        Self { median, dispersion }
    }

    pub fn uniform(&self, rng: &mut ParticleRng) -> f32 {
        self.median + rng.signed_unit() * self.dispersion
    }

    pub fn normal(&self, rng: &mut ParticleRng) -> f32 {
        self.median + rng.normal() * self.dispersion
    }

    pub fn is_zero(&self) -> bool {
        self.median == 0.0 && self.dispersion == 0.0
    }

    /// Parse from a number, a `[median, dispersion]` array or a
    /// `{ median, dispersion }` table.
    pub fn from_toml(field: &str, value: &toml::Value) -> Result<Self> {
        if let Some(median) = toml_number(value) {
            return Ok(Self::new(median, 0.0));
        }
        if let Some(arr) = value.as_array() {
            let median = arr.first().and_then(toml_number);
            let dispersion = match arr.get(1) {
                Some(v) => toml_number(v),
                None => Some(0.0),
            };
            if let (Some(median), Some(dispersion), true) = (median, dispersion, arr.len() <= 2) {
                return Ok(Self::new(median, dispersion));
            }
        }
        if let Some(table) = value.as_table() {
            let median = table.get("median").and_then(toml_number);
            let dispersion = table
                .get("dispersion")
                .map(toml_number)
                .unwrap_or(Some(0.0));
            if let (Some(median), Some(dispersion)) = (median, dispersion) {
                return Ok(Self::new(median, dispersion));
            }
        }
        Err(EmberError::InvalidFieldType {
            field: field.to_string(),
            expected: "number, [median, dispersion] or { median, dispersion }".to_string(),
        })
    }
}
