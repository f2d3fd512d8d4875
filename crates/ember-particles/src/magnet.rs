//! Magnets: point force sources that attract (positive strength) or repel
//! particles. Positions are in the link space particles move in.

use crate::toml_util::{toml_number, toml_vec2};
use ember_core::{EmberError, Result, Vec2};

/// Distances below this are treated as "already at the magnet"
const MIN_DISTANCE: f32 = 1e-3;

/// How a magnet's pull fades with distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MagnetFalloff {
    /// Constant pull everywhere
    None,
    /// Pull divided by `distance ^ attenuation`
    Inverse { attenuation: f32 },
    /// Full pull inside `radius`, fading over a Gaussian edge of `softness`
    Gaussian { radius: f32, softness: f32 },
}

impl MagnetFalloff {
    pub const NAMES: [&'static str; 3] = ["none", "inverse", "gaussian"];

    /// Weight in [0, 1] (or above for close inverse magnets) at `distance`
    pub fn weight(&self, distance: f32) -> f32 {
        match *self {
            Self::None => 1.0,
            Self::Inverse { attenuation } => {
                if attenuation <= 0.0 {
                    1.0
                } else {
                    1.0 / distance.max(1.0).powf(attenuation)
                }
            }
            Self::Gaussian { radius, softness } => {
                if softness < 0.001 {
                    return if distance < radius { 1.0 } else { 0.0 };
                }
                let d = std::f32::consts::SQRT_2 * softness;
                0.5 * (1.0 + erf((radius - distance) / d))
            }
        }
    }
}

/// Error function approximation (Abramowitz-Stegun 7.1.26)
pub fn erf(x: f32) -> f32 {
    let s = if x < 0.0 { -1.0 } else { 1.0 };
    let a = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * a);
    let y = 1.0
        - (((((1.061_405_4 * t - 1.453_152) * t) + 1.421_413_8) * t - 0.284_496_74) * t
            + 0.254_829_6)
            * t
            * (-a * a).exp();
    s * y
}

/// A force source particles react to
pub trait Magnet {
    fn position(&self) -> Vec2;
    /// Units per second at full weight; negative repels
    fn strength(&self) -> f32;
    fn falloff(&self) -> MagnetFalloff;
    fn is_active(&self) -> bool {
        true
    }
}

/// A magnet at a fixed position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMagnet {
    pub position: Vec2,
    pub strength: f32,
    pub falloff: MagnetFalloff,
    pub active: bool,
}

impl PointMagnet {
    pub fn new(position: Vec2, strength: f32, falloff: MagnetFalloff) -> Self {
        Self {
            position,
            strength,
            falloff,
            active: true,
        }
    }

    /// Parse a `[[emitter.magnet]]` table
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let position = table
            .get("position")
            .and_then(toml_vec2)
            .ok_or_else(|| EmberError::MissingRequiredField("magnet.position".to_string()))?;
        let strength = table.get("strength").and_then(toml_number).unwrap_or(100.0);
        let falloff_name = table
            .get("falloff")
            .and_then(|v| v.as_str())
            .unwrap_or("inverse");
        let falloff = match falloff_name {
            "none" => MagnetFalloff::None,
            "inverse" => MagnetFalloff::Inverse {
                attenuation: table.get("attenuation").and_then(toml_number).unwrap_or(0.0),
            },
            "gaussian" => MagnetFalloff::Gaussian {
                radius: table.get("radius").and_then(toml_number).unwrap_or(100.0),
                softness: table.get("softness").and_then(toml_number).unwrap_or(20.0),
            },
            other => {
                return Err(EmberError::invalid_enum(
                    "magnet.falloff",
                    other,
                    &MagnetFalloff::NAMES,
                ))
            }
        };
        let active = table
            .get("active")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        Ok(Self {
            position,
            strength,
            falloff,
            active,
        })
    }
}

impl Magnet for PointMagnet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn strength(&self) -> f32 {
        self.strength
    }

    fn falloff(&self) -> MagnetFalloff {
        self.falloff
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Displacement one magnet applies to a particle at `position` over `delta`.
///
/// Attraction never carries a particle past the magnet.
pub fn magnet_displacement(magnet: &dyn Magnet, position: Vec2, amount: f32, delta: f32) -> Vec2 {
    let offset = magnet.position() - position;
    let distance = offset.length();
    if distance < MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let weight = magnet.falloff().weight(distance);
    let step = magnet.strength() * amount * weight * delta;
    if step == 0.0 {
        return Vec2::ZERO;
    }
    offset / distance * step.min(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(1.0) - 0.842_700_8).abs() < 1e-4);
        assert!((erf(-1.0) + 0.842_700_8).abs() < 1e-4);
        assert!((erf(3.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn gaussian_falloff_is_half_at_radius() {
        let f = MagnetFalloff::Gaussian {
            radius: 50.0,
            softness: 10.0,
        };
        assert!((f.weight(50.0) - 0.5).abs() < 1e-4);
        assert!(f.weight(0.0) > 0.99);
        assert!(f.weight(100.0) < 0.01);
    }

    #[test]
    fn attraction_points_at_magnet_and_does_not_overshoot() {
        let magnet = PointMagnet::new(Vec2::new(10.0, 0.0), 1000.0, MagnetFalloff::None);
        let d = magnet_displacement(&magnet, Vec2::ZERO, 1.0, 1.0);
        assert!((d - Vec2::new(10.0, 0.0)).length() < 1e-4);

        let small = magnet_displacement(&magnet, Vec2::ZERO, 1.0, 0.001);
        assert!((small.x - 1.0).abs() < 1e-4);
        assert!(small.y.abs() < 1e-6);
    }

    #[test]
    fn negative_strength_repels() {
        let magnet = PointMagnet::new(
            Vec2::new(0.0, 0.0),
            -50.0,
            MagnetFalloff::Inverse { attenuation: 1.0 },
        );
        let d = magnet_displacement(&magnet, Vec2::new(0.0, 10.0), 1.0, 0.1);
        assert!(d.y > 0.0);
        assert!((d.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn parse_magnet_table() {
        let table: toml::value::Table = toml::from_str(
            r#"
position = [100, 50]
strength = 40
falloff = "gaussian"
radius = 30
"#,
        )
        .unwrap();
        let magnet = PointMagnet::from_toml(&table).unwrap();
        assert_eq!(magnet.position, Vec2::new(100.0, 50.0));
        assert_eq!(
            magnet.falloff,
            MagnetFalloff::Gaussian {
                radius: 30.0,
                softness: 20.0
            }
        );

        let bad: toml::value::Table = toml::from_str("position = [0, 0]\nfalloff = \"cubic\"").unwrap();
        assert!(PointMagnet::from_toml(&bad).is_err());
        let missing: toml::value::Table = toml::from_str("strength = 1").unwrap();
        assert!(PointMagnet::from_toml(&missing).is_err());
    }
}
