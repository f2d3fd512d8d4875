//! Spawn scheduling and per-particle initialization

use crate::emitter::EmitterConfig;
use crate::host::HostTransform;
use crate::modifier::ParticleModifier;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use crate::range::NumericRange;
use crate::shape::sample_shape;
use crate::triangulate::CustomShape;
use ember_core::Vec2;

/// Shortest lifetime a particle can be born with (seconds)
pub const MIN_LIFETIME: f32 = 0.1;

/// Smallest aspect divisor when deriving the vertical scale
const MIN_ASPECT: f32 = 1e-4;

/// What one tick should do to the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmissionPlan {
    /// Spawn attempts this tick
    pub spawn: usize,
    /// Immortal particles above the target population, retired from the end
    pub excess: usize,
}

/// Fractional spawn accumulator.
///
/// Mortal emitters add `number * delta` per tick. Immortal emitters hold the
/// population at `number`, filling up over `time_shift` seconds if set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionScheduler {
    to_spawn: f32,
}

impl EmissionScheduler {
    pub fn pending(&self) -> f32 {
        self.to_spawn
    }

    pub fn schedule(&mut self, config: &EmitterConfig, live: usize, delta: f32) -> EmissionPlan {
        let mut excess = 0;
        if config.immortal {
            if config.time_shift > 0.0 {
                self.to_spawn += config.number * delta / config.time_shift;
            } else {
                self.to_spawn = config.number;
            }
            self.to_spawn = self.to_spawn.min(config.number - live as f32);
            excess = live.saturating_sub(config.number.max(0.0) as usize);
        } else {
            self.to_spawn += config.number * delta;
        }

        let whole = self.to_spawn.floor().max(0.0);
        self.to_spawn -= whole;
        EmissionPlan {
            spawn: whole as usize,
            excess,
        }
    }
}

/// Fill `p` with a freshly sampled birth state.
///
/// Returns false when the particle should not be emitted: no modifiers to
/// bind to, or the emission side is `None`.
pub fn initialize_particle(
    p: &mut Particle,
    config: &EmitterConfig,
    custom_shape: &CustomShape,
    host: &dyn HostTransform,
    modifiers: &[Box<dyn ParticleModifier>],
    rng: &mut ParticleRng,
) -> bool {
    let transform = host.emitter_transform(&config.linkage);
    let cross = transform.u.cross(&transform.v);
    let mut emitter_scale = Vec2::new(transform.u.length(), transform.v.length());
    if cross < 0.0 {
        emitter_scale.y = -emitter_scale.y;
    }
    let scale_amount = cross.abs().sqrt();
    let emitter_angle = transform.u.atan2_deg();

    let zoom = config.zoom.normal(rng);
    let variation = NumericRange::new(0.0, config.aspect_ratio.dispersion.max(0.0));
    let aspect = config.aspect_ratio.median * (1.0 + variation.normal(rng).abs())
        / (1.0 + variation.normal(rng).abs());

    p.texture_index = 0.0;
    p.velocity = config.velocity.normal(rng) * scale_amount;
    p.scale_initial =
        emitter_scale.scale(Vec2::new(zoom * aspect, zoom / aspect.max(MIN_ASPECT)));
    p.scale_current = p.scale_initial;

    p.wind_direction = config.wind_direction.uniform(rng);
    p.wind_amount = config.wind_amount.normal(rng) * scale_amount;
    p.gravity_velocity = 0.0;
    p.gravity_acceleration = 0.0;
    p.gravity_amount = config.gravity_amount.normal(rng) * scale_amount;
    p.gravity_direction = config.gravity_direction.normal(rng);
    p.magnet_amount_initial = config.magnet_amount.normal(rng);
    p.magnet_amount_current = p.magnet_amount_initial;

    p.lifetime = config.lifetime.normal(rng).max(MIN_LIFETIME);
    p.age = 0.0;
    p.angular_velocity = config.angular_velocity.normal(rng);
    p.angle = config.orientation.uniform(rng) + emitter_angle;
    p.spin = config.spin.normal(rng);

    let color = host.emitter_color(&config.linkage);
    p.color_initial = color;
    p.color_current = color;

    let motion = &config.random_motion;
    p.random_ray_direction = NumericRange::new(0.0, 360.0).uniform(rng);
    let first = motion.control_point(&mut p.random_ray_direction, rng);
    let third = motion.control_point(&mut p.random_ray_direction, rng);
    let fourth = motion.control_point(&mut p.random_ray_direction, rng);
    p.random_spline = [first, Vec2::ZERO, third, fourth];
    p.random_motion_speed = motion.speed.normal(rng);
    p.random_spline_offset = 0.0;

    let sample = sample_shape(config.shape, config.size, custom_shape, rng);
    p.regular_direction =
        config.direction.uniform(rng) + emitter_angle - 90.0 + sample.direction_offset;
    p.regular_position = transform.transform_point(sample.position);

    if modifiers.is_empty() {
        return false;
    }
    p.modifier_index = rng.below(modifiers.len());
    p.age_to_animation_time = modifiers[p.modifier_index].animation_duration() / p.lifetime;

    let Some(side) = config.emission.direction_offset(rng) else {
        return false;
    };
    p.regular_direction += side;

    p.full_direction = p.regular_direction;
    p.full_position = p.regular_position;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use crate::modifier::ModifierProfile;
    use crate::shape::EmissionSide;
    use ember_core::{Color, Transform2D};

    fn modifiers() -> Vec<Box<dyn ParticleModifier>> {
        vec![Box::new(ModifierProfile::default().with_duration(2.0))]
    }

    #[test]
    fn continuous_rate_accumulates_fractions() {
        let config = EmitterConfig {
            number: 10.0,
            ..Default::default()
        };
        let mut scheduler = EmissionScheduler::default();
        assert_eq!(scheduler.schedule(&config, 0, 0.05).spawn, 0);
        assert!((scheduler.pending() - 0.5).abs() < 1e-6);
        assert_eq!(scheduler.schedule(&config, 0, 0.25).spawn, 3);
        assert!(scheduler.pending() < 1.0);
    }

    #[test]
    fn huge_rate_schedules_in_one_step() {
        let config = EmitterConfig {
            number: 1.0e9,
            ..Default::default()
        };
        let mut scheduler = EmissionScheduler::default();
        let plan = scheduler.schedule(&config, 0, 0.04);
        assert!((plan.spawn as f64 - 4.0e7).abs() < 1.0e3);
        assert!((0.0..1.0).contains(&scheduler.pending()));
    }

    #[test]
    fn immortal_fills_to_target_and_reports_excess() {
        let config = EmitterConfig {
            number: 8.0,
            immortal: true,
            ..Default::default()
        };
        let mut scheduler = EmissionScheduler::default();
        assert_eq!(
            scheduler.schedule(&config, 0, 0.01),
            EmissionPlan { spawn: 8, excess: 0 }
        );
        assert_eq!(
            scheduler.schedule(&config, 8, 0.01),
            EmissionPlan { spawn: 0, excess: 0 }
        );
        assert_eq!(
            scheduler.schedule(&config, 12, 0.01),
            EmissionPlan { spawn: 0, excess: 4 }
        );
    }

    #[test]
    fn immortal_with_time_shift_fills_gradually() {
        let config = EmitterConfig {
            number: 10.0,
            immortal: true,
            time_shift: 2.0,
            ..Default::default()
        };
        let mut scheduler = EmissionScheduler::default();
        assert_eq!(scheduler.schedule(&config, 0, 1.0).spawn, 5);
        assert_eq!(scheduler.schedule(&config, 5, 1.0).spawn, 5);
        assert_eq!(scheduler.schedule(&config, 10, 1.0).spawn, 0);
    }

    #[test]
    fn initialize_copies_fixed_ranges() {
        let config = EmitterConfig {
            velocity: NumericRange::new(50.0, 0.0),
            lifetime: NumericRange::new(0.01, 0.0),
            direction: NumericRange::new(90.0, 0.0),
            orientation: NumericRange::new(30.0, 0.0),
            zoom: NumericRange::new(2.0, 0.0),
            aspect_ratio: NumericRange::new(2.0, 0.0),
            size: Vec2::new(10.0, 20.0),
            ..Default::default()
        };
        let host = StaticHost {
            color: Color::new(0.5, 0.5, 0.5, 1.0),
            ..StaticHost::at(Vec2::new(100.0, 0.0))
        };
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::default();
        assert!(initialize_particle(
            &mut p,
            &config,
            &CustomShape::default(),
            &host,
            &modifiers(),
            &mut rng
        ));

        assert_eq!(p.velocity, 50.0);
        assert_eq!(p.lifetime, MIN_LIFETIME);
        assert_eq!(p.age, 0.0);
        assert!((p.regular_direction - 0.0).abs() < 1e-5);
        assert!((p.angle - 30.0).abs() < 1e-5);
        assert_eq!(p.scale_initial, Vec2::new(4.0, 1.0));
        assert_eq!(p.regular_position, Vec2::new(105.0, 10.0));
        assert_eq!(p.full_position, p.regular_position);
        assert_eq!(p.color_initial, Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(p.random_spline[1], Vec2::ZERO);
        assert!((p.age_to_animation_time - 20.0).abs() < 1e-3);
    }

    #[test]
    fn emitter_transform_scales_and_rotates() {
        let config = EmitterConfig {
            velocity: NumericRange::new(10.0, 0.0),
            direction: NumericRange::new(90.0, 0.0),
            orientation: NumericRange::new(0.0, 0.0),
            ..Default::default()
        };
        let host = StaticHost {
            transform: Transform2D::from_scale_rotation_translation(
                Vec2::new(3.0, 3.0),
                90.0,
                Vec2::ZERO,
            ),
            ..Default::default()
        };
        let mut rng = ParticleRng::new(2);
        let mut p = Particle::default();
        assert!(initialize_particle(
            &mut p,
            &config,
            &CustomShape::default(),
            &host,
            &modifiers(),
            &mut rng
        ));
        assert!((p.velocity - 30.0).abs() < 1e-3);
        assert!((p.angle - 90.0).abs() < 1e-3);
        assert!((p.regular_direction - 90.0).abs() < 1e-3);
        assert!((p.scale_initial - Vec2::new(3.0, 3.0)).length() < 1e-3);
    }

    #[test]
    fn mirrored_transform_flips_vertical_scale() {
        let host = StaticHost {
            transform: Transform2D::from_scale_rotation_translation(
                Vec2::new(1.0, -1.0),
                0.0,
                Vec2::ZERO,
            ),
            ..Default::default()
        };
        let mut rng = ParticleRng::new(3);
        let mut p = Particle::default();
        initialize_particle(
            &mut p,
            &EmitterConfig::default(),
            &CustomShape::default(),
            &host,
            &modifiers(),
            &mut rng,
        );
        assert_eq!(p.scale_initial, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn inner_emission_reverses_direction() {
        let config = EmitterConfig {
            direction: NumericRange::new(90.0, 0.0),
            emission: EmissionSide::Inner,
            ..Default::default()
        };
        let mut rng = ParticleRng::new(4);
        let mut p = Particle::default();
        assert!(initialize_particle(
            &mut p,
            &config,
            &CustomShape::default(),
            &StaticHost::default(),
            &modifiers(),
            &mut rng
        ));
        assert!((p.regular_direction - 180.0).abs() < 1e-5);
    }

    #[test]
    fn fails_without_modifiers_or_emission() {
        let mut rng = ParticleRng::new(5);
        let mut p = Particle::default();
        let host = StaticHost::default();
        assert!(!initialize_particle(
            &mut p,
            &EmitterConfig::default(),
            &CustomShape::default(),
            &host,
            &[],
            &mut rng
        ));
        let none = EmitterConfig {
            emission: EmissionSide::None,
            ..Default::default()
        };
        assert!(!initialize_particle(
            &mut p,
            &none,
            &CustomShape::default(),
            &host,
            &modifiers(),
            &mut rng
        ));
    }
}
