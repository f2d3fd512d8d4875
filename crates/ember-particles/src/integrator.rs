//! Per-tick particle integration

use crate::emitter::RandomMotion;
use crate::magnet::{magnet_displacement, Magnet};
use crate::modifier::ParticleModifier;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use ember_core::spline::catmull_rom_window;
use ember_core::Vec2;

/// Squared displacement below which the travel direction is left alone
const MIN_PATH_STEP_SQ: f32 = 1e-5;

/// Emitter-wide switches the integrator reads
#[derive(Debug, Clone, Copy)]
pub struct IntegrationParams<'a> {
    pub immortal: bool,
    pub along_path_orientation: bool,
    pub random_motion: &'a RandomMotion,
}

/// Advance one particle by `delta` seconds. A zero delta still refreshes
/// the derived scale, color and position.
pub fn advance_particle(
    p: &mut Particle,
    modifier: &dyn ParticleModifier,
    magnets: &[&dyn Magnet],
    params: &IntegrationParams<'_>,
    rng: &mut ParticleRng,
    delta: f32,
) {
    p.age += delta;
    if params.immortal && p.lifetime > 0.0 {
        p.age %= p.lifetime;
    }

    let m = if p.age_to_animation_time > 0.0 {
        modifier.multipliers_at(p.age * p.age_to_animation_time)
    } else {
        modifier.multipliers()
    };

    p.texture_index = advance_frame(p.texture_index, modifier, delta);

    let wind_velocity = p.wind_amount * m.wind;
    if wind_velocity != 0.0 {
        p.regular_position += Vec2::from_angle_deg(p.wind_direction) * (wind_velocity * delta);
    }
    if p.gravity_velocity != 0.0 {
        p.regular_position +=
            Vec2::from_angle_deg(p.gravity_direction) * (p.gravity_velocity * delta);
    }

    // Heading is sampled before this tick's turn
    let heading = Vec2::from_angle_deg(p.regular_direction);
    let velocity = p.velocity * m.velocity;
    p.regular_direction += p.angular_velocity * m.angular_velocity * delta;

    p.gravity_acceleration += p.gravity_amount * m.gravity * delta;
    p.gravity_velocity += p.gravity_acceleration * delta;

    p.regular_position += heading * (velocity * delta);
    p.angle += p.spin * m.spin * delta;

    p.scale_current = p.scale_initial.scale(m.scale);
    p.color_current = p.color_initial * m.color;
    p.magnet_amount_current = p.magnet_amount_initial * m.magnet;

    for magnet in magnets {
        p.regular_position +=
            magnet_displacement(*magnet, p.regular_position, p.magnet_amount_current, delta);
    }

    let jitter = advance_random_motion(p, params.random_motion, rng, delta);
    let previous = p.full_position;
    p.full_position = p.regular_position + jitter;

    if params.along_path_orientation {
        let step = p.full_position - previous;
        if step.length_squared() > MIN_PATH_STEP_SQ {
            p.full_direction = step.atan2_deg();
        }
    }
}

/// Flip-book position after `delta` seconds.
///
/// Frames run forward when `first < last` and backward otherwise. Index 0
/// means "not started" and snaps to the first frame.
pub fn advance_frame(index: f32, modifier: &dyn ParticleModifier, delta: f32) -> f32 {
    let first = modifier.first_frame() as f32;
    let last = modifier.last_frame() as f32;
    let fps = modifier.animation_fps().max(0.0);
    let looped = modifier.looped_animation();

    let mut index = if index == 0.0 { first } else { index };
    if first == last {
        return first;
    }

    if first < last {
        index += delta * fps;
        if looped {
            let up = last + 1.0;
            while index > up {
                index -= up - first;
            }
        } else {
            index = index.min(last);
        }
        index.max(first)
    } else {
        index -= delta * fps;
        if looped {
            let down = last - 1.0;
            while index < down {
                index += first - down;
            }
        } else {
            index = index.max(last);
        }
        index.min(first)
    }
}

/// Move along the random-motion spline and return the offset from the
/// regular position.
fn advance_random_motion(
    p: &mut Particle,
    motion: &RandomMotion,
    rng: &mut ParticleRng,
    delta: f32,
) -> Vec2 {
    if p.random_motion_speed <= 0.0 {
        return Vec2::ZERO;
    }
    p.random_spline_offset += delta * p.random_motion_speed;
    while p.random_spline_offset >= 1.0 {
        p.random_spline_offset -= 1.0;
        let next = motion.control_point(&mut p.random_ray_direction, rng);
        p.random_spline.rotate_left(1);
        p.random_spline[3] = next;
    }
    catmull_rom_window(&p.random_spline, p.random_spline_offset)
}
