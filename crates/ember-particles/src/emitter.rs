//! Emitter configuration (built in code or parsed from TOML) and runtime state

use crate::emission::{initialize_particle, EmissionScheduler};
use crate::host::{HostTransform, ParticlesLinkage};
use crate::integrator::{advance_particle, IntegrationParams};
use crate::magnet::Magnet;
use crate::modifier::ParticleModifier;
use crate::particle::{Particle, ParticlePool};
use crate::preroll::Preroll;
use crate::rand::ParticleRng;
use crate::range::NumericRange;
use crate::render::{ParticleRenderer, ParticleSprite};
use crate::shape::{EmissionSide, EmitterShape};
use crate::toml_util::{non_negative, toml_f32, toml_str, toml_vec2, toml_vec2_or};
use crate::triangulate::CustomShape;
use ember_core::{EmberError, Result, Transform2D, Vec2};

/// Random wandering along a Catmull-Rom path around the regular trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct RandomMotion {
    /// Distance of each control point from the regular position
    pub radius: NumericRange,
    /// Spline segments travelled per second; 0 disables random motion
    pub speed: NumericRange,
    /// Stretches the path horizontally (> 1) or vertically (< 1)
    pub aspect_ratio: f32,
    /// Turn of the random walk ray between control points (degrees)
    pub rotation: NumericRange,
}

impl Default for RandomMotion {
    fn default() -> Self {
        Self {
            radius: NumericRange::new(20.0, 0.0),
            speed: NumericRange::new(0.0, 0.0),
            aspect_ratio: 1.0,
            rotation: NumericRange::new(0.0, 360.0),
        }
    }
}

impl RandomMotion {
    /// Next control point of the random walk, turning `ray` as it goes
    pub fn control_point(&self, ray: &mut f32, rng: &mut ParticleRng) -> Vec2 {
        *ray += self.rotation.uniform(rng);
        let mut radius = self.radius;
        if radius.dispersion == 0.0 {
            radius.dispersion = radius.median;
        }
        let mut point = Vec2::from_angle_deg(*ray) * radius.normal(rng).abs();
        if self.aspect_ratio != 1.0 && self.aspect_ratio > 0.0 {
            point.x *= self.aspect_ratio;
            point.y /= self.aspect_ratio;
        }
        point
    }
}

/// Declarative emitter parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    pub shape: EmitterShape,
    pub emission: EmissionSide,
    pub linkage: ParticlesLinkage,
    /// Bounding box the shape is fitted to
    pub size: Vec2,
    /// Polygon for `EmitterShape::Custom`, emitter-local, clockwise
    pub points: Vec<Vec2>,
    /// Particles per second, or the steady population when immortal
    pub number: f32,
    /// Time multiplier for the whole simulation
    pub speed: f32,
    /// Seconds simulated before the first frame
    pub time_shift: f32,
    /// Particles live forever and the population is held at `number`
    pub immortal: bool,
    /// Rotate particles to face their direction of travel
    pub along_path_orientation: bool,
    /// Emission direction (degrees, clockwise)
    pub direction: NumericRange,
    /// Initial sprite rotation (degrees)
    pub orientation: NumericRange,
    /// Seconds
    pub lifetime: NumericRange,
    pub velocity: NumericRange,
    /// Change of direction (degrees/sec)
    pub angular_velocity: NumericRange,
    /// Sprite rotation speed (degrees/sec)
    pub spin: NumericRange,
    pub zoom: NumericRange,
    /// Width to height ratio
    pub aspect_ratio: NumericRange,
    pub wind_direction: NumericRange,
    pub wind_amount: NumericRange,
    pub gravity_direction: NumericRange,
    pub gravity_amount: NumericRange,
    pub magnet_amount: NumericRange,
    pub random_motion: RandomMotion,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            shape: EmitterShape::Point,
            emission: EmissionSide::Outer,
            linkage: ParticlesLinkage::Parent,
            size: Vec2::ZERO,
            points: Vec::new(),
            number: 100.0,
            speed: 1.0,
            time_shift: 0.0,
            immortal: false,
            along_path_orientation: false,
            direction: NumericRange::new(0.0, 360.0),
            orientation: NumericRange::new(0.0, 360.0),
            lifetime: NumericRange::new(1.0, 0.0),
            velocity: NumericRange::new(100.0, 0.0),
            angular_velocity: NumericRange::new(0.0, 0.0),
            spin: NumericRange::new(0.0, 0.0),
            zoom: NumericRange::new(1.0, 0.0),
            aspect_ratio: NumericRange::new(1.0, 0.0),
            wind_direction: NumericRange::new(0.0, 0.0),
            wind_amount: NumericRange::new(0.0, 0.0),
            gravity_direction: NumericRange::new(90.0, 0.0),
            gravity_amount: NumericRange::new(0.0, 0.0),
            magnet_amount: NumericRange::new(0.0, 0.0),
            random_motion: RandomMotion::default(),
        }
    }
}

impl EmitterConfig {
    /// Parse an EmitterConfig from an `[[emitter]]` TOML table.
    ///
    /// Missing keys keep their defaults; unknown enum names are errors.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = table.get("shape") {
            config.shape = EmitterShape::parse(toml_str("shape", v)?)?;
        }
        if let Some(v) = table.get("emission") {
            config.emission = EmissionSide::parse(toml_str("emission", v)?)?;
        }
        if let Some(v) = table.get("linkage") {
            let widget = table.get("linkage_widget").and_then(|w| w.as_str());
            config.linkage = ParticlesLinkage::parse(toml_str("linkage", v)?, widget)?;
        }
        if let Some(v) = table.get("size") {
            config.size = toml_vec2_or(v, config.size);
        }
        if let Some(v) = table.get("points") {
            let invalid = || EmberError::InvalidFieldType {
                field: "points".to_string(),
                expected: "array of [x, y] pairs".to_string(),
            };
            config.points = v
                .as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|p| toml_vec2(p).ok_or_else(invalid))
                .collect::<Result<_>>()?;
        }
        if let Some(v) = table.get("number") {
            config.number = non_negative("number", toml_f32(v, config.number))?;
        }
        if let Some(v) = table.get("speed") {
            config.speed = non_negative("speed", toml_f32(v, config.speed))?;
        }
        if let Some(v) = table.get("time_shift") {
            config.time_shift = non_negative("time_shift", toml_f32(v, config.time_shift))?;
        }
        if let Some(v) = table.get("immortal") {
            config.immortal = v.as_bool().unwrap_or(false);
        }
        if let Some(v) = table.get("along_path_orientation") {
            config.along_path_orientation = v.as_bool().unwrap_or(false);
        }

        let ranges: [(&str, &mut NumericRange); 16] = [
            ("direction", &mut config.direction),
            ("orientation", &mut config.orientation),
            ("lifetime", &mut config.lifetime),
            ("velocity", &mut config.velocity),
            ("angular_velocity", &mut config.angular_velocity),
            ("spin", &mut config.spin),
            ("zoom", &mut config.zoom),
            ("aspect_ratio", &mut config.aspect_ratio),
            ("wind_direction", &mut config.wind_direction),
            ("wind_amount", &mut config.wind_amount),
            ("gravity_direction", &mut config.gravity_direction),
            ("gravity_amount", &mut config.gravity_amount),
            ("magnet_amount", &mut config.magnet_amount),
            ("random_motion_radius", &mut config.random_motion.radius),
            ("random_motion_speed", &mut config.random_motion.speed),
            ("random_motion_rotation", &mut config.random_motion.rotation),
        ];
        for (key, slot) in ranges {
            if let Some(v) = table.get(key) {
                *slot = NumericRange::from_toml(key, v)?;
            }
        }
        if let Some(v) = table.get("random_motion_aspect_ratio") {
            config.random_motion.aspect_ratio = toml_f32(v, 1.0);
        }

        Ok(config)
    }
}

/// Collaborators an emitter needs for one step
pub struct SimulationContext<'a> {
    pub pool: &'a ParticlePool,
    pub rng: &'a mut ParticleRng,
    pub modifiers: &'a [Box<dyn ParticleModifier>],
    pub magnets: &'a [Box<dyn Magnet>],
    pub host: &'a dyn HostTransform,
    /// Engine-wide switch; when off nothing new spawns but decay continues
    pub emission_enabled: bool,
}

impl<'a> SimulationContext<'a> {
    pub fn new(
        pool: &'a ParticlePool,
        rng: &'a mut ParticleRng,
        modifiers: &'a [Box<dyn ParticleModifier>],
        host: &'a dyn HostTransform,
    ) -> Self {
        Self {
            pool,
            rng,
            modifiers,
            magnets: &[],
            host,
            emission_enabled: true,
        }
    }

    pub fn with_magnets(mut self, magnets: &'a [Box<dyn Magnet>]) -> Self {
        self.magnets = magnets;
        self
    }

    pub fn with_emission(mut self, enabled: bool) -> Self {
        self.emission_enabled = enabled;
        self
    }
}

/// Runtime state for one emitter
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    particles: Vec<Particle>,
    scheduler: EmissionScheduler,
    preroll: Preroll,
    custom_shape: CustomShape,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            scheduler: EmissionScheduler::default(),
            preroll: Preroll::default(),
            custom_shape: CustomShape::default(),
        }
    }

    /// Live particles, contiguous
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn custom_shape(&self) -> &CustomShape {
        &self.custom_shape
    }

    /// False until the first update has run the preroll
    pub fn is_warm(&self) -> bool {
        self.preroll.is_warm()
    }

    /// Per-frame entry point. The first call replays `time_shift` seconds
    /// in fixed ticks; later calls run a single tick of `delta`.
    pub fn update(&mut self, delta: f32, ctx: &mut SimulationContext<'_>) {
        for tick in self.preroll.ticks(delta, self.config.time_shift) {
            self.step(tick, ctx);
        }
    }

    /// One simulation tick: emission, integration, retirement.
    pub fn step(&mut self, delta: f32, ctx: &mut SimulationContext<'_>) {
        if self.config.shape == EmitterShape::Custom {
            self.custom_shape.refresh(&self.config.points);
        }
        let delta = delta * self.config.speed;
        let modifiers = ctx.modifiers;

        let plan = self
            .scheduler
            .schedule(&self.config, self.particles.len(), delta);
        if plan.excess > 0 {
            let keep = self.particles.len() - plan.excess;
            ctx.pool.release_all(self.particles.drain(keep..));
        }

        let magnets: Vec<&dyn Magnet> = if self.config.magnet_amount.is_zero() {
            Vec::new()
        } else {
            ctx.magnets
                .iter()
                .map(|m| m.as_ref())
                .filter(|m| m.is_active())
                .collect()
        };
        let params = IntegrationParams {
            immortal: self.config.immortal,
            along_path_orientation: self.config.along_path_orientation,
            random_motion: &self.config.random_motion,
        };

        let can_spawn = ctx.emission_enabled && !modifiers.is_empty();
        let mut skipped = 0;
        for _ in 0..plan.spawn {
            if !can_spawn {
                skipped += 1;
                continue;
            }
            let mut particle = ctx.pool.acquire();
            let spawned = initialize_particle(
                &mut particle,
                &self.config,
                &self.custom_shape,
                ctx.host,
                modifiers,
                ctx.rng,
            );
            match modifiers.get(particle.modifier_index) {
                Some(modifier) if spawned => {
                    advance_particle(&mut particle, modifier.as_ref(), &magnets, &params, ctx.rng, 0.0);
                    self.particles.push(particle);
                }
                _ => {
                    skipped += 1;
                    ctx.pool.release(particle);
                }
            }
        }
        if skipped > 0 {
            log::debug!("skipped {skipped} spawn(s): emission disabled or no usable modifier");
        }

        let len = self.particles.len();
        let mut retired = 0;
        for i in (0..len).rev() {
            let particle = &mut self.particles[i];
            let alive = match modifiers.get(particle.modifier_index) {
                Some(modifier) => {
                    advance_particle(particle, modifier.as_ref(), &magnets, &params, ctx.rng, delta);
                    params.immortal || !particle.is_expired()
                }
                None => false,
            };
            if !alive {
                self.particles.swap(i, len - retired - 1);
                retired += 1;
            }
        }
        ctx.pool.release_all(self.particles.drain(len - retired..));
    }

    /// Emit one sprite per visible particle.
    pub fn render(
        &self,
        modifiers: &[Box<dyn ParticleModifier>],
        host: &dyn HostTransform,
        renderer: &mut dyn ParticleRenderer,
    ) {
        let link = host.link_transform(&self.config.linkage);
        let tint = host.link_color(&self.config.linkage);
        for p in &self.particles {
            if p.color_current.a <= 0.0 {
                continue;
            }
            let Some(modifier) = modifiers.get(p.modifier_index) else {
                continue;
            };
            let mut angle = p.angle;
            if self.config.along_path_orientation {
                angle += p.full_direction;
            }
            let size = p.scale_current.scale(modifier.image_size());
            let orientation = Vec2::from_angle_deg(angle);
            let local = Transform2D {
                u: orientation * size.x,
                v: orientation.perpendicular() * size.y,
                t: p.full_position,
            };
            let frame = p.texture_index.floor() as i32 - 1;
            renderer.draw(&ParticleSprite {
                transform: local.then(&link),
                texture: modifier.texture(frame),
                frame,
                color: p.color_current * tint,
            });
        }
    }

    /// Drop every live particle without recycling it
    pub fn clear_particles(&mut self) {
        self.particles.clear();
    }

    /// Return every live particle to the pool
    pub fn delete_all_particles(&mut self, pool: &ParticlePool) {
        pool.release_all(self.particles.drain(..));
    }
}
