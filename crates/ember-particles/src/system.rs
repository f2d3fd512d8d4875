//! Multi-emitter simulation: scene loading, stepping and instance packing

use crate::emitter::{EmitterConfig, ParticleEmitter, SimulationContext};
use crate::host::{HostTransform, StaticHost};
use crate::magnet::{Magnet, PointMagnet};
use crate::modifier::{ModifierProfile, ParticleModifier};
use crate::particle::ParticlePool;
use crate::rand::ParticleRng;
use crate::render::{InstanceBuffer, ParticleInstance};
use crate::toml_util::{sub_tables, toml_str, toml_table};
use ember_core::{EmberError, Result};
use std::path::Path;
use std::sync::Arc;

/// An emitter together with the collaborators it simulates against
pub struct EmitterSlot {
    pub name: String,
    pub emitter: ParticleEmitter,
    pub modifiers: Vec<Box<dyn ParticleModifier>>,
    pub magnets: Vec<Box<dyn Magnet>>,
    pub host: Box<dyn HostTransform>,
}

impl EmitterSlot {
    pub fn new(name: impl Into<String>, config: EmitterConfig) -> Self {
        Self {
            name: name.into(),
            emitter: ParticleEmitter::new(config),
            modifiers: Vec::new(),
            magnets: Vec::new(),
            host: Box::new(StaticHost::default()),
        }
    }

    pub fn with_modifier(mut self, modifier: impl ParticleModifier + 'static) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    pub fn with_magnet(mut self, magnet: impl Magnet + 'static) -> Self {
        self.magnets.push(Box::new(magnet));
        self
    }

    pub fn with_host(mut self, host: impl HostTransform + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Parse one `[[emitter]]` table with its nested host, modifiers and magnets
    pub fn from_toml(table: &toml::value::Table, index: usize) -> Result<Self> {
        let name = match table.get("name") {
            Some(v) => toml_str("name", v)?.to_string(),
            None => format!("emitter{index}"),
        };
        let mut slot = Self::new(name, EmitterConfig::from_toml(table)?);

        if let Some(host) = table.get("host") {
            slot.host = Box::new(StaticHost::from_toml(toml_table("host", host)?)?);
        }
        for modifier in sub_tables(table, "modifier")? {
            slot.modifiers
                .push(Box::new(ModifierProfile::from_toml(modifier)?));
        }
        for magnet in sub_tables(table, "magnet")? {
            slot.magnets.push(Box::new(PointMagnet::from_toml(magnet)?));
        }
        Ok(slot)
    }
}

/// Draw data for one emitter, consumed by the renderer
pub struct ParticleDrawData<'a> {
    pub name: &'a str,
    pub instances: &'a [ParticleInstance],
}

/// All emitters of a scene sharing one particle pool and random source
pub struct ParticleSystem {
    pool: Arc<ParticlePool>,
    rng: ParticleRng,
    emission_enabled: bool,
    slots: Vec<EmitterSlot>,
    /// Pre-allocated instance buffer for packing live particles
    instance_buffer: InstanceBuffer,
    /// Per-emitter instance ranges: (slot index, start, count)
    instance_ranges: Vec<(usize, usize, usize)>,
}

impl ParticleSystem {
    pub fn new(rng: ParticleRng) -> Self {
        Self::with_pool(Arc::new(ParticlePool::new()), rng)
    }

    /// Share a pool with other systems
    pub fn with_pool(pool: Arc<ParticlePool>, rng: ParticleRng) -> Self {
        Self {
            pool,
            rng,
            emission_enabled: true,
            slots: Vec::new(),
            instance_buffer: InstanceBuffer::new(),
            instance_ranges: Vec::new(),
        }
    }

    /// Load every `[[emitter]]` from a scene document
    pub fn from_toml_str(source: &str, rng: ParticleRng) -> Result<Self> {
        let doc: toml::value::Table = toml::from_str(source)?;
        let mut system = Self::new(rng);
        for (index, table) in sub_tables(&doc, "emitter")?.into_iter().enumerate() {
            system.add_emitter(EmitterSlot::from_toml(table, index)?)?;
        }
        log::info!("loaded {} emitter(s)", system.emitter_count());
        Ok(system)
    }

    /// Load a scene document from disk
    pub fn from_toml_file(path: impl AsRef<Path>, rng: ParticleRng) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source, rng)
    }

    /// Register an emitter; names must be unique
    pub fn add_emitter(&mut self, slot: EmitterSlot) -> Result<()> {
        if self.slots.iter().any(|s| s.name == slot.name) {
            return Err(EmberError::DuplicateEmitterName(slot.name));
        }
        if slot.modifiers.is_empty() {
            log::warn!("emitter '{}' has no modifiers and will not spawn", slot.name);
        }
        log::debug!(
            "emitter '{}': {:?} shape, {} modifier(s), {} magnet(s)",
            slot.name,
            slot.emitter.config.shape,
            slot.modifiers.len(),
            slot.magnets.len()
        );
        self.slots.push(slot);
        Ok(())
    }

    pub fn emitter(&self, name: &str) -> Option<&EmitterSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn emitter_mut(&mut self, name: &str) -> Option<&mut EmitterSlot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    pub fn emitters(&self) -> &[EmitterSlot] {
        &self.slots
    }

    pub fn emitter_count(&self) -> usize {
        self.slots.len()
    }

    pub fn pool(&self) -> &Arc<ParticlePool> {
        &self.pool
    }

    /// Globally stop or resume spawning; live particles keep simulating
    pub fn set_emission_enabled(&mut self, enabled: bool) {
        if self.emission_enabled != enabled {
            log::debug!("emission {}", if enabled { "enabled" } else { "disabled" });
        }
        self.emission_enabled = enabled;
    }

    pub fn emission_enabled(&self) -> bool {
        self.emission_enabled
    }

    /// Advance every emitter by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let mut ctx = SimulationContext {
                pool: &self.pool,
                rng: &mut self.rng,
                modifiers: &slot.modifiers,
                magnets: &slot.magnets,
                host: slot.host.as_ref(),
                emission_enabled: self.emission_enabled,
            };
            slot.emitter.update(dt, &mut ctx);
        }
    }

    /// Pack live particles into the instance buffer.
    /// Call this after `update()`.
    pub fn pack_instances(&mut self) {
        self.instance_buffer.clear();
        self.instance_ranges.clear();

        for (index, slot) in self.slots.iter().enumerate() {
            let start = self.instance_buffer.len();
            slot.emitter
                .render(&slot.modifiers, slot.host.as_ref(), &mut self.instance_buffer);
            let count = self.instance_buffer.len() - start;
            if count > 0 {
                self.instance_ranges.push((index, start, count));
            }
        }
    }

    pub fn instance_buffer(&self) -> &InstanceBuffer {
        &self.instance_buffer
    }

    /// Draw data for each emitter that produced instances
    pub fn draw_data(&self) -> Vec<ParticleDrawData<'_>> {
        let instances = self.instance_buffer.instances();
        self.instance_ranges
            .iter()
            .map(|&(index, start, count)| ParticleDrawData {
                name: &self.slots[index].name,
                instances: &instances[start..start + count],
            })
            .collect()
    }

    /// Live particles across all emitters
    pub fn total_alive(&self) -> usize {
        self.slots.iter().map(|s| s.emitter.particle_count()).sum()
    }

    /// Drop every live particle without recycling
    pub fn clear_particles(&mut self) {
        for slot in &mut self.slots {
            slot.emitter.clear_particles();
        }
    }

    /// Return every live particle to the pool
    pub fn delete_all_particles(&mut self) {
        for slot in &mut self.slots {
            slot.emitter.delete_all_particles(&self.pool);
        }
    }
}
