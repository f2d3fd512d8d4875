//! Particle records and the shared free-list pool they are recycled through

use ember_core::{Color, Vec2};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// CPU-side particle state.
///
/// Angles and directions are in degrees (0 = right, 90 = down).
#[derive(Debug, Clone, Default)]
pub struct Particle {
    /// Index of the modifier this particle is bound to for life
    pub modifier_index: usize,
    /// Position including random motion
    pub full_position: Vec2,
    /// Position without random motion
    pub regular_position: Vec2,
    /// Motion direction including random motion
    pub full_direction: f32,
    /// Motion direction without random motion
    pub regular_direction: f32,
    pub velocity: f32,
    /// Change of motion direction (degrees/sec)
    pub angular_velocity: f32,
    pub wind_direction: f32,
    pub wind_amount: f32,
    pub gravity_direction: f32,
    pub gravity_amount: f32,
    pub gravity_acceleration: f32,
    pub gravity_velocity: f32,
    /// Magnet strength at birth
    pub magnet_amount_initial: f32,
    /// Magnet strength after the modifier multiplier
    pub magnet_amount_current: f32,
    pub scale_initial: Vec2,
    pub scale_current: Vec2,
    /// Rotation around the particle centre
    pub angle: f32,
    /// Rotation speed (degrees/sec)
    pub spin: f32,
    pub age: f32,
    pub lifetime: f32,
    pub color_initial: Color,
    pub color_current: Color,
    pub random_motion_speed: f32,
    /// Catmull-Rom control points of the random motion path
    pub random_spline: [Vec2; 4],
    /// Current angle of the random walk ray
    pub random_ray_direction: f32,
    /// Offset along the current spline segment (0..1)
    pub random_spline_offset: f32,
    /// Flip-book frame; the integer part selects the texture
    pub texture_index: f32,
    /// Modifier animation duration divided by lifetime
    pub age_to_animation_time: f32,
}

impl Particle {
    /// True once a mortal particle has outlived its lifetime
    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime
    }
}

/// Free list of retired particles shared by every emitter of a simulation.
///
/// The lock is held only for the push or pop itself.
#[derive(Default)]
pub struct ParticlePool {
    free: Mutex<Vec<Particle>>,
    constructed: AtomicUsize,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a recycled record, or construct one when the pool is empty.
    pub fn acquire(&self) -> Particle {
        if let Some(particle) = self.lock().pop() {
            return particle;
        }
        self.constructed.fetch_add(1, Ordering::Relaxed);
        Particle::default()
    }

    pub fn release(&self, particle: Particle) {
        self.lock().push(particle);
    }

    /// Return many records under a single lock
    pub fn release_all<I>(&self, particles: I)
    where
        I: IntoIterator<Item = Particle>,
    {
        self.lock().extend(particles);
    }

    /// Records currently waiting for reuse
    pub fn free_count(&self) -> usize {
        self.lock().len()
    }

    /// Records ever constructed by this pool
    pub fn constructed_count(&self) -> usize {
        self.constructed.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Particle>> {
        // A panic while holding the lock cannot leave the Vec half-updated
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn pool_reuses_released_records() {
        let pool = ParticlePool::new();
        let mut a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.constructed_count(), 2);

        a.lifetime = 42.0;
        pool.release(a);
        assert_eq!(pool.free_count(), 1);

        let c = pool.acquire();
        assert_eq!(c.lifetime, 42.0);
        assert_eq!(pool.constructed_count(), 2);
        assert_eq!(pool.free_count(), 0);

        pool.release_all([b, c]);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn live_records_never_exceed_constructed() {
        let pool = ParticlePool::new();
        let mut live = Vec::new();
        for round in 0..20 {
            for _ in 0..(round % 7) {
                live.push(pool.acquire());
            }
            for _ in 0..(round % 5) {
                if let Some(p) = live.pop() {
                    pool.release(p);
                }
            }
            assert!(live.len() <= pool.constructed_count());
            assert_eq!(live.len() + pool.free_count(), pool.constructed_count());
        }
    }

    #[test]
    fn pool_is_shared_across_threads() {
        let pool = Arc::new(ParticlePool::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let p = pool.acquire();
                        pool.release(p);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(pool.free_count(), pool.constructed_count());
        assert!(pool.constructed_count() <= 4);
    }

    #[test]
    fn particle_expires_after_lifetime() {
        let mut p = Particle {
            age: 1.0,
            lifetime: 4.0,
            ..Default::default()
        };
        assert!(!p.is_expired());
        p.age = 4.0;
        assert!(!p.is_expired());
        p.age = 4.01;
        assert!(p.is_expired());
    }
}
