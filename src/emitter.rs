//! Camera-relative particle emitter bridge
//!
//! A deliberately small particle system whose particles live in world space
//! and are rendered through the same projection and cull as every other draw
//! surface primitive. Simulation is CPU-side with a swap-remove pool.

use glam::Vec2;

use crate::backend::types::{Color, TexFlip};
use crate::graphics::Graphics;
use crate::registry::TextureId;

/// Xorshift PRNG for emission jitter. Deterministic per seed.
struct ParticleRng(u32);

impl ParticleRng {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform float in `[0, 1)`
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

struct Particle {
    position: Vec2,
    velocity: Vec2,
    age: f32,
    lifetime: f32,
}

/// Emission parameters
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Particles spawned per second
    pub spawn_rate: f32,
    /// Seconds a particle lives
    pub lifetime: f32,
    /// Emission speed range, world units per second
    pub speed: (f32, f32),
    /// Emission direction, radians
    pub direction: f32,
    /// Half-angle of the emission cone, radians
    pub spread: f32,
    /// Constant acceleration, world units per second squared
    pub gravity: Vec2,
    /// Tint at spawn
    pub start_color: Color,
    /// Tint at expiry
    pub end_color: Color,
    /// On-screen size at spawn, pixels
    pub start_size: f32,
    /// On-screen size at expiry, pixels
    pub end_size: f32,
    /// Hard cap on live particles
    pub max_particles: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 40.0,
            lifetime: 1.5,
            speed: (0.5, 1.5),
            direction: -std::f32::consts::FRAC_PI_2,
            spread: std::f32::consts::FRAC_PI_4,
            gravity: Vec2::new(0.0, 1.0),
            start_color: Color::WHITE,
            end_color: Color::rgba(255, 255, 255, 0),
            start_size: 8.0,
            end_size: 2.0,
            max_particles: 1024,
        }
    }
}

/// A particle emitter anchored at a world position
pub struct ParticleEmitter {
    /// World-space anchor new particles spawn from
    pub position: Vec2,
    config: EmitterConfig,
    texture: Option<TextureId>,
    particles: Vec<Particle>,
    accumulator: f32,
    rng: ParticleRng,
    active: bool,
}

impl ParticleEmitter {
    pub fn new(position: Vec2, config: EmitterConfig) -> Self {
        Self {
            position,
            config,
            texture: None,
            particles: Vec::new(),
            accumulator: 0.0,
            rng: ParticleRng::new(0x2545_F491),
            active: true,
        }
    }

    /// Use a registry texture for particles instead of filled boxes
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Rebind the particle texture, e.g. after a device reset handed out
    /// fresh ids.
    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
    }

    /// Pause or resume emission; live particles keep simulating
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.active {
            self.accumulator += self.config.spawn_rate * dt;
            while self.accumulator >= 1.0 && self.particles.len() < self.config.max_particles {
                self.accumulator -= 1.0;
                self.spawn();
            }
            // Never let a paused-then-resumed emitter burst past the cap.
            self.accumulator = self.accumulator.min(1.0);
        }

        let gravity = self.config.gravity;
        let mut i = 0;
        while i < self.particles.len() {
            let particle = &mut self.particles[i];
            particle.age += dt;
            if particle.age >= particle.lifetime {
                self.particles.swap_remove(i);
                continue;
            }
            particle.velocity += gravity * dt;
            particle.position += particle.velocity * dt;
            i += 1;
        }
    }

    /// Draw every live particle through the shared projection
    pub fn render(&self, graphics: &mut Graphics) {
        for particle in &self.particles {
            let t = (particle.age / particle.lifetime).clamp(0.0, 1.0);
            let color = Color::lerp(self.config.start_color, self.config.end_color, t);
            let size = self.config.start_size + (self.config.end_size - self.config.start_size) * t;
            let size = Vec2::splat(size);
            let pivot = Vec2::splat(0.5);

            match self.texture {
                Some(texture) => graphics.draw_texture(
                    texture,
                    particle.position,
                    pivot,
                    size,
                    0.0,
                    TexFlip::None,
                    color,
                ),
                None => graphics.draw_filled_box(particle.position, pivot, size, color),
            }
        }
    }

    fn spawn(&mut self) {
        let angle = self.config.direction
            + self.rng.range(-self.config.spread, self.config.spread);
        let speed = self.rng.range(self.config.speed.0, self.config.speed.1);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        self.particles.push(Particle {
            position: self.position,
            velocity,
            age: 0.0,
            lifetime: self.config.lifetime,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmitterConfig {
        EmitterConfig {
            spawn_rate: 10.0,
            lifetime: 1.0,
            gravity: Vec2::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn spawns_at_configured_rate() {
        let mut emitter = ParticleEmitter::new(Vec2::ZERO, config());
        emitter.update(0.5);
        assert_eq!(emitter.particle_count(), 5);
    }

    #[test]
    fn particles_expire_after_lifetime() {
        let mut emitter = ParticleEmitter::new(Vec2::ZERO, config());
        emitter.update(0.5);
        emitter.set_active(false);
        emitter.update(2.0);
        assert_eq!(emitter.particle_count(), 0);
    }

    #[test]
    fn inactive_emitter_spawns_nothing() {
        let mut emitter = ParticleEmitter::new(Vec2::ZERO, config());
        emitter.set_active(false);
        emitter.update(1.0);
        assert_eq!(emitter.particle_count(), 0);
    }

    #[test]
    fn respects_particle_cap() {
        let mut emitter = ParticleEmitter::new(
            Vec2::ZERO,
            EmitterConfig {
                spawn_rate: 1000.0,
                max_particles: 16,
                ..config()
            },
        );
        emitter.update(1.0);
        assert_eq!(emitter.particle_count(), 16);
    }
}
