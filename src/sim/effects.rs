//! Cosmetic dust and debris particles
//!
//! Visual-only state: particles read the terrain height field and the
//! shared black-hole pull field but never influence outcomes. Spread uses
//! hashed pseudo-randomness so replays stay deterministic without
//! touching the level RNG.

use glam::Vec2;

use super::gravity::{self, BlackHole};
use super::terrain::TerrainGrid;

/// Pool caps; the oldest particle is evicted when a pool is full
pub const MAX_DUST: usize = 128;
pub const MAX_DEBRIS: usize = 192;

/// Extra gravity and lifetime applied to crash/explosion debris
const DEBRIS_GRAVITY_MULT: f32 = 3.0;
const DEBRIS_LIFE_MULT: f32 = 3.0;

/// A short-lived visual particle
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life_ms: f32,
    pub max_life_ms: f32,
}

impl Particle {
    /// Remaining life as 0..1 for fade-out
    pub fn life_ratio(&self) -> f32 {
        (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
    }
}

/// Both particle pools plus the hash counter that drives their spread
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub dust: Vec<Particle>,
    pub debris: Vec<Particle>,
    spawn_counter: u32,
}

/// Knuth-style multiplicative hash to a float in [0, 1)
fn hash01(seed: u32) -> f32 {
    let h = seed.wrapping_mul(2654435761);
    (h % 10_000) as f32 / 10_000.0
}

impl Effects {
    fn next_seed(&mut self) -> u32 {
        self.spawn_counter = self.spawn_counter.wrapping_add(1);
        self.spawn_counter.wrapping_mul(7919)
    }

    /// Thruster wash kicking dust off the surface under the exhaust.
    /// `proximity` (0..1) scales count and size as the craft gets low.
    pub fn spawn_dust(&mut self, surface: Vec2, proximity: f32) {
        let count = (2.0 + proximity * 4.0).round() as u32;
        for i in 0..count {
            let seed = self.next_seed().wrapping_add(i * 131);
            let radius = 6.0 + hash01(seed) * 6.0 * (0.4 + proximity * 0.6);
            let life = 1200.0 + hash01(seed ^ 0x9e37) * 1000.0;
            let particle = Particle {
                pos: Vec2::new(surface.x + (hash01(seed ^ 0x55) - 0.5) * 24.0, surface.y - radius),
                vel: Vec2::new(
                    (hash01(seed ^ 0xabcd) - 0.5) * 0.08,
                    -0.02 - hash01(seed ^ 0x1234) * 0.04 * (0.6 + proximity * 0.6),
                ),
                radius,
                life_ms: life,
                max_life_ms: life,
            };
            push_capped(&mut self.dust, particle, MAX_DUST);
        }
    }

    /// Explosion shards flung out radially, inheriting part of the source
    /// velocity
    pub fn spawn_explosion(&mut self, point: Vec2, base_vel: Vec2) {
        let count = 22 + (hash01(self.next_seed()) * 10.0) as u32;
        for i in 0..count {
            let seed = self.next_seed().wrapping_add(i * 271);
            let angle = hash01(seed) * std::f32::consts::TAU;
            let speed = 0.1 + hash01(seed ^ 0x77) * 0.4;
            let radius = 3.0 + hash01(seed ^ 0xbeef) * 5.0;
            let life = (900.0 + hash01(seed ^ 0x3c3c) * 700.0) * DEBRIS_LIFE_MULT;
            let particle = Particle {
                pos: point,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed + base_vel * 0.4,
                radius,
                life_ms: life,
                max_life_ms: life,
            };
            push_capped(&mut self.debris, particle, MAX_DEBRIS);
        }
    }

    /// Age and integrate both pools under scaled gravity plus the shared
    /// pull field, resting against the terrain height profile.
    pub fn update(&mut self, dt: f32, gravity: f32, terrain: &TerrainGrid, holes: &[BlackHole]) {
        self.dust.retain_mut(|particle| {
            particle.life_ms -= dt;
            if particle.life_ms <= 0.0 {
                return false;
            }
            particle.vel.y += gravity * dt * 0.2;
            particle.vel.x *= 0.995;
            if let Some(pull) = gravity::field_acceleration(holes, particle.pos) {
                particle.vel += pull * dt * 0.45;
            }
            particle.pos += particle.vel * dt;
            let ground = terrain.height_at(particle.pos.x);
            if particle.pos.y + particle.radius >= ground {
                particle.pos.y = ground - particle.radius;
                particle.vel.y *= -0.15;
                particle.vel.x *= 0.85;
            }
            true
        });

        self.debris.retain_mut(|shard| {
            shard.life_ms -= dt;
            if shard.life_ms <= 0.0 {
                return false;
            }
            shard.vel.y += gravity * dt * DEBRIS_GRAVITY_MULT;
            shard.vel.x *= 0.99;
            if let Some(pull) = gravity::field_acceleration(holes, shard.pos) {
                shard.vel += pull * dt;
            }
            shard.pos += shard.vel * dt;
            let ground = terrain.height_at(shard.pos.x);
            if shard.pos.y + shard.radius >= ground {
                shard.pos.y = ground - shard.radius;
                shard.vel.y *= -0.25;
                shard.vel.x *= 0.8;
            }
            true
        });
    }
}

fn push_capped(pool: &mut Vec<Particle>, particle: Particle, cap: usize) {
    if pool.len() >= cap {
        pool.remove(0);
    }
    pool.push(particle);
}
