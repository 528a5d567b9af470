//! Simulation context, terminal outcomes, and per-tick events
//!
//! `SimState` is the single explicit context object the orchestrator owns
//! and passes into each subsystem call; there is no hidden global state.
//! It is rebuilt wholesale on retry or level change.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bombs::BombSystem;
use super::effects::Effects;
use super::gravity::{self, BlackHole};
use super::lander::Lander;
use super::meteors::MeteorScheduler;
use super::terrain::{Pad, TerrainGrid};
use crate::level::{LevelError, LevelSpec};

/// How an attempt ended. Set at most once; later contacts and hazard
/// kills are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Touched down on the pad within the speed and angle limits
    Landed,
    /// Came down too hard
    Crashed,
    /// Touched down off-pad or misaligned, but not destructively fast
    LandingFailed,
    /// Drifted out the bottom of the world
    Abyss,
    /// Crossed a black hole's event radius
    Captured,
    /// Destroyed by a bomb blast
    Blasted,
}

impl Outcome {
    pub fn success(self) -> bool {
        matches!(self, Outcome::Landed)
    }

    /// Presentation-layer message for the post-attempt panel
    pub fn reason(self) -> &'static str {
        match self {
            Outcome::Landed => "Landing successful!",
            Outcome::Crashed => "Crash landing!",
            Outcome::LandingFailed => "Landing failed. Align and slow down.",
            Outcome::Abyss => "You drifted into the abyss.",
            Outcome::Captured => "Swallowed by a black hole.",
            Outcome::Blasted => "Destroyed by the blast.",
        }
    }
}

/// Everything notable that happened during one tick, in subsystem order.
/// Subsystems return these instead of taking callbacks, so the
/// orchestrator drains them after each phase.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MeteorWarning { id: u32 },
    MeteorImpact { id: u32, point: Vec2, radius: f32 },
    BombDropped { id: u32 },
    BombExploded { id: u32, point: Vec2 },
    BombChained { id: u32 },
    BlackHoleCapture { hole: usize },
    OutcomeDecided(Outcome),
}

/// The whole simulation for one attempt
#[derive(Debug, Clone)]
pub struct SimState {
    pub level_name: String,
    /// Uniform downward gravity from the level (px/ms^2)
    pub gravity: f32,
    pub seed: u64,
    pub clock_ms: f64,
    pub terrain: TerrainGrid,
    pub pad: Pad,
    pub lander: Lander,
    pub black_holes: Vec<BlackHole>,
    pub meteors: MeteorScheduler,
    pub bombs: BombSystem,
    pub effects: Effects,
    /// Per-column surface heights from generation, for external rendering
    pub height_profile: Vec<f32>,
    pub outcome: Option<Outcome>,
}

impl SimState {
    /// Build a fresh attempt from a level descriptor. The only fallible
    /// construction path in the core: malformed level input is surfaced,
    /// never defaulted.
    pub fn new(level: &LevelSpec, world_height: f32, seed: u64) -> Result<Self, LevelError> {
        level.validate()?;
        if !world_height.is_finite() || world_height <= 0.0 {
            return Err(LevelError::OutOfRange {
                field: "world_height",
                value: world_height,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut pad = Pad::default();
        let (terrain, height_profile) = TerrainGrid::generate(level, world_height, &mut pad, &mut rng);

        let black_holes = gravity::filter_min_spacing(
            level
                .black_holes
                .iter()
                .map(|def| BlackHole {
                    pos: Vec2::new(def.x, def.y),
                    event_radius: def.event_radius,
                    pull_radius: def.pull_radius,
                })
                .collect(),
        );

        // Re-anchor ratio-specified meteor targets against the real height
        let mut meteor_defs = level.meteors.clone();
        for def in &mut meteor_defs {
            if let Some(ratio) = def.target_y_ratio {
                def.target.y = world_height * ratio;
            }
        }
        let meteors = MeteorScheduler::new(&meteor_defs, terrain.width(), terrain.height());

        // Spawn beside the pad, above the highest terrain in reach
        let spawn_x = (pad.x - 120.0).clamp(40.0, (terrain.width() - 40.0).max(40.0));
        let min_height = height_profile.iter().copied().fold(f32::MAX, f32::min);
        let spawn_y = (min_height - 120.0).max(40.0);
        let mut lander = Lander::new(Vec2::new(spawn_x, spawn_y), level.fuel);
        lander.vel.x = 0.04;

        log::info!(
            "level '{}' ready: {}x{} cells, {} hole(s), {} meteor(s)",
            level.name,
            terrain.cols(),
            terrain.rows(),
            black_holes.len(),
            meteors.pending_count(),
        );

        Ok(Self {
            level_name: level.name.clone(),
            gravity: level.gravity,
            seed,
            clock_ms: 0.0,
            terrain,
            pad,
            lander,
            black_holes,
            meteors,
            bombs: BombSystem::default(),
            effects: Effects::default(),
            height_profile,
            outcome: None,
        })
    }

    /// Record the terminal outcome. Returns false (and changes nothing)
    /// when one is already set.
    pub fn set_outcome(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        log::info!("attempt over: {}", outcome.reason());
        self.outcome = Some(outcome);
        true
    }

    /// Height of the craft above the surface directly below it
    pub fn altitude(&self) -> f32 {
        let ground = self.terrain.ground_y_at(self.lander.pos.x, self.lander.pos.y);
        (ground - self.lander.pos.y).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_playable_state() {
        let level = LevelSpec::builtin().remove(0);
        let state = SimState::new(&level, 720.0, 5).unwrap();
        assert!(state.outcome.is_none());
        assert_eq!(state.height_profile.len(), state.terrain.cols());
        assert_eq!(state.lander.fuel, level.fuel);
        // Spawn sits inside the world, above the terrain
        assert!(state.lander.pos.x >= 40.0);
        assert!(state.lander.pos.x <= state.terrain.width() - 40.0);
        assert!(state.altitude() > 0.0);
    }

    #[test]
    fn test_new_rejects_bad_height() {
        let level = LevelSpec::builtin().remove(0);
        assert!(SimState::new(&level, f32::NAN, 5).is_err());
        assert!(SimState::new(&level, -10.0, 5).is_err());
    }

    #[test]
    fn test_new_rejects_bad_level() {
        let mut level = LevelSpec::builtin().remove(0);
        level.gravity = 0.0;
        assert!(SimState::new(&level, 720.0, 5).is_err());
    }

    #[test]
    fn test_outcome_set_once() {
        let level = LevelSpec::builtin().remove(0);
        let mut state = SimState::new(&level, 720.0, 5).unwrap();
        assert!(state.set_outcome(Outcome::Crashed));
        assert!(!state.set_outcome(Outcome::Landed));
        assert_eq!(state.outcome, Some(Outcome::Crashed));
    }

    #[test]
    fn test_ratio_targets_resolved_against_height() {
        let level = LevelSpec::builtin().remove(2);
        let state = SimState::new(&level, 720.0, 5).unwrap();
        // Both strikes survive normalization and are waiting to fire
        assert_eq!(state.meteors.pending_count(), 2);
    }

    #[test]
    fn test_hole_spacing_enforced() {
        let mut level = LevelSpec::builtin().remove(0);
        level.black_holes = vec![
            crate::level::BlackHoleDef {
                x: 500.0,
                y: 200.0,
                event_radius: 42.0,
                pull_radius: 220.0,
            },
            crate::level::BlackHoleDef {
                x: 520.0,
                y: 200.0,
                event_radius: 42.0,
                pull_radius: 220.0,
            },
        ];
        let state = SimState::new(&level, 720.0, 5).unwrap();
        assert_eq!(state.black_holes.len(), 1);
    }
}
