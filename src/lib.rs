//! Moonfall - a 2D lunar-lander simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, flight physics, hazards)
//! - `level`: Level descriptors, validation, and the built-in mission table
//!
//! The crate is headless: rendering, UI, and audio are external consumers
//! that read the per-tick state (`SimState`) and the event list returned by
//! [`sim::tick`]. All distances are world pixels, all times milliseconds.

pub mod level;
pub mod sim;

pub use level::{LevelError, LevelSpec};
pub use sim::{GameEvent, Outcome, SimState, TickInput, tick};

/// Simulation tuning constants
pub mod consts {
    /// Largest frame delta the orchestrator will integrate (ms). Frames
    /// arriving late after a stall are clamped, not subdivided.
    pub const MAX_FRAME_DT_MS: f32 = 32.0;

    /// Terrain grid cell edge (world pixels)
    pub const GRID_CELL_SIZE: f32 = 8.0;

    /// Landing pad footprint
    pub const PAD_WIDTH: f32 = 110.0;
    pub const PAD_HEIGHT: f32 = 10.0;

    /// Flight physics (px/ms units; gravity itself comes from the level)
    pub const THRUST_POWER: f32 = 0.0007;
    pub const ROTATE_ACCEL: f32 = 0.000_01;
    /// Angular damping multiplier, applied once per integrate call.
    /// Tick-rate coupled: tuned against ~60 Hz stepping.
    pub const ROTATE_DAMPING: f32 = 0.99;
    /// Fuel units burned per ms at full throttle
    pub const FUEL_BURN_RATE: f32 = 0.04;

    /// Touchdown thresholds
    pub const LANDING_MAX_SPEED: f32 = 0.08;
    pub const LANDING_MAX_ANGLE: f32 = std::f32::consts::PI / 8.0;
    /// Vertical speed above `LANDING_MAX_SPEED * CRASH_SPEED_FACTOR` is a
    /// crash rather than a recoverable failed landing
    pub const CRASH_SPEED_FACTOR: f32 = 1.6;
    /// How far below the world bottom the lander may drift before the
    /// attempt ends in the abyss
    pub const ABYSS_MARGIN: f32 = 80.0;
    /// Crater carved where the lander comes down hard
    pub const CRASH_CRATER_RADIUS: f32 = 78.0;
    pub const CRASH_CRATER_DEPTH: f32 = 44.0;

    /// Black holes
    pub const HOLE_EVENT_RADIUS: f32 = 42.0;
    pub const HOLE_PULL_RADIUS: f32 = 220.0;
    pub const HOLE_PULL_STRENGTH: f32 = 0.0014;
    pub const HOLE_MAX_FORCE: f32 = 0.0025;
    /// Distance clamp that keeps the field finite at the singularity
    pub const HOLE_MIN_DISTANCE: f32 = 18.0;
    /// Editor-enforced pairwise center spacing
    pub const HOLE_MIN_SPACING: f32 = HOLE_EVENT_RADIUS * 2.1;

    /// Meteors
    pub const METEOR_MIN_RADIUS: f32 = 4.0;
    pub const METEOR_MAX_RADIUS: f32 = 140.0;
    pub const METEOR_MIN_SPEED: f32 = 0.02;
    pub const METEOR_MAX_SPEED: f32 = 2.5;
    /// Spawns are forced at least this far above the world's top edge
    pub const METEOR_SPAWN_ABOVE_MARGIN: f32 = 60.0;
    pub const METEOR_CRATER_RADIUS_SCALE: f32 = 2.1;
    pub const METEOR_CRATER_DEPTH_SCALE: f32 = 1.25;

    /// Bombs
    pub const BOMB_FUSE_MS: f32 = 3000.0;
    /// Window after the drop during which a chain blast cannot trigger it
    pub const BOMB_ARM_DELAY_MS: f32 = 220.0;
    pub const BOMB_DROP_COOLDOWN_MS: f32 = 220.0;
    pub const BOMB_MAX_ACTIVE: usize = 6;
    pub const BOMB_GRAVITY: f32 = 0.0004;
    /// Horizontal drag multiplier, applied once per update call
    pub const BOMB_DRAG: f32 = 0.998;
    pub const BOMB_WALL_DAMPING: f32 = 0.35;
    pub const BOMB_CRATER_RADIUS: f32 = 68.0;
    pub const BOMB_CRATER_DEPTH: f32 = 36.0;
    /// Lander within this range of a detonation is destroyed
    pub const BOMB_KILL_RADIUS: f32 = 74.0;
    pub const BOMB_CHAIN_RADIUS: f32 = 86.0;
    /// Fuse a chained bomb is shortened to (sympathetic arming, not
    /// instant detonation)
    pub const BOMB_CHAIN_FUSE_MS: f32 = 120.0;
}
