//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas capped, subsystems stepped in a fixed order per tick
//! - Seeded RNG only (terrain noise); hashed spread for cosmetics
//! - No rendering or platform dependencies

pub mod bombs;
pub mod effects;
pub mod gravity;
pub mod lander;
pub mod meteors;
pub mod state;
pub mod terrain;
pub mod tick;

pub use bombs::{Bomb, BombSystem};
pub use effects::{Effects, Particle};
pub use gravity::{BlackHole, capture_at, field_acceleration, filter_min_spacing};
pub use lander::{ContactKind, ContactPoint, Lander};
pub use meteors::{ActiveMeteor, MeteorScheduler, MeteorWarning};
pub use state::{GameEvent, Outcome, SimState};
pub use terrain::{Pad, PaintMode, Penetration, TerrainGrid};
pub use tick::{TickInput, tick};
