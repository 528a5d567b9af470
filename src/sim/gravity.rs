//! Black-hole gravity field
//!
//! Pure functions of a position and the hole list. The field returns
//! `None` (not a zero vector) when no hole influences the point, so
//! callers can skip integration work entirely.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A point gravity well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackHole {
    pub pos: Vec2,
    /// Capture boundary: anything inside is destroyed
    pub event_radius: f32,
    /// Influence boundary: pull applies inside this range
    pub pull_radius: f32,
}

impl BlackHole {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            event_radius: HOLE_EVENT_RADIUS,
            pull_radius: HOLE_PULL_RADIUS,
        }
    }

    /// Whether a point sits inside the capture boundary
    pub fn captures(&self, p: Vec2) -> bool {
        self.pos.distance_squared(p) <= self.event_radius * self.event_radius
    }
}

/// Summed acceleration at a point, or `None` when outside every hole's
/// pull radius. Per-hole magnitude and the summed magnitude are both
/// capped at `HOLE_MAX_FORCE`; the distance is clamped to
/// `HOLE_MIN_DISTANCE` so the field stays finite at the center.
pub fn field_acceleration(holes: &[BlackHole], p: Vec2) -> Option<Vec2> {
    if holes.is_empty() {
        return None;
    }
    let mut accel = Vec2::ZERO;
    let mut influenced = false;
    for hole in holes {
        let to_hole = hole.pos - p;
        let dist_sq = to_hole.length_squared();
        if dist_sq > hole.pull_radius * hole.pull_radius {
            continue;
        }
        influenced = true;
        let dist = dist_sq.sqrt().max(HOLE_MIN_DISTANCE);
        // Slower-than-linear falloff keeps mid-range pull meaningful
        let falloff = 1.0 - (dist / hole.pull_radius).min(1.0);
        let base = HOLE_PULL_STRENGTH * falloff.powf(0.8);
        let magnitude = (base * hole.pull_radius / dist).min(HOLE_MAX_FORCE);
        accel += to_hole / dist * magnitude;
    }
    if !influenced {
        return None;
    }
    let total = accel.length();
    if total > HOLE_MAX_FORCE {
        accel *= HOLE_MAX_FORCE / total;
    }
    Some(accel)
}

/// First hole (in declaration order) whose event radius contains the point
pub fn capture_at(holes: &[BlackHole], p: Vec2) -> Option<usize> {
    holes.iter().position(|hole| hole.captures(p))
}

/// Greedily keep holes in input order, dropping any closer than the
/// minimum spacing to one already kept. Authoring-time invariant, not a
/// physics rule.
pub fn filter_min_spacing(holes: Vec<BlackHole>) -> Vec<BlackHole> {
    let spacing_sq = HOLE_MIN_SPACING * HOLE_MIN_SPACING;
    let mut kept: Vec<BlackHole> = Vec::with_capacity(holes.len());
    for hole in holes {
        let too_close = kept
            .iter()
            .any(|existing| existing.pos.distance_squared(hole.pos) < spacing_sq);
        if !too_close {
            kept.push(hole);
        }
    }
    kept
}
