//! Scheduled meteor strikes
//!
//! Each meteor runs SCHEDULED -> WARNING_ISSUED -> IN_FLIGHT -> IMPACTED.
//! Pending events are kept in ascending start order fixed at scheduling
//! time; launched and terminal entries leave the pending list so it never
//! needs a re-sort. Impacts resolve at the measured terrain surface, so
//! craters always land on the current (possibly already deformed) ground.

use glam::Vec2;

use super::state::GameEvent;
use super::terrain::{Pad, TerrainGrid};
use crate::consts::*;
use crate::level::MeteorDef;

#[derive(Debug, Clone)]
struct ScheduledMeteor {
    id: u32,
    spawn: Vec2,
    target: Vec2,
    radius: f32,
    speed: f32,
    start_ms: f32,
    warning_lead_ms: f32,
    warning_start_ms: f32,
    warning_issued: bool,
}

/// A pending-strike warning surfaced to the presentation layer
#[derive(Debug, Clone)]
pub struct MeteorWarning {
    pub id: u32,
    pub spawn: Vec2,
    pub target: Vec2,
    pub radius: f32,
    pub start_ms: f32,
    pub end_ms: f32,
    /// 0..1 countdown toward flight start
    pub progress: f32,
}

/// A meteor in flight
#[derive(Debug, Clone)]
pub struct ActiveMeteor {
    pub id: u32,
    pub radius: f32,
    pub spawn: Vec2,
    pub target: Vec2,
    path: Vec2,
    duration_ms: f32,
    elapsed_ms: f32,
    pub pos: Vec2,
    /// Finite-difference velocity estimate; effects read it for orientation
    pub vel: Vec2,
    exploded: bool,
}

/// Time-driven hazard timeline
#[derive(Debug, Clone, Default)]
pub struct MeteorScheduler {
    clock_ms: f32,
    pending: Vec<ScheduledMeteor>,
    warnings: Vec<MeteorWarning>,
    active: Vec<ActiveMeteor>,
}

impl MeteorScheduler {
    /// Normalize the level's definitions and fix the processing order by
    /// ascending scheduled start.
    pub fn new(defs: &[MeteorDef], world_width: f32, world_height: f32) -> Self {
        let mut pending: Vec<ScheduledMeteor> = defs
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let spawn = Vec2::new(
                    def.spawn.x.clamp(0.0, world_width),
                    def.spawn.y.min(-METEOR_SPAWN_ABOVE_MARGIN),
                );
                let target = Vec2::new(
                    def.target.x.clamp(0.0, world_width),
                    def.target.y.clamp(-400.0, world_height + 600.0),
                );
                let start_ms = def.start_ms.max(0.0);
                let warning_lead_ms = def.warning_lead_ms.max(0.0).min(start_ms);
                ScheduledMeteor {
                    id: index as u32,
                    spawn,
                    target,
                    radius: def.radius.clamp(METEOR_MIN_RADIUS, METEOR_MAX_RADIUS),
                    speed: def.speed.clamp(METEOR_MIN_SPEED, METEOR_MAX_SPEED),
                    start_ms,
                    warning_lead_ms,
                    warning_start_ms: (start_ms - warning_lead_ms).max(0.0),
                    warning_issued: false,
                }
            })
            .collect();
        pending.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
        Self {
            clock_ms: 0.0,
            pending,
            warnings: Vec::new(),
            active: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[MeteorWarning] {
        &self.warnings
    }

    pub fn active(&self) -> &[ActiveMeteor] {
        &self.active
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the timeline. Warnings fire once, flights interpolate from
    /// spawn toward target, and anything reaching the measured surface (or
    /// its flight duration) impacts immediately.
    pub fn update(&mut self, dt: f32, terrain: &mut TerrainGrid, pad: &mut Pad) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.clock_ms += dt;

        if !self.pending.is_empty() {
            let mut remaining = Vec::with_capacity(self.pending.len());
            for mut event in self.pending.drain(..) {
                if !event.warning_issued && self.clock_ms >= event.warning_start_ms {
                    // Zero lead goes straight to flight-readiness
                    if event.warning_lead_ms > 0.0 {
                        self.warnings.push(MeteorWarning {
                            id: event.id,
                            spawn: event.spawn,
                            target: event.target,
                            radius: event.radius,
                            start_ms: event.warning_start_ms,
                            end_ms: event.start_ms,
                            progress: 0.0,
                        });
                        events.push(GameEvent::MeteorWarning { id: event.id });
                    }
                    event.warning_issued = true;
                }
                if self.clock_ms >= event.start_ms {
                    let path = event.target - event.spawn;
                    let duration_ms = path.length() / event.speed.max(1e-4);
                    self.active.push(ActiveMeteor {
                        id: event.id,
                        radius: event.radius,
                        spawn: event.spawn,
                        target: event.target,
                        path,
                        duration_ms,
                        elapsed_ms: 0.0,
                        pos: event.spawn,
                        vel: Vec2::ZERO,
                        exploded: false,
                    });
                } else {
                    remaining.push(event);
                }
            }
            self.pending = remaining;
        }

        for warn in &mut self.warnings {
            warn.progress = if warn.end_ms > warn.start_ms {
                ((self.clock_ms - warn.start_ms) / (warn.end_ms - warn.start_ms)).min(1.0)
            } else {
                1.0
            };
        }
        let clock = self.clock_ms;
        self.warnings.retain(|warn| clock < warn.end_ms);

        if self.active.is_empty() {
            return events;
        }
        let mut remaining = Vec::with_capacity(self.active.len());
        for mut meteor in self.active.drain(..) {
            if meteor.exploded {
                continue;
            }
            let prev = meteor.pos;
            meteor.elapsed_ms += dt;
            let progress = if meteor.duration_ms > 0.0 {
                (meteor.elapsed_ms / meteor.duration_ms).min(1.0)
            } else {
                1.0
            };
            meteor.pos = meteor.spawn + meteor.path * progress;
            if dt > 0.0 {
                meteor.vel = (meteor.pos - prev) / dt;
            }

            let ground_y = terrain.ground_y_at(meteor.pos.x, meteor.pos.y);
            if meteor.pos.y >= ground_y || progress >= 1.0 {
                resolve_impact(&mut meteor, &mut self.warnings, terrain, pad, &mut events);
                continue;
            }
            remaining.push(meteor);
        }
        self.active = remaining;
        events
    }
}

/// Terminal transition: crater the measured surface, drop the matching
/// warning, report the impact. Guarded by the `exploded` flag.
fn resolve_impact(
    meteor: &mut ActiveMeteor,
    warnings: &mut Vec<MeteorWarning>,
    terrain: &mut TerrainGrid,
    pad: &mut Pad,
    events: &mut Vec<GameEvent>,
) {
    if meteor.exploded {
        return;
    }
    meteor.exploded = true;
    let impact_x = meteor.pos.x.clamp(0.0, terrain.width());
    let ground_y = terrain.ground_y_at(impact_x, meteor.pos.y);
    let crater_radius = (meteor.radius * 1.2)
        .max((meteor.radius * METEOR_CRATER_RADIUS_SCALE).min(METEOR_MAX_RADIUS * 1.6));
    let crater_depth = (meteor.radius * 0.6).max(meteor.radius * METEOR_CRATER_DEPTH_SCALE);
    terrain.deform_crater(Some(pad), impact_x, ground_y, crater_radius, crater_depth);
    warnings.retain(|w| w.id != meteor.id);
    log::debug!(
        "meteor {} impact at ({:.0}, {:.0}), crater r={:.0}",
        meteor.id,
        impact_x,
        ground_y,
        crater_radius
    );
    events.push(GameEvent::MeteorImpact {
        id: meteor.id,
        point: Vec2::new(impact_x, ground_y),
        radius: meteor.radius,
    });
}
