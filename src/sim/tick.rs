//! Per-frame orchestrator
//!
//! One call advances the whole simulation by a capped delta: input, then
//! lander integration under combined gravity, then the world-bound clamp,
//! then hazard updates (which may deform terrain), then the cosmetic
//! particle layer, then contact/outcome evaluation. The fixed order means
//! a meteor's crater is already visible to this tick's pad realignment
//! and collision query.

use glam::Vec2;

use super::gravity;
use super::state::{GameEvent, Outcome, SimState};
use super::terrain::Penetration;
use crate::consts::*;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub drop_bomb: bool,
}

/// Advance the simulation by `dt_ms` (clamped to `MAX_FRAME_DT_MS`).
/// Returns every event the tick produced, in phase order.
pub fn tick(state: &mut SimState, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
    let dt = dt_ms.clamp(0.0, MAX_FRAME_DT_MS);
    let mut events = Vec::new();
    state.clock_ms += dt as f64;

    let mut thrusting = false;
    if state.outcome.is_none() {
        if input.rotate_left {
            state.lander.rotate(-1.0, dt);
        }
        if input.rotate_right {
            state.lander.rotate(1.0, dt);
        }
        thrusting = input.thrust && state.lander.fuel > 0.0;
        if thrusting {
            state.lander.apply_thrust(dt, 1.0, None);
        }

        // Combined gravity: the uniform field plus any black-hole pull
        if let Some(pull) = gravity::field_acceleration(&state.black_holes, state.lander.pos) {
            state.lander.vel += pull * dt;
        }
        state.lander.integrate(dt, state.gravity);

        if let Some(hole) = gravity::capture_at(&state.black_holes, state.lander.pos) {
            events.push(GameEvent::BlackHoleCapture { hole });
            if state.set_outcome(Outcome::Captured) {
                events.push(GameEvent::OutcomeDecided(Outcome::Captured));
                state
                    .effects
                    .spawn_explosion(state.lander.pos, state.lander.vel);
            }
        }

        if input.drop_bomb && state.bombs.can_drop(state.outcome.is_some()) {
            let id = state.bombs.drop_from(&state.lander);
            events.push(GameEvent::BombDropped { id });
        }
    }

    constrain_to_world(state, &mut events);

    // Hazards keep running after a terminal outcome; only the craft stops
    let meteor_events = state
        .meteors
        .update(dt, &mut state.terrain, &mut state.pad);
    for ev in &meteor_events {
        if let GameEvent::MeteorImpact { point, .. } = ev {
            state.effects.spawn_explosion(*point, Vec2::ZERO);
        }
    }
    events.extend(meteor_events);

    let bomb_events = state.bombs.update(dt, &mut state.terrain, &mut state.pad);
    for ev in &bomb_events {
        if let GameEvent::BombExploded { point, .. } = ev {
            state.effects.spawn_explosion(*point, Vec2::ZERO);
            let in_blast = state.lander.pos.distance(*point) <= BOMB_KILL_RADIUS;
            if in_blast && state.set_outcome(Outcome::Blasted) {
                events.push(GameEvent::OutcomeDecided(Outcome::Blasted));
                state
                    .effects
                    .spawn_explosion(state.lander.pos, state.lander.vel);
            }
        }
    }
    events.extend(bomb_events);

    if thrusting {
        spawn_thruster_dust(state);
    }
    let gravity = state.gravity;
    let SimState {
        effects,
        terrain,
        black_holes,
        ..
    } = state;
    effects.update(dt, gravity, terrain, black_holes);

    if state.outcome.is_none() {
        evaluate_contact(state, &mut events);
    }

    events
}

/// Keep the craft inside the world horizontally; drifting far out the
/// bottom ends the attempt in the abyss.
fn constrain_to_world(state: &mut SimState, events: &mut Vec<GameEvent>) {
    let width = state.terrain.width();
    let height = state.terrain.height();
    let lander = &mut state.lander;
    if lander.pos.x < 0.0 {
        lander.pos.x = 0.0;
    }
    if lander.pos.x > width {
        lander.pos.x = width;
    }
    if lander.pos.y < 0.0 {
        lander.pos.y = 0.0;
    }
    if lander.pos.y > height + ABYSS_MARGIN && state.set_outcome(Outcome::Abyss) {
        events.push(GameEvent::OutcomeDecided(Outcome::Abyss));
    }
}

/// Kick dust off the surface under the exhaust plume
fn spawn_thruster_dust(state: &mut SimState) {
    let origin = state.lander.pos;
    let dir = state.lander.exhaust_dir();
    if let Some(hit) = state.terrain.find_surface_along_ray(origin, dir, 140.0) {
        let proximity = 1.0 - origin.distance(hit) / 140.0;
        state.effects.spawn_dust(hit, proximity.clamp(0.0, 1.0));
    }
}

/// Probe all five contact samples and classify the touchdown. When more
/// than one point penetrates, the deepest wins (deterministic tie-break).
fn evaluate_contact(state: &mut SimState, events: &mut Vec<GameEvent>) {
    let mut deepest: Option<(Vec2, Penetration)> = None;
    for sample in state.lander.contact_points() {
        let pen = state
            .terrain
            .resolve_penetration_at(sample.point.x, sample.point.y);
        if pen.depth > 0.0
            && deepest
                .as_ref()
                .is_none_or(|(_, best)| pen.depth > best.depth)
        {
            deepest = Some((sample.point, pen));
        }
    }
    let Some((contact, _)) = deepest else {
        return;
    };

    let vertical_speed = state.lander.vel.y.abs();
    let rotation = state.lander.angle.abs();
    let pad = state.pad;
    let on_pad = contact.y >= pad.top() - 2.0
        && contact.x >= pad.x - 4.0
        && contact.x <= pad.x + pad.w + 4.0;

    let outcome = if on_pad && vertical_speed < LANDING_MAX_SPEED && rotation < LANDING_MAX_ANGLE {
        Outcome::Landed
    } else if vertical_speed > LANDING_MAX_SPEED * CRASH_SPEED_FACTOR {
        Outcome::Crashed
    } else {
        Outcome::LandingFailed
    };

    if state.set_outcome(outcome) {
        events.push(GameEvent::OutcomeDecided(outcome));
        if outcome == Outcome::Crashed {
            let pos = state.lander.pos;
            state.terrain.deform_crater(
                Some(&mut state.pad),
                pos.x,
                pos.y,
                CRASH_CRATER_RADIUS,
                CRASH_CRATER_DEPTH,
            );
            state.effects.spawn_explosion(pos, state.lander.vel);
        }
    }
}
