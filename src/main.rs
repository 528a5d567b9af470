//! Headless demo entry point
//!
//! Flies a crude scripted descent through the built-in missions and logs
//! what the simulation reports. Useful for eyeballing the core without a
//! renderer attached.

use moonfall::consts::MAX_FRAME_DT_MS;
use moonfall::{LevelSpec, SimState, TickInput, tick};

fn main() {
    env_logger::init();

    let world_height = 720.0;
    let seed = 42;
    for level in LevelSpec::builtin() {
        let mut state =
            SimState::new(&level, world_height, seed).expect("built-in level is valid");
        log::info!(
            "flying '{}': spawn ({:.0}, {:.0}), pad at x={:.0}",
            state.level_name,
            state.lander.pos.x,
            state.lander.pos.y,
            state.pad.x
        );

        let dt = MAX_FRAME_DT_MS / 2.0;
        loop {
            // Brake the descent whenever it gets too fast
            let input = TickInput {
                thrust: state.lander.vel.y > 0.06,
                ..TickInput::default()
            };
            for event in tick(&mut state, &input, dt) {
                log::debug!("event: {event:?}");
            }
            if let Some(outcome) = state.outcome {
                println!(
                    "{}: {} (t={:.1}s, fuel {:.0}%)",
                    state.level_name,
                    outcome.reason(),
                    state.clock_ms / 1000.0,
                    state.lander.fuel_ratio() * 100.0
                );
                break;
            }
            if state.clock_ms > 180_000.0 {
                log::warn!("'{}' timed out without an outcome", state.level_name);
                break;
            }
        }
    }
}
