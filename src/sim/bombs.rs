//! Droppable bombs with fuse, arming delay, and chain detonation
//!
//! Bombs fall ballistically, rest on the measured surface, and detonate
//! when their fuse runs out. A detonation shortens the fuse of nearby
//! armed bombs (sympathetic arming) instead of detonating them in the
//! same tick, so chains ripple across ticks.

use glam::Vec2;

use super::lander::Lander;
use super::state::GameEvent;
use super::terrain::{Pad, TerrainGrid};
use crate::consts::*;

/// A live bomb
#[derive(Debug, Clone)]
pub struct Bomb {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub fuse_ms: f32,
    pub arming_ms: f32,
    pub grounded: bool,
    pub detonated: bool,
}

impl Bomb {
    /// Past its arming delay, so a chain blast can trigger it
    pub fn armed(&self) -> bool {
        self.arming_ms <= 0.0
    }

    /// Remaining fuse as 0..1, for blink pacing
    pub fn fuse_ratio(&self) -> f32 {
        (self.fuse_ms / BOMB_FUSE_MS).clamp(0.0, 1.0)
    }
}

/// Owns the live bombs and the drop cooldown
#[derive(Debug, Clone, Default)]
pub struct BombSystem {
    bombs: Vec<Bomb>,
    cooldown_ms: f32,
    next_id: u32,
}

impl BombSystem {
    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    /// A drop is allowed while the attempt is live, the cooldown has
    /// elapsed, and the active count is under the cap.
    pub fn can_drop(&self, attempt_over: bool) -> bool {
        !attempt_over && self.cooldown_ms <= 0.0 && self.bombs.len() < BOMB_MAX_ACTIVE
    }

    /// Release a bomb below the craft, inheriting a damped fraction of its
    /// velocity. Starts the drop cooldown.
    pub fn drop_from(&mut self, lander: &Lander) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let radius = (lander.width * 0.8).clamp(10.0, BOMB_CRATER_RADIUS * 0.6);
        self.bombs.push(Bomb {
            id,
            pos: lander.pos + Vec2::new(0.0, lander.height / 2.0 + radius),
            vel: Vec2::new(lander.vel.x * 0.4, lander.vel.y),
            radius,
            fuse_ms: BOMB_FUSE_MS,
            arming_ms: BOMB_ARM_DELAY_MS,
            grounded: false,
            detonated: false,
        });
        self.cooldown_ms = BOMB_DROP_COOLDOWN_MS;
        id
    }

    /// Integrate every live bomb, then detonate the ones whose fuse ran
    /// out this tick. Chained bombs only get their fuse shortened; they go
    /// off on a later tick.
    pub fn update(&mut self, dt: f32, terrain: &mut TerrainGrid, pad: &mut Pad) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.cooldown_ms > 0.0 {
            self.cooldown_ms = (self.cooldown_ms - dt).max(0.0);
        }

        let mut due = Vec::new();
        for (index, bomb) in self.bombs.iter_mut().enumerate() {
            if bomb.detonated {
                continue;
            }
            bomb.fuse_ms -= dt;
            bomb.arming_ms = (bomb.arming_ms - dt).max(0.0);

            bomb.vel.y += BOMB_GRAVITY * dt;
            bomb.vel.x *= BOMB_DRAG;
            bomb.pos += bomb.vel * dt;

            // Reflect off the world's side edges with damping
            if bomb.pos.x < 0.0 {
                bomb.pos.x = 0.0;
                bomb.vel.x = bomb.vel.x.abs() * BOMB_WALL_DAMPING;
            }
            if bomb.pos.x > terrain.width() {
                bomb.pos.x = terrain.width();
                bomb.vel.x = -bomb.vel.x.abs() * BOMB_WALL_DAMPING;
            }

            // Rest on the measured surface, with a little hysteresis before
            // the grounded flag clears again
            let ground_y = terrain.ground_y_at(bomb.pos.x, bomb.pos.y);
            if bomb.pos.y + bomb.radius >= ground_y {
                bomb.pos.y = ground_y - bomb.radius;
                if bomb.vel.y > 0.0 {
                    bomb.vel.y = 0.0;
                }
                bomb.grounded = true;
            } else if bomb.grounded && bomb.pos.y + bomb.radius < ground_y - 1.0 {
                bomb.grounded = false;
            }

            if bomb.fuse_ms <= 0.0 {
                due.push(index);
            }
        }

        for index in due {
            self.detonate(index, terrain, pad, &mut events);
        }
        self.bombs.retain(|bomb| !bomb.detonated);
        events
    }

    /// Idempotent terminal transition: crater the terrain, report the
    /// explosion, then sympathetically arm nearby live bombs.
    fn detonate(
        &mut self,
        index: usize,
        terrain: &mut TerrainGrid,
        pad: &mut Pad,
        events: &mut Vec<GameEvent>,
    ) {
        if self.bombs[index].detonated {
            return;
        }
        self.bombs[index].detonated = true;
        let id = self.bombs[index].id;
        let center = self.bombs[index].pos;

        terrain.deform_crater(
            Some(pad),
            center.x,
            center.y,
            BOMB_CRATER_RADIUS,
            BOMB_CRATER_DEPTH,
        );
        log::debug!("bomb {} detonated at ({:.0}, {:.0})", id, center.x, center.y);
        events.push(GameEvent::BombExploded { id, point: center });

        let chain_radius_sq = BOMB_CHAIN_RADIUS * BOMB_CHAIN_RADIUS;
        for other in &mut self.bombs {
            if other.detonated || !other.armed() {
                continue;
            }
            if other.pos.distance_squared(center) <= chain_radius_sq {
                other.fuse_ms = other.fuse_ms.min(BOMB_CHAIN_FUSE_MS);
                events.push(GameEvent::BombChained { id: other.id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GRID_CELL_SIZE;

    fn flat_world() -> (TerrainGrid, Pad) {
        let mut terrain = TerrainGrid::new(800.0, 400.0, GRID_CELL_SIZE);
        let from_row = (240.0 / GRID_CELL_SIZE) as usize;
        for col in 0..terrain.cols() {
            terrain.fill_column_solid(col as isize, from_row);
        }
        (terrain, Pad::default())
    }

    fn hovering_lander(x: f32, y: f32) -> Lander {
        Lander::new(Vec2::new(x, y), 100.0)
    }

    #[test]
    fn test_drop_gating() {
        let mut system = BombSystem::default();
        let lander = hovering_lander(400.0, 100.0);
        assert!(system.can_drop(false));
        assert!(!system.can_drop(true));

        system.drop_from(&lander);
        // Cooldown blocks an immediate second drop
        assert!(!system.can_drop(false));
    }

    #[test]
    fn test_active_cap() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();
        let lander = hovering_lander(400.0, 100.0);
        for _ in 0..BOMB_MAX_ACTIVE {
            assert!(system.can_drop(false));
            system.drop_from(&lander);
            // Let the cooldown lapse without burning much fuse time
            system.update(BOMB_DROP_COOLDOWN_MS, &mut terrain, &mut pad);
        }
        assert!(!system.can_drop(false));
    }

    #[test]
    fn test_bomb_inherits_damped_velocity() {
        let mut system = BombSystem::default();
        let mut lander = hovering_lander(400.0, 100.0);
        lander.vel = Vec2::new(0.2, 0.1);
        system.drop_from(&lander);
        let bomb = &system.bombs()[0];
        assert!((bomb.vel.x - 0.08).abs() < 1e-6);
        assert!((bomb.vel.y - 0.1).abs() < 1e-6);
        assert!(bomb.pos.y > lander.pos.y);
    }

    #[test]
    fn test_bomb_rests_on_ground() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();
        let lander = hovering_lander(400.0, 200.0);
        system.drop_from(&lander);
        for _ in 0..60 {
            system.update(16.0, &mut terrain, &mut pad);
        }
        let bomb = &system.bombs()[0];
        assert!(bomb.grounded);
        assert!((bomb.pos.y + bomb.radius - 240.0).abs() < 1e-3);
        assert_eq!(bomb.vel.y, 0.0);
    }

    #[test]
    fn test_wall_reflection() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();
        let mut lander = hovering_lander(10.0, 100.0);
        lander.vel.x = -1.0;
        system.drop_from(&lander);
        system.update(32.0, &mut terrain, &mut pad);
        let bomb = &system.bombs()[0];
        assert!(bomb.pos.x >= 0.0);
        assert!(bomb.vel.x >= 0.0);
    }

    #[test]
    fn test_fuse_detonation_craters_terrain() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();
        let lander = hovering_lander(400.0, 200.0);
        system.drop_from(&lander);

        let mut exploded = 0;
        let mut elapsed = 0.0;
        while elapsed <= BOMB_FUSE_MS + 100.0 {
            for ev in system.update(16.0, &mut terrain, &mut pad) {
                if matches!(ev, GameEvent::BombExploded { .. }) {
                    exploded += 1;
                }
            }
            elapsed += 16.0;
        }
        assert_eq!(exploded, 1);
        assert!(system.bombs().is_empty());
        assert!(terrain.ground_y_at(400.0, 0.0) > 240.0);
    }

    #[test]
    fn test_chain_respects_arming_delay() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();

        // An armed bomb and a freshly-dropped one, both near the blast
        system.bombs.push(Bomb {
            id: 100,
            pos: Vec2::new(400.0, 230.0),
            vel: Vec2::ZERO,
            radius: 16.0,
            fuse_ms: 16.0,
            arming_ms: 0.0,
            grounded: true,
            detonated: false,
        });
        system.bombs.push(Bomb {
            id: 101,
            pos: Vec2::new(430.0, 230.0),
            vel: Vec2::ZERO,
            radius: 16.0,
            fuse_ms: BOMB_FUSE_MS,
            arming_ms: 0.0,
            grounded: true,
            detonated: false,
        });
        system.bombs.push(Bomb {
            id: 102,
            pos: Vec2::new(370.0, 230.0),
            vel: Vec2::ZERO,
            radius: 16.0,
            fuse_ms: BOMB_FUSE_MS,
            arming_ms: BOMB_ARM_DELAY_MS,
            grounded: true,
            detonated: false,
        });

        let events = system.update(16.0, &mut terrain, &mut pad);
        let chained: Vec<_> = events
            .iter()
            .filter_map(|ev| match ev {
                GameEvent::BombChained { id } => Some(*id),
                _ => None,
            })
            .collect();
        // The armed neighbor is chained; the one still arming is untouched
        assert_eq!(chained, vec![101]);

        let armed_neighbor = system.bombs().iter().find(|b| b.id == 101).unwrap();
        assert!(armed_neighbor.fuse_ms <= BOMB_CHAIN_FUSE_MS);
        let unarmed_neighbor = system.bombs().iter().find(|b| b.id == 102).unwrap();
        assert!(unarmed_neighbor.fuse_ms > BOMB_FUSE_MS - 100.0);
    }

    #[test]
    fn test_chained_bomb_detonates_on_later_tick() {
        let (mut terrain, mut pad) = flat_world();
        let mut system = BombSystem::default();
        system.bombs.push(Bomb {
            id: 0,
            pos: Vec2::new(400.0, 230.0),
            vel: Vec2::ZERO,
            radius: 16.0,
            fuse_ms: 10.0,
            arming_ms: 0.0,
            grounded: true,
            detonated: false,
        });
        system.bombs.push(Bomb {
            id: 1,
            pos: Vec2::new(440.0, 230.0),
            vel: Vec2::ZERO,
            radius: 16.0,
            fuse_ms: BOMB_FUSE_MS,
            arming_ms: 0.0,
            grounded: true,
            detonated: false,
        });

        let events = system.update(16.0, &mut terrain, &mut pad);
        let exploded_now: Vec<_> = events
            .iter()
            .filter(|ev| matches!(ev, GameEvent::BombExploded { .. }))
            .collect();
        // Only the first goes off this tick; its neighbor was merely armed
        assert_eq!(exploded_now.len(), 1);
        assert_eq!(system.bombs().len(), 1);

        let mut later_explosions = 0;
        for _ in 0..20 {
            for ev in system.update(16.0, &mut terrain, &mut pad) {
                if matches!(ev, GameEvent::BombExploded { .. }) {
                    later_explosions += 1;
                }
            }
        }
        assert_eq!(later_explosions, 1);
        assert!(system.bombs().is_empty());
    }
}
