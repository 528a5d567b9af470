//! Lander rigid body and per-tick integration
//!
//! The craft is independent of the terrain; it only exposes the five
//! contact sample points the orchestrator probes for ground contact.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

use crate::consts::*;

/// Where on the craft a contact sample sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Body,
    Foot,
}

/// A contact sample point in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub kind: ContactKind,
    pub point: Vec2,
}

/// The player craft
#[derive(Debug, Clone)]
pub struct Lander {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Orientation in radians; 0 = upright, not wrapped
    pub angle: f32,
    pub angular_vel: f32,
    pub fuel: f32,
    pub fuel_capacity: f32,

    // Fixed geometry
    pub width: f32,
    pub height: f32,
    pub leg_length: f32,
    pub leg_attach_offset: f32,
    pub leg_foot_offset: f32,

    // Tuning
    pub thrust_power: f32,
    pub rotate_accel: f32,
    pub rotate_damping: f32,
}

impl Lander {
    pub fn new(spawn: Vec2, fuel: f32) -> Self {
        let width = 20.0;
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            angle: 0.0,
            angular_vel: 0.0,
            fuel,
            fuel_capacity: fuel,
            width,
            height: 30.0,
            leg_length: 10.0,
            leg_attach_offset: width / 4.0,
            leg_foot_offset: width / 2.0,
            thrust_power: THRUST_POWER,
            rotate_accel: ROTATE_ACCEL,
            rotate_damping: ROTATE_DAMPING,
        }
    }

    /// Zero motion and refill fuel for a retry
    pub fn reset(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.angle = 0.0;
        self.angular_vel = 0.0;
        self.fuel = self.fuel_capacity;
    }

    /// Semi-implicit step: gravity into velocity, velocity into position,
    /// spin into angle. Angular damping is applied once per call, not per
    /// unit time (tick-rate coupled, see `consts::ROTATE_DAMPING`).
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
        self.angle += self.angular_vel * dt;
        self.angular_vel *= self.rotate_damping;
    }

    /// Accelerate along the craft's forward axis (angle - 90°). No effect
    /// without fuel or throttle. `angle_override` lets scripted flows aim
    /// the burn independently of the hull orientation.
    pub fn apply_thrust(&mut self, dt: f32, throttle: f32, angle_override: Option<f32>) {
        if self.fuel <= 0.0 || throttle <= 0.0 {
            return;
        }
        let angle = angle_override.unwrap_or(self.angle - FRAC_PI_2);
        let accel = self.thrust_power * throttle;
        self.vel += Vec2::new(angle.cos(), angle.sin()) * accel * dt;
        self.fuel = (self.fuel - throttle * dt * FUEL_BURN_RATE).max(0.0);
    }

    /// Spin up in `direction` (-1 left, +1 right)
    pub fn rotate(&mut self, direction: f32, dt: f32) {
        self.angular_vel += self.rotate_accel * dt * direction;
    }

    pub fn fuel_ratio(&self) -> f32 {
        if self.fuel_capacity > 0.0 {
            self.fuel / self.fuel_capacity
        } else {
            0.0
        }
    }

    /// Direction the exhaust plume points (opposite the thrust axis)
    pub fn exhaust_dir(&self) -> Vec2 {
        let angle = self.angle + FRAC_PI_2;
        Vec2::new(angle.cos(), angle.sin())
    }

    /// The five contact samples: hull bottom-center, the two leg attach
    /// points, and the two feet, rotated into world space.
    pub fn contact_points(&self) -> [ContactPoint; 5] {
        let rot = Vec2::from_angle(self.angle);
        let half_h = self.height / 2.0;
        let local = [
            (ContactKind::Body, Vec2::new(0.0, half_h)),
            (ContactKind::Body, Vec2::new(-self.leg_attach_offset, half_h)),
            (ContactKind::Body, Vec2::new(self.leg_attach_offset, half_h)),
            (
                ContactKind::Foot,
                Vec2::new(-self.leg_foot_offset, half_h + self.leg_length),
            ),
            (
                ContactKind::Foot,
                Vec2::new(self.leg_foot_offset, half_h + self.leg_length),
            ),
        ];
        local.map(|(kind, p)| ContactPoint {
            kind,
            point: self.pos + rot.rotate(p),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_applies_gravity_and_damping() {
        let mut lander = Lander::new(Vec2::new(100.0, 100.0), 100.0);
        lander.angular_vel = 0.01;
        lander.integrate(16.0, 0.00015);
        assert!((lander.vel.y - 0.0024).abs() < 1e-6);
        assert!((lander.pos.y - (100.0 + 0.0024 * 16.0)).abs() < 1e-4);
        // Damping is per call, independent of dt
        assert!((lander.angular_vel - 0.01 * ROTATE_DAMPING).abs() < 1e-7);
    }

    #[test]
    fn test_thrust_accelerates_forward_and_burns_fuel() {
        let mut lander = Lander::new(Vec2::ZERO, 100.0);
        lander.apply_thrust(16.0, 1.0, None);
        // Upright craft thrusts straight up (negative y)
        assert!(lander.vel.y < 0.0);
        assert!(lander.vel.x.abs() < 1e-6);
        assert!((lander.fuel - (100.0 - 16.0 * FUEL_BURN_RATE)).abs() < 1e-4);
    }

    #[test]
    fn test_thrust_requires_fuel_and_throttle() {
        let mut lander = Lander::new(Vec2::ZERO, 0.0);
        lander.apply_thrust(16.0, 1.0, None);
        assert_eq!(lander.vel, Vec2::ZERO);

        let mut lander = Lander::new(Vec2::ZERO, 100.0);
        lander.apply_thrust(16.0, 0.0, None);
        assert_eq!(lander.vel, Vec2::ZERO);
        assert_eq!(lander.fuel, 100.0);
    }

    #[test]
    fn test_thrust_angle_override() {
        let mut lander = Lander::new(Vec2::ZERO, 100.0);
        lander.apply_thrust(16.0, 1.0, Some(0.0));
        // Overridden to burn along +x
        assert!(lander.vel.x > 0.0);
        assert!(lander.vel.y.abs() < 1e-6);
    }

    #[test]
    fn test_rotate_direction() {
        let mut lander = Lander::new(Vec2::ZERO, 100.0);
        lander.rotate(-1.0, 16.0);
        assert!(lander.angular_vel < 0.0);
        lander.rotate(1.0, 32.0);
        assert!(lander.angular_vel > 0.0);
    }

    #[test]
    fn test_contact_points_upright() {
        let lander = Lander::new(Vec2::new(500.0, 200.0), 100.0);
        let points = lander.contact_points();
        assert_eq!(points.len(), 5);
        // Feet hang below the hull bottom
        let feet: Vec<_> = points
            .iter()
            .filter(|p| p.kind == ContactKind::Foot)
            .collect();
        assert_eq!(feet.len(), 2);
        for foot in feet {
            assert!((foot.point.y - 225.0).abs() < 1e-4);
        }
        assert!((points[0].point.y - 215.0).abs() < 1e-4);
    }

    #[test]
    fn test_contact_points_rotate_with_craft() {
        let mut lander = Lander::new(Vec2::ZERO, 100.0);
        lander.angle = std::f32::consts::FRAC_PI_2;
        let points = lander.contact_points();
        // Rotated 90°: the bottom-center sample swings to -x... or +x
        // depending on handedness; it must leave the vertical axis
        assert!(points[0].point.x.abs() > 10.0);
        assert!(points[0].point.y.abs() < 1e-4);
    }

    #[test]
    fn test_fuel_ratio() {
        let mut lander = Lander::new(Vec2::ZERO, 120.0);
        assert_eq!(lander.fuel_ratio(), 1.0);
        lander.fuel = 60.0;
        assert_eq!(lander.fuel_ratio(), 0.5);
        lander.fuel_capacity = 0.0;
        assert_eq!(lander.fuel_ratio(), 0.0);
    }
}
