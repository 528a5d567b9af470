//! Level descriptors and validation
//!
//! A `LevelSpec` carries everything the simulation needs to build a
//! mission: the terrain band and wave parameters, pad placement, physics
//! constants, fuel, and hazard definitions. Malformed input here is the
//! one fatal condition in the core (the sim cannot run on non-finite
//! parameters), so it is surfaced as `LevelError` instead of defaulting.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::*;

/// A gravity well placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlackHoleDef {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_event_radius")]
    pub event_radius: f32,
    #[serde(default = "default_pull_radius")]
    pub pull_radius: f32,
}

fn default_event_radius() -> f32 {
    HOLE_EVENT_RADIUS
}

fn default_pull_radius() -> f32 {
    HOLE_PULL_RADIUS
}

/// A scheduled meteor strike. `target_y_ratio`, when present, re-anchors
/// the target height against the actual world height at level build time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeteorDef {
    #[serde(default)]
    pub start_ms: f32,
    #[serde(default)]
    pub warning_lead_ms: f32,
    #[serde(default = "default_meteor_speed")]
    pub speed: f32,
    #[serde(default = "default_meteor_radius")]
    pub radius: f32,
    pub spawn: Vec2,
    pub target: Vec2,
    #[serde(default)]
    pub target_y_ratio: Option<f32>,
}

fn default_meteor_speed() -> f32 {
    0.32
}

fn default_meteor_radius() -> f32 {
    24.0
}

/// Everything needed to build one mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub world_width: f32,
    /// Terrain band as fractions of the world height, low..high
    pub base_band: [f32; 2],
    /// Wave amplitude as a fraction of the world height
    pub amp: f32,
    pub wave_freq: f32,
    pub wave_scale: f32,
    pub rough_wave_freq: f32,
    pub noise_scale: f32,
    /// Pad center as a fraction of the world width
    pub pad_offset: f32,
    /// Uniform downward gravity (px/ms^2)
    pub gravity: f32,
    pub fuel: f32,
    #[serde(default)]
    pub black_holes: Vec<BlackHoleDef>,
    #[serde(default)]
    pub meteors: Vec<MeteorDef>,
}

/// Rejected level input
#[derive(Debug)]
pub enum LevelError {
    /// A parameter is NaN or infinite
    NonFinite { field: &'static str },
    /// A parameter is outside its legal range
    OutOfRange { field: &'static str, value: f32 },
    /// The world cannot fit a pad plus approach room
    WorldTooNarrow { width: f32 },
    Json(serde_json::Error),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NonFinite { field } => {
                write!(f, "level parameter '{field}' is not finite")
            }
            LevelError::OutOfRange { field, value } => {
                write!(f, "level parameter '{field}' is out of range: {value}")
            }
            LevelError::WorldTooNarrow { width } => {
                write!(f, "world width {width} cannot fit the landing pad")
            }
            LevelError::Json(err) => write!(f, "level descriptor is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Json(err)
    }
}

impl LevelSpec {
    /// Parse and validate a JSON descriptor
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelSpec = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Check every parameter the simulation depends on. Boundary-shaped
    /// values (a hazard slightly out of the world) are fine, the hazard
    /// code clamps them; broken numbers are not.
    pub fn validate(&self) -> Result<(), LevelError> {
        let finite_fields = [
            (self.world_width, "world_width"),
            (self.base_band[0], "base_band[0]"),
            (self.base_band[1], "base_band[1]"),
            (self.amp, "amp"),
            (self.wave_freq, "wave_freq"),
            (self.wave_scale, "wave_scale"),
            (self.rough_wave_freq, "rough_wave_freq"),
            (self.noise_scale, "noise_scale"),
            (self.pad_offset, "pad_offset"),
            (self.gravity, "gravity"),
            (self.fuel, "fuel"),
        ];
        for (value, field) in finite_fields {
            if !value.is_finite() {
                return Err(LevelError::NonFinite { field });
            }
        }
        for hole in &self.black_holes {
            for (value, field) in [
                (hole.x, "black_holes.x"),
                (hole.y, "black_holes.y"),
                (hole.event_radius, "black_holes.event_radius"),
                (hole.pull_radius, "black_holes.pull_radius"),
            ] {
                if !value.is_finite() {
                    return Err(LevelError::NonFinite { field });
                }
            }
        }
        for meteor in &self.meteors {
            for (value, field) in [
                (meteor.start_ms, "meteors.start_ms"),
                (meteor.warning_lead_ms, "meteors.warning_lead_ms"),
                (meteor.speed, "meteors.speed"),
                (meteor.radius, "meteors.radius"),
                (meteor.spawn.x, "meteors.spawn"),
                (meteor.spawn.y, "meteors.spawn"),
                (meteor.target.x, "meteors.target"),
                (meteor.target.y, "meteors.target"),
            ] {
                if !value.is_finite() {
                    return Err(LevelError::NonFinite { field });
                }
            }
            if let Some(ratio) = meteor.target_y_ratio {
                if !ratio.is_finite() {
                    return Err(LevelError::NonFinite {
                        field: "meteors.target_y_ratio",
                    });
                }
            }
        }

        if self.world_width < PAD_WIDTH * 2.0 {
            return Err(LevelError::WorldTooNarrow {
                width: self.world_width,
            });
        }
        let [band_lo, band_hi] = self.base_band;
        if !(0.0..1.0).contains(&band_lo) || band_hi <= band_lo || band_hi > 1.0 {
            return Err(LevelError::OutOfRange {
                field: "base_band",
                value: band_hi,
            });
        }
        if !(0.0..=1.0).contains(&self.pad_offset) {
            return Err(LevelError::OutOfRange {
                field: "pad_offset",
                value: self.pad_offset,
            });
        }
        if self.gravity <= 0.0 {
            return Err(LevelError::OutOfRange {
                field: "gravity",
                value: self.gravity,
            });
        }
        if self.fuel < 0.0 {
            return Err(LevelError::OutOfRange {
                field: "fuel",
                value: self.fuel,
            });
        }
        if self.amp < 0.0 {
            return Err(LevelError::OutOfRange {
                field: "amp",
                value: self.amp,
            });
        }
        Ok(())
    }

    /// The built-in mission table
    pub fn builtin() -> Vec<LevelSpec> {
        vec![
            LevelSpec {
                name: "Apollo Valley".into(),
                world_width: 1600.0,
                base_band: [0.55, 0.8],
                amp: 0.18,
                wave_freq: 0.004,
                wave_scale: 0.9,
                rough_wave_freq: 0.013,
                noise_scale: 0.5,
                pad_offset: 0.62,
                gravity: 0.00015,
                fuel: 120.0,
                black_holes: Vec::new(),
                meteors: Vec::new(),
            },
            LevelSpec {
                name: "Tycho Trench".into(),
                world_width: 2000.0,
                base_band: [0.5, 0.85],
                amp: 0.22,
                wave_freq: 0.006,
                wave_scale: 1.0,
                rough_wave_freq: 0.017,
                noise_scale: 0.65,
                pad_offset: 0.34,
                gravity: 0.00017,
                fuel: 100.0,
                black_holes: vec![BlackHoleDef {
                    x: 1400.0,
                    y: 260.0,
                    event_radius: HOLE_EVENT_RADIUS,
                    pull_radius: HOLE_PULL_RADIUS,
                }],
                meteors: Vec::new(),
            },
            LevelSpec {
                name: "Darkside Ridge".into(),
                world_width: 2400.0,
                base_band: [0.45, 0.8],
                amp: 0.2,
                wave_freq: 0.005,
                wave_scale: 1.1,
                rough_wave_freq: 0.015,
                noise_scale: 0.6,
                pad_offset: 0.7,
                gravity: 0.0002,
                fuel: 120.0,
                black_holes: Vec::new(),
                meteors: vec![
                    MeteorDef {
                        start_ms: 3500.0,
                        warning_lead_ms: 1600.0,
                        speed: 0.32,
                        radius: 26.0,
                        spawn: Vec2::new(600.0, -80.0),
                        target: Vec2::new(900.0, 0.0),
                        target_y_ratio: Some(0.9),
                    },
                    MeteorDef {
                        start_ms: 9000.0,
                        warning_lead_ms: 1600.0,
                        speed: 0.4,
                        radius: 34.0,
                        spawn: Vec2::new(2100.0, -120.0),
                        target: Vec2::new(1500.0, 0.0),
                        target_y_ratio: Some(0.85),
                    },
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_validate() {
        for level in LevelSpec::builtin() {
            level.validate().unwrap();
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut level = LevelSpec::builtin().remove(0);
        level.gravity = f32::NAN;
        assert!(matches!(
            level.validate(),
            Err(LevelError::NonFinite { field: "gravity" })
        ));

        let mut level = LevelSpec::builtin().remove(0);
        level.amp = f32::INFINITY;
        assert!(matches!(level.validate(), Err(LevelError::NonFinite { .. })));
    }

    #[test]
    fn test_band_and_offset_ranges() {
        let mut level = LevelSpec::builtin().remove(0);
        level.base_band = [0.8, 0.5];
        assert!(matches!(
            level.validate(),
            Err(LevelError::OutOfRange { field: "base_band", .. })
        ));

        let mut level = LevelSpec::builtin().remove(0);
        level.pad_offset = 1.5;
        assert!(matches!(
            level.validate(),
            Err(LevelError::OutOfRange { field: "pad_offset", .. })
        ));
    }

    #[test]
    fn test_narrow_world_rejected() {
        let mut level = LevelSpec::builtin().remove(0);
        level.world_width = 100.0;
        assert!(matches!(level.validate(), Err(LevelError::WorldTooNarrow { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let level = LevelSpec::builtin().remove(2);
        let json = serde_json::to_string(&level).unwrap();
        let parsed = LevelSpec::from_json(&json).unwrap();
        assert_eq!(parsed.name, level.name);
        assert_eq!(parsed.meteors.len(), 2);
        assert_eq!(parsed.meteors[0].target_y_ratio, Some(0.9));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "name": "Flats",
            "world_width": 1200.0,
            "base_band": [0.6, 0.8],
            "amp": 0.1,
            "wave_freq": 0.004,
            "wave_scale": 1.0,
            "rough_wave_freq": 0.01,
            "noise_scale": 0.4,
            "pad_offset": 0.5,
            "gravity": 0.00015,
            "fuel": 100.0,
            "meteors": [{ "spawn": [100.0, -80.0], "target": [300.0, 500.0] }]
        }"#;
        let level = LevelSpec::from_json(json).unwrap();
        assert!(level.black_holes.is_empty());
        assert_eq!(level.meteors[0].speed, 0.32);
        assert_eq!(level.meteors[0].radius, 24.0);
        assert_eq!(level.meteors[0].start_ms, 0.0);
    }

    #[test]
    fn test_bad_json_surfaces_error() {
        let err = LevelSpec::from_json("{not json").unwrap_err();
        assert!(matches!(err, LevelError::Json(_)));
        // Display gives a caller-readable message
        assert!(err.to_string().contains("JSON"));
    }
}
