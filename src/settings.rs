//! Simulation configuration
//!
//! Loaded from JSON. Every field has a default, so partial files work, and
//! `sanitized` replaces out-of-range values before the simulation sees them.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Chain layout and integration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub tentacle_count: usize,
    pub segments_per_tentacle: usize,
    pub segment_rest_length: f32,
    /// Distance from body center to each tentacle base
    pub body_radius: f32,
    /// Mass of the base segment
    pub segment_mass: f32,
    /// Mass lost per segment toward the tip
    pub mass_falloff: f32,
    /// Chain spring constant between consecutive segments (0 = off)
    pub spring_k: f32,
    /// Chain spring relative-velocity damping (0 = off)
    pub spring_damping: f32,
    pub base_damping: f32,
    pub damping_boost: f32,
    /// Gravity at zero happiness
    pub gravity_base: f32,
    /// Gravity removed at full happiness
    pub gravity_happiness_relief: f32,
    pub relaxation_passes: u32,
    /// Physics frames per second of simulated time
    pub frame_rate: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tentacle_count: TENTACLE_COUNT,
            segments_per_tentacle: SEGMENTS_PER_TENTACLE,
            segment_rest_length: SEGMENT_REST_LENGTH,
            body_radius: BODY_RADIUS,
            segment_mass: SEGMENT_MASS,
            mass_falloff: MASS_FALLOFF,
            spring_k: 0.0,
            spring_damping: 0.0,
            base_damping: BASE_DAMPING,
            damping_boost: DAMPING_BOOST,
            gravity_base: 0.5,
            gravity_happiness_relief: 0.4,
            relaxation_passes: RELAXATION_PASSES,
            frame_rate: PHYSICS_FRAME_RATE,
        }
    }
}

/// Idle sway parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub speed_base: f32,
    /// Added to idle speed at full energy
    pub speed_gain: f32,
    pub amplitude_base: f32,
    /// Added to idle amplitude at full energy
    pub amplitude_gain: f32,
    /// Phase step between consecutive segments (traveling wave)
    pub phase_offset: f32,
    /// Sway amplitude to horizontal force
    pub sway_scale: f32,
    /// Calmness below which the sway gets jittery
    pub jitter_calmness: f32,
    pub jitter_multiplier: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            speed_base: 0.03,
            speed_gain: 0.07,
            amplitude_base: 0.5,
            amplitude_gain: 2.0,
            phase_offset: 0.3,
            sway_scale: 0.1,
            jitter_calmness: 0.3,
            jitter_multiplier: 1.5,
        }
    }
}

/// Cursor tracking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    /// Cursor farther than this from the body center is ignored
    pub max_distance: f32,
    pub attraction_strength: f32,
    /// Force per unit of attraction on the tip segment
    pub pull_scale: f32,
    /// Max pupil offset in pixels
    pub pupil_max_offset: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_distance: 200.0,
            attraction_strength: 1.0,
            pull_scale: 0.5,
            pupil_max_offset: 3.0,
        }
    }
}

/// Discrete event detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Idle durations (seconds) that each fire one idle-timeout per streak
    pub idle_thresholds: Vec<f64>,
    pub typing_burst_threshold: usize,
    /// Sliding keystroke window in seconds
    pub typing_burst_window: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            idle_thresholds: vec![30.0, 60.0, 120.0, 300.0],
            typing_burst_threshold: 5,
            typing_burst_window: 2.0,
        }
    }
}

/// Mood smoothing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    /// Fraction of the remaining distance covered per update, in (0, 1]
    pub transition_speed: f32,
    pub idle_decay_after: f64,
    pub idle_decay_step: f32,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            transition_speed: 0.05,
            idle_decay_after: IDLE_DECAY_AFTER,
            idle_decay_step: 0.01,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub idle: IdleConfig,
    pub cursor: CursorConfig,
    pub events: EventConfig,
    pub mood: MoodConfig,
    /// Seed for the simulation RNG
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            idle: IdleConfig::default(),
            cursor: CursorConfig::default(),
            events: EventConfig::default(),
            mood: MoodConfig::default(),
            seed: 0x0C70,
        }
    }
}

impl SimConfig {
    /// Parse from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a file, falling back to defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Malformed config {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read config {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace out-of-range values with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let p = &mut self.physics;
        let dp = &defaults.physics;
        if p.tentacle_count == 0 {
            p.tentacle_count = dp.tentacle_count;
        }
        // Need a pinned base plus at least one free segment
        if p.segments_per_tentacle < 2 {
            p.segments_per_tentacle = dp.segments_per_tentacle;
        }
        if !(p.segment_rest_length > 0.0) {
            p.segment_rest_length = dp.segment_rest_length;
        }
        if !(p.body_radius >= 0.0) {
            p.body_radius = dp.body_radius;
        }
        if !(p.segment_mass > 0.0) {
            p.segment_mass = dp.segment_mass;
        }
        if !(p.mass_falloff >= 0.0) {
            p.mass_falloff = dp.mass_falloff;
        }
        if !(p.spring_k >= 0.0) {
            p.spring_k = dp.spring_k;
        }
        if !(p.spring_damping >= 0.0) {
            p.spring_damping = dp.spring_damping;
        }
        if !(p.base_damping >= 0.0 && p.base_damping < 1.0) {
            p.base_damping = dp.base_damping;
        }
        if !(p.damping_boost >= 0.0) {
            p.damping_boost = dp.damping_boost;
        }
        if !p.gravity_base.is_finite() {
            p.gravity_base = dp.gravity_base;
        }
        if !p.gravity_happiness_relief.is_finite() {
            p.gravity_happiness_relief = dp.gravity_happiness_relief;
        }
        if p.relaxation_passes == 0 {
            p.relaxation_passes = dp.relaxation_passes;
        }
        if !(p.frame_rate > 0.0) {
            p.frame_rate = dp.frame_rate;
        }

        let m = &mut self.mood;
        if !(m.transition_speed > 0.0 && m.transition_speed <= 1.0) {
            m.transition_speed = defaults.mood.transition_speed;
        }
        if !(m.idle_decay_after >= 0.0) {
            m.idle_decay_after = defaults.mood.idle_decay_after;
        }
        if !(m.idle_decay_step >= 0.0) {
            m.idle_decay_step = defaults.mood.idle_decay_step;
        }

        let e = &mut self.events;
        e.idle_thresholds.retain(|t| *t > 0.0 && t.is_finite());
        if e.idle_thresholds.is_empty() {
            e.idle_thresholds = defaults.events.idle_thresholds.clone();
        }
        e.idle_thresholds.sort_by(|a, b| a.total_cmp(b));
        e.idle_thresholds.dedup();
        if e.typing_burst_threshold == 0 {
            e.typing_burst_threshold = defaults.events.typing_burst_threshold;
        }
        if !(e.typing_burst_window > 0.0) {
            e.typing_burst_window = defaults.events.typing_burst_window;
        }

        let c = &mut self.cursor;
        if !(c.max_distance >= 0.0) {
            c.max_distance = defaults.cursor.max_distance;
        }
        if !(c.attraction_strength >= 0.0) {
            c.attraction_strength = defaults.cursor.attraction_strength;
        }
        if !(c.pupil_max_offset >= 0.0) {
            c.pupil_max_offset = defaults.cursor.pupil_max_offset;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "physics": { "tentacle_count": 4 } }"#).unwrap();
        assert_eq!(config.physics.tentacle_count, 4);
        assert_eq!(config.physics.segments_per_tentacle, SEGMENTS_PER_TENTACLE);
        assert_eq!(config.mood, MoodConfig::default());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(SimConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitized_replaces_bad_values() {
        let json = r#"{
            "physics": { "segment_rest_length": -3.0, "base_damping": 1.5, "tentacle_count": 0 },
            "mood": { "transition_speed": 0.0 },
            "events": { "idle_thresholds": [120.0, -1.0, 30.0, 30.0] }
        }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.physics.segment_rest_length, SEGMENT_REST_LENGTH);
        assert_eq!(config.physics.base_damping, BASE_DAMPING);
        assert_eq!(config.physics.tentacle_count, TENTACLE_COUNT);
        assert_eq!(config.mood.transition_speed, 0.05);
        assert_eq!(config.events.idle_thresholds, vec![30.0, 120.0]);
    }

    #[test]
    fn test_json_roundtrip_preserves_defaults() {
        let json = SimConfig::default().to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), SimConfig::default());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = SimConfig::load("/nonexistent/octo-motion.json");
        assert_eq!(config, SimConfig::default());
    }
}
