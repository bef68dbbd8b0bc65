//! Creature state and frame snapshots
//!
//! `Creature` exclusively owns everything a tick mutates. Renderers read a
//! `FrameSnapshot` taken after a tick, never the live state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{BodyPose, BodyState};
use super::events::EventSystem;
use super::mood::{AnimationState, MoodLabel, MoodVector};
use super::system::TentacleSystem;
use super::vector::VectorExt;
use crate::settings::SimConfig;

/// Renderer view of one tentacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TentacleSnapshot {
    /// Absolute positions, base first
    pub segments: Vec<Vec2>,
    pub tip: Vec2,
    /// Pixels per second over the last physics step
    pub tip_velocity: Vec2,
}

/// Immutable copy of everything a renderer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    /// Simulated seconds
    pub time: f64,
    pub mood: MoodVector,
    pub label: MoodLabel,
    pub learning_mode: bool,
    pub tentacles: Vec<TentacleSnapshot>,
    pub body: BodyPose,
}

/// The whole simulated creature
#[derive(Debug)]
pub struct Creature {
    pub config: SimConfig,
    pub animation: AnimationState,
    pub tentacles: TentacleSystem,
    pub events: EventSystem,
    pub body: BodyState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Cursor after range gating, as used by the last tick
    pub(crate) cursor: Option<Vec2>,
    /// Physics frames owed but not yet stepped
    pub(crate) frame_accumulator: f32,
    /// Seconds covered by the last physics step (0 before the first)
    pub(crate) last_step: f32,
    pub(crate) last_label: MoodLabel,
    pub(crate) rng: Pcg32,
}

impl Creature {
    /// Create a creature centered at `center`; the config is sanitized first
    pub fn new(center: Vec2, config: SimConfig) -> Self {
        let config = config.sanitized();
        let mut rng = Pcg32::seed_from_u64(config.seed);

        let animation = AnimationState::new(&config.mood);
        let tentacles = TentacleSystem::new(center, &config, &mut rng);
        let events = EventSystem::new(&config.events, animation.clock());
        let body = BodyState::new(&mut rng);
        let last_label = animation.label();

        log::info!(
            "Creature created: {} tentacles x {} segments, seed {}",
            config.physics.tentacle_count,
            config.physics.segments_per_tentacle,
            config.seed
        );

        Self {
            config,
            animation,
            tentacles,
            events,
            body,
            time_ticks: 0,
            cursor: None,
            frame_accumulator: 0.0,
            last_step: 0.0,
            last_label,
            rng,
        }
    }

    /// Simulated seconds
    pub fn now(&self) -> f64 {
        self.animation.clock()
    }

    pub fn center(&self) -> Vec2 {
        self.tentacles.center
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let frame_rate = self.config.physics.frame_rate;
        let step_frames = self.last_step * frame_rate;
        let tentacles = self
            .tentacles
            .tentacles
            .iter()
            .map(|t| TentacleSnapshot {
                segments: t.segment_positions(),
                tip: t.tip_position(),
                // Per-frame velocity -> per-second; zero before the first step
                tip_velocity: t.tip_velocity().checked_div(step_frames) * frame_rate,
            })
            .collect();

        FrameSnapshot {
            tick: self.time_ticks,
            time: self.now(),
            mood: self.animation.mood(),
            label: self.animation.label(),
            learning_mode: self.animation.learning_mode,
            tentacles,
            body: self
                .body
                .pose(self.center(), self.cursor, self.config.cursor.pupil_max_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creature() {
        let creature = Creature::new(Vec2::new(64.0, 64.0), SimConfig::default());
        assert_eq!(creature.tentacles.tentacles.len(), 6);
        assert_eq!(creature.now(), 0.0);
        assert_eq!(creature.animation.mood(), MoodVector::NEUTRAL);
    }

    #[test]
    fn test_snapshot_before_first_tick() {
        let creature = Creature::new(Vec2::new(64.0, 64.0), SimConfig::default());
        let snapshot = creature.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.label, MoodLabel::Neutral);
        assert_eq!(snapshot.tentacles.len(), 6);
        for tentacle in &snapshot.tentacles {
            assert_eq!(tentacle.segments.len(), 8);
            assert_eq!(tentacle.tip, *tentacle.segments.last().unwrap());
            assert_eq!(tentacle.tip_velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_invalid_config_is_sanitized() {
        let mut config = SimConfig::default();
        config.physics.segments_per_tentacle = 0;
        let creature = Creature::new(Vec2::ZERO, config);
        assert_eq!(creature.tentacles.tentacles[0].segments.len(), 8);
    }
}
