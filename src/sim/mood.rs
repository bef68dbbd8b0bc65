//! Continuous mood state machine
//!
//! Four mood variables chase their targets by exponential smoothing. Event
//! handlers only move targets (plus timestamp bookkeeping); the discrete
//! mood label is derived from the current values by ordered thresholds.
//!
//! Time is a simulated clock in seconds advanced by `update(dt)`, so the
//! state is deterministic under test.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::Event;
use crate::clamp_unit;
use crate::consts::NEUTRAL_MOOD;
use crate::settings::MoodConfig;

/// Long idle drifts energy down to this floor
const IDLE_ENERGY_FLOOR: f32 = 0.2;
/// Long idle drifts calmness up to this ceiling
const IDLE_CALMNESS_CEILING: f32 = 0.9;

/// The (energy, curiosity, happiness, calmness) quadruple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodVector {
    pub energy: f32,
    pub curiosity: f32,
    pub happiness: f32,
    pub calmness: f32,
}

impl MoodVector {
    pub const NEUTRAL: Self = Self::new(NEUTRAL_MOOD, NEUTRAL_MOOD, NEUTRAL_MOOD, NEUTRAL_MOOD);

    pub const fn new(energy: f32, curiosity: f32, happiness: f32, calmness: f32) -> Self {
        Self {
            energy,
            curiosity,
            happiness,
            calmness,
        }
    }

    /// Every component clamped to [0, 1]
    pub fn clamped(self) -> Self {
        Self {
            energy: clamp_unit(self.energy),
            curiosity: clamp_unit(self.curiosity),
            happiness: clamp_unit(self.happiness),
            calmness: clamp_unit(self.calmness),
        }
    }

    fn lerp_toward(self, target: Self, speed: f32) -> Self {
        let step = |c: f32, t: f32| c + (t - c) * speed;
        Self {
            energy: step(self.energy, target.energy),
            curiosity: step(self.curiosity, target.curiosity),
            happiness: step(self.happiness, target.happiness),
            calmness: step(self.calmness, target.calmness),
        }
    }
}

impl Default for MoodVector {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Partial mood assignment; `None` leaves a variable untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoodUpdate {
    pub energy: Option<f32>,
    pub curiosity: Option<f32>,
    pub happiness: Option<f32>,
    pub calmness: Option<f32>,
}

impl MoodUpdate {
    /// Every variable set
    pub fn all(mood: MoodVector) -> Self {
        Self {
            energy: Some(mood.energy),
            curiosity: Some(mood.curiosity),
            happiness: Some(mood.happiness),
            calmness: Some(mood.calmness),
        }
    }

    fn apply_to(&self, mood: &mut MoodVector) {
        if let Some(v) = self.energy {
            mood.energy = clamp_unit(v);
        }
        if let Some(v) = self.curiosity {
            mood.curiosity = clamp_unit(v);
        }
        if let Some(v) = self.happiness {
            mood.happiness = clamp_unit(v);
        }
        if let Some(v) = self.calmness {
            mood.calmness = clamp_unit(v);
        }
    }
}

/// Discrete mood labels derived from the current mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    /// Low energy and high calmness
    Sleepy,
    Curious,
    /// Very high energy
    Hyper,
    Happy,
    /// Low calmness
    Nervous,
    Sad,
    Neutral,
}

impl MoodLabel {
    /// First matching threshold wins; order is part of the contract
    pub fn classify(mood: MoodVector) -> Self {
        if mood.energy < 0.3 && mood.calmness > 0.7 {
            Self::Sleepy
        } else if mood.curiosity > 0.7 {
            Self::Curious
        } else if mood.energy > 0.8 {
            Self::Hyper
        } else if mood.happiness > 0.7 {
            Self::Happy
        } else if mood.calmness < 0.3 {
            Self::Nervous
        } else if mood.happiness < 0.3 {
            Self::Sad
        } else {
            Self::Neutral
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sleepy => "sleepy",
            Self::Curious => "curious",
            Self::Hyper => "hyper",
            Self::Happy => "happy",
            Self::Nervous => "nervous",
            Self::Sad => "sad",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Boundary table between the legacy discrete mood (owned by the evolution
/// engine) and the continuous mood. Entries must not change.
pub const LEGACY_MOOD_TABLE: [(&str, MoodVector); 8] = [
    ("sleepy", MoodVector::new(0.2, 0.2, 0.4, 0.9)),
    ("curious", MoodVector::new(0.6, 0.9, 0.6, 0.6)),
    ("hyper", MoodVector::new(1.0, 0.7, 0.8, 0.2)),
    ("goofy", MoodVector::new(0.7, 0.5, 0.9, 0.4)),
    ("chaotic", MoodVector::new(0.9, 0.8, 0.6, 0.1)),
    ("proud", MoodVector::new(0.6, 0.5, 0.9, 0.7)),
    ("confused", MoodVector::new(0.5, 0.7, 0.4, 0.4)),
    ("excited", MoodVector::new(0.95, 0.8, 0.95, 0.3)),
];

/// Look up a legacy mood label; unknown labels map to neutral
pub fn legacy_mood_profile(label: &str) -> MoodVector {
    LEGACY_MOOD_TABLE
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, mood)| *mood)
        .unwrap_or(MoodVector::NEUTRAL)
}

/// Smoothed mood state with event bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationState {
    current: MoodVector,
    target: MoodVector,
    /// Fraction of the remaining distance covered per update, in (0, 1]
    pub transition_speed: f32,
    pub idle_decay_after: f64,
    pub idle_decay_step: f32,

    /// Simulated seconds since creation
    clock: f64,
    pub last_click_time: f64,
    pub last_idle_time: f64,
    pub last_typing_time: f64,
    pub typing_burst_count: u32,
    pub learning_mode: bool,
    pub learning_end_time: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(&MoodConfig::default())
    }
}

impl AnimationState {
    pub fn new(config: &MoodConfig) -> Self {
        let speed = if config.transition_speed > 0.0 && config.transition_speed <= 1.0 {
            config.transition_speed
        } else {
            MoodConfig::default().transition_speed
        };
        Self {
            current: MoodVector::NEUTRAL,
            target: MoodVector::NEUTRAL,
            transition_speed: speed,
            idle_decay_after: config.idle_decay_after,
            idle_decay_step: config.idle_decay_step,
            clock: 0.0,
            last_click_time: 0.0,
            last_idle_time: 0.0,
            last_typing_time: 0.0,
            typing_burst_count: 0,
            learning_mode: false,
            learning_end_time: 0.0,
        }
    }

    /// Current mood values
    pub fn mood(&self) -> MoodVector {
        self.current
    }

    /// Mood targets being approached
    pub fn target(&self) -> MoodVector {
        self.target
    }

    pub fn energy(&self) -> f32 {
        self.current.energy
    }

    pub fn curiosity(&self) -> f32 {
        self.current.curiosity
    }

    pub fn happiness(&self) -> f32 {
        self.current.happiness
    }

    pub fn calmness(&self) -> f32 {
        self.current.calmness
    }

    /// Simulated time in seconds
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Seconds since the last interaction that reset the idle timer
    pub fn idle_duration(&self) -> f64 {
        self.clock - self.last_idle_time
    }

    /// Advance the clock, smooth toward targets, expire learning mode and
    /// apply idle decay.
    pub fn update(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += f64::from(dt);
        }

        self.current = self.current.lerp_toward(self.target, self.transition_speed).clamped();

        if self.learning_mode && self.clock > self.learning_end_time {
            self.learning_mode = false;
            self.set_mood_targets(MoodUpdate {
                energy: Some(0.5),
                curiosity: Some(0.7),
                happiness: Some(0.6),
                calmness: None,
            });
            log::debug!("Learning mode ended at {:.1}s", self.clock);
        }

        // Nudged on every update while idle, so the drift accumulates. Targets
        // outside the band are pulled back onto the floor or ceiling.
        if self.idle_duration() > self.idle_decay_after {
            let step = self.idle_decay_step;
            self.target.energy = (self.target.energy - step).max(IDLE_ENERGY_FLOOR);
            self.target.calmness = (self.target.calmness + step).min(IDLE_CALMNESS_CEILING);
        }
    }

    /// Set targets for smooth transition (values clamped)
    pub fn set_mood_targets(&mut self, update: MoodUpdate) {
        update.apply_to(&mut self.target);
    }

    /// Set current and target together, skipping the transition
    pub fn set_mood_immediate(&mut self, update: MoodUpdate) {
        update.apply_to(&mut self.target);
        update.apply_to(&mut self.current);
    }

    /// Jitter every target by up to `intensity` (0 to 1) in either direction
    pub fn apply_random_mood_shift<R: Rng + ?Sized>(&mut self, intensity: f32, rng: &mut R) {
        if !(intensity > 0.0) {
            return;
        }
        let intensity = intensity.min(1.0);
        let mut shift = |v: f32| clamp_unit(v + rng.random_range(-intensity..=intensity));
        self.target = MoodVector {
            energy: shift(self.target.energy),
            curiosity: shift(self.target.curiosity),
            happiness: shift(self.target.happiness),
            calmness: shift(self.target.calmness),
        };
    }

    // Event handlers

    pub fn on_click(&mut self) {
        self.last_click_time = self.clock;
        self.last_idle_time = self.clock;
        self.set_mood_targets(MoodUpdate::all(MoodVector::new(0.9, 0.8, 0.8, 0.5)));
    }

    pub fn on_focus_gained(&mut self) {
        self.last_idle_time = self.clock;
        self.set_mood_targets(MoodUpdate {
            energy: Some(0.7),
            curiosity: Some(0.7),
            happiness: Some(0.7),
            calmness: None,
        });
    }

    pub fn on_focus_lost(&mut self) {
        self.set_mood_targets(MoodUpdate {
            energy: Some(0.3),
            curiosity: Some(0.2),
            happiness: None,
            calmness: Some(0.8),
        });
    }

    /// Brief excited reaction: energy target is the current energy plus a bump
    pub fn on_typing_burst(&mut self) {
        self.last_typing_time = self.clock;
        self.last_idle_time = self.clock;
        self.typing_burst_count += 1;

        self.set_mood_targets(MoodUpdate {
            energy: Some((self.current.energy + 0.2).min(1.0)),
            curiosity: Some(0.6),
            happiness: None,
            calmness: Some(0.4),
        });
    }

    /// Longer idle means sleepier targets; 30s or less changes nothing
    pub fn on_idle_timeout(&mut self, duration: f64) {
        if duration > 60.0 {
            self.set_mood_targets(MoodUpdate {
                energy: Some(0.1),
                curiosity: Some(0.1),
                happiness: None,
                calmness: Some(0.95),
            });
        } else if duration > 30.0 {
            self.set_mood_targets(MoodUpdate {
                energy: Some(0.3),
                curiosity: Some(0.3),
                happiness: None,
                calmness: Some(0.8),
            });
        }
    }

    pub fn on_learning_moment(&mut self, duration: f64) {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.learning_mode = true;
        self.learning_end_time = self.clock + duration;
        self.last_idle_time = self.clock;
        self.set_mood_targets(MoodUpdate::all(MoodVector::new(0.9, 1.0, 0.8, 0.3)));
        log::debug!("Learning mode until {:.1}s", self.learning_end_time);
    }

    /// Route a dispatched event to its handler
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::Click => self.on_click(),
            Event::FocusGained => self.on_focus_gained(),
            Event::FocusLost => self.on_focus_lost(),
            Event::TypingBurst { .. } => self.on_typing_burst(),
            Event::IdleTimeout { duration } => self.on_idle_timeout(*duration),
            Event::LearningMoment { duration } => self.on_learning_moment(*duration),
            Event::Custom { .. } => {}
        }
    }

    pub fn label(&self) -> MoodLabel {
        MoodLabel::classify(self.current)
    }

    pub fn get_mood_string(&self) -> &'static str {
        self.label().name()
    }
}
