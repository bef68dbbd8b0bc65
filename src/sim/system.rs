//! Radial collection of tentacles around a body center
//!
//! Tentacles do not interact. A frame runs in two phases so every force is
//! accumulated before any segment integrates.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::mood::MoodVector;
use super::tentacle::{Tentacle, TentacleTuning};
use super::vector::VectorExt;
use crate::polar_to_cartesian;
use crate::settings::SimConfig;

/// One-shot animation reactions to discrete happenings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    /// Small random kicks
    Wiggle,
    /// Everything flicks upward
    Celebrate,
    /// Large random kicks and a body twist
    Shake,
    /// Radial outward kick
    Burst,
}

impl Reaction {
    /// Map the evolution engine's event names onto reactions
    pub fn from_legacy_event(name: &str) -> Option<Self> {
        match name {
            "studied_python" | "studied_security_plus" => Some(Self::Wiggle),
            "finished_class" => Some(Self::Celebrate),
            "mutation" => Some(Self::Shake),
            "evolution_trigger" => Some(Self::Burst),
            _ => None,
        }
    }
}

/// Owns the tentacles and keeps their bases on a ring around `center`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TentacleSystem {
    pub center: Vec2,
    /// Base ring radius
    pub radius: f32,
    pub tentacles: Vec<Tentacle>,
}

impl TentacleSystem {
    pub fn new<R: Rng + ?Sized>(center: Vec2, config: &SimConfig, rng: &mut R) -> Self {
        let count = config.physics.tentacle_count.max(1);
        let radius = config.physics.body_radius;
        let tuning = TentacleTuning::from_config(config);

        let tentacles = (0..count)
            .map(|i| {
                let angle = Self::base_angle(i, count);
                let base = center + polar_to_cartesian(radius, angle);
                Tentacle::new(base, angle + std::f32::consts::FRAC_PI_2, tuning, rng)
            })
            .collect();

        log::debug!("Tentacle system: {} tentacles around {:?}", count, center);

        Self {
            center,
            radius,
            tentacles,
        }
    }

    fn base_angle(index: usize, count: usize) -> f32 {
        index as f32 / count as f32 * std::f32::consts::TAU
    }

    /// Same mood parameters for every tentacle
    pub fn update_mood(&mut self, mood: MoodVector) {
        for tentacle in &mut self.tentacles {
            tentacle.update_mood(mood);
        }
    }

    /// Advance one frame: all forces first, then all integrations
    pub fn update(&mut self, dt: f32, cursor: Option<Vec2>, cursor_attraction: f32) {
        for tentacle in &mut self.tentacles {
            tentacle.accumulate_forces(cursor, cursor_attraction);
        }
        for tentacle in &mut self.tentacles {
            tentacle.integrate(dt);
        }
    }

    /// Move the body; bases and pinned segments follow, the rest of each
    /// chain continues from where it was
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        let count = self.tentacles.len();
        for (i, tentacle) in self.tentacles.iter_mut().enumerate() {
            let angle = Self::base_angle(i, count);
            tentacle.set_base_anchor(center + polar_to_cartesian(self.radius, angle));
        }
    }

    pub fn apply_reaction<R: Rng + ?Sized>(&mut self, reaction: Reaction, rng: &mut R) {
        let center = self.center;
        for tentacle in &mut self.tentacles {
            let impulse = match reaction {
                Reaction::Wiggle => Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)),
                Reaction::Celebrate => Vec2::new(0.0, -3.0),
                Reaction::Shake => Vec2::new(rng.random_range(-3.0..=3.0), rng.random_range(-3.0..=3.0)),
                Reaction::Burst => (tentacle.base_anchor - center).normalized() * 3.0,
            };
            tentacle.kick(impulse);
        }
    }

    pub fn tips(&self) -> Vec<Vec2> {
        self.tentacles.iter().map(Tentacle::tip_position).collect()
    }

    pub fn segment_positions(&self) -> Vec<Vec<Vec2>> {
        self.tentacles.iter().map(Tentacle::segment_positions).collect()
    }
}
