//! A single tentacle: a pinned chain of Verlet segments
//!
//! Per frame the tentacle accumulates forces (chain springs, gravity, idle
//! sway, cursor pull), integrates every segment, then relaxes the distance
//! constraints a fixed number of passes. Mood only changes the derived
//! motion parameters; it never integrates anything by itself.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::mood::MoodVector;
use super::segment::{Segment, apply_gravity, apply_spring};
use super::vector::VectorExt;
use crate::polar_to_cartesian;
use crate::settings::SimConfig;

/// Fixed per-tentacle constants taken from the config at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TentacleTuning {
    pub segment_count: usize,
    pub rest_length: f32,
    pub segment_mass: f32,
    pub mass_falloff: f32,
    pub spring_k: f32,
    pub spring_damping: f32,
    pub base_damping: f32,
    pub damping_boost: f32,
    pub gravity_base: f32,
    pub gravity_happiness_relief: f32,
    pub relaxation_passes: u32,
    pub idle_speed_base: f32,
    pub idle_speed_gain: f32,
    pub idle_amplitude_base: f32,
    pub idle_amplitude_gain: f32,
    pub phase_offset: f32,
    pub sway_scale: f32,
    pub jitter_calmness: f32,
    pub jitter_multiplier: f32,
    pub pull_scale: f32,
}

impl TentacleTuning {
    pub fn from_config(config: &SimConfig) -> Self {
        let p = &config.physics;
        let i = &config.idle;
        Self {
            segment_count: p.segments_per_tentacle.max(2),
            rest_length: p.segment_rest_length,
            segment_mass: p.segment_mass,
            mass_falloff: p.mass_falloff,
            spring_k: p.spring_k,
            spring_damping: p.spring_damping,
            base_damping: p.base_damping,
            damping_boost: p.damping_boost,
            gravity_base: p.gravity_base,
            gravity_happiness_relief: p.gravity_happiness_relief,
            relaxation_passes: p.relaxation_passes,
            idle_speed_base: i.speed_base,
            idle_speed_gain: i.speed_gain,
            idle_amplitude_base: i.amplitude_base,
            idle_amplitude_gain: i.amplitude_gain,
            phase_offset: i.phase_offset,
            sway_scale: i.sway_scale,
            jitter_calmness: i.jitter_calmness,
            jitter_multiplier: i.jitter_multiplier,
            pull_scale: config.cursor.pull_scale,
        }
    }

    fn mass_at(&self, index: usize) -> f32 {
        (self.segment_mass - index as f32 * self.mass_falloff).max(crate::consts::MIN_SEGMENT_MASS)
    }

    fn damping_for(&self, stiffness: f32) -> f32 {
        (self.base_damping + stiffness * self.damping_boost).clamp(0.0, crate::consts::MAX_DAMPING)
    }
}

impl Default for TentacleTuning {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// A procedural tentacle anchored at `base_anchor`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tentacle {
    pub base_anchor: Vec2,
    /// Ordered from base to tip; the first segment is always pinned
    pub segments: Vec<Segment>,
    /// Idle wave phase (radians)
    pub idle_phase: f32,

    // Mood-derived motion parameters (see `update_mood`)
    pub stiffness: f32,
    pub energy: f32,
    pub responsiveness: f32,
    pub gravity_strength: f32,
    pub idle_speed: f32,
    pub idle_amplitude: f32,

    pub tuning: TentacleTuning,
}

impl Tentacle {
    /// Lay out a straight chain from `base_anchor` along `angle`
    pub fn new<R: Rng + ?Sized>(base_anchor: Vec2, angle: f32, tuning: TentacleTuning, rng: &mut R) -> Self {
        let segments = (0..tuning.segment_count)
            .map(|i| {
                let pos = base_anchor + polar_to_cartesian(tuning.rest_length * i as f32, angle);
                let mass = tuning.mass_at(i);
                if i == 0 {
                    Segment::pinned(pos, mass)
                } else {
                    Segment::new(pos, mass)
                }
            })
            .collect();

        Self {
            base_anchor,
            segments,
            idle_phase: rng.random_range(0.0..std::f32::consts::TAU),
            stiffness: 0.5,
            energy: 1.0,
            responsiveness: 0.5,
            gravity_strength: 0.3,
            idle_speed: 0.05,
            idle_amplitude: 1.0,
            tuning,
        }
    }

    /// Recompute motion parameters from a mood vector (values clamped to [0, 1])
    pub fn update_mood(&mut self, mood: MoodVector) {
        let mood = mood.clamped();
        let t = &self.tuning;

        self.energy = mood.energy;
        self.responsiveness = mood.curiosity;

        // Energy: stiffer chain, faster and wider sway
        self.stiffness = 0.3 + mood.energy * 0.5;
        self.idle_speed = t.idle_speed_base + mood.energy * t.idle_speed_gain;
        self.idle_amplitude = t.idle_amplitude_base + mood.energy * t.idle_amplitude_gain;

        // Happiness: less droop
        self.gravity_strength = t.gravity_base - mood.happiness * t.gravity_happiness_relief;

        // Low calmness: jitter
        if mood.calmness < t.jitter_calmness {
            self.idle_amplitude *= t.jitter_multiplier;
        }
    }

    /// Force phase of a frame: advances the idle phase and fills every
    /// segment's force accumulator. Positions are not touched.
    pub fn accumulate_forces(&mut self, cursor: Option<Vec2>, cursor_attraction: f32) {
        self.idle_phase += self.idle_speed * self.energy;

        let t = self.tuning;
        let count = self.segments.len();

        // Optional chain springs; off unless the config sets them
        if t.spring_k > 0.0 || t.spring_damping > 0.0 {
            for i in 1..count {
                let (head, tail) = self.segments.split_at_mut(i);
                apply_spring(&mut head[i - 1], &mut tail[0], t.rest_length, t.spring_k, t.spring_damping);
            }
        }

        for (i, segment) in self.segments.iter_mut().enumerate() {
            if segment.pinned {
                continue;
            }

            apply_gravity(segment, Vec2::new(0.0, self.gravity_strength));

            // Traveling wave along the chain
            let sway = (self.idle_phase + i as f32 * t.phase_offset).sin() * self.idle_amplitude;
            segment.apply_force(Vec2::new(sway * t.sway_scale, 0.0));

            if let Some(target) = cursor {
                if cursor_attraction > 0.0 {
                    let to_cursor = target - segment.position;
                    if to_cursor.length() > 0.0 {
                        // Tip segments are pulled harder than base segments
                        let segment_factor = (i + 1) as f32 / count as f32;
                        let strength = cursor_attraction * self.responsiveness * segment_factor * t.pull_scale;
                        segment.apply_force(to_cursor.normalized() * strength);
                    }
                }
            }
        }
    }

    /// Integration phase of a frame: Verlet step for every segment, then
    /// soft constraint relaxation
    pub fn integrate(&mut self, dt: f32) {
        let damping = self.tuning.damping_for(self.stiffness);
        for segment in &mut self.segments {
            segment.update(dt, damping);
        }
        self.relax();
    }

    /// Full frame: forces then integration
    pub fn update(&mut self, dt: f32, cursor: Option<Vec2>, cursor_attraction: f32) {
        self.accumulate_forces(cursor, cursor_attraction);
        self.integrate(dt);
    }

    fn relax(&mut self) {
        let rest_length = self.tuning.rest_length;
        for _ in 0..self.tuning.relaxation_passes {
            self.pin_base();
            for i in 1..self.segments.len() {
                let parent = self.segments[i - 1].position;
                self.segments[i].constrain_to_parent(parent, rest_length, self.stiffness);
            }
        }
    }

    /// Snap the pinned base segment onto the anchor
    pub fn pin_base(&mut self) {
        if let Some(base) = self.segments.first_mut() {
            base.position = self.base_anchor;
            base.prev_position = self.base_anchor;
        }
    }

    /// Move the anchor; only the pinned segment follows immediately
    pub fn set_base_anchor(&mut self, anchor: Vec2) {
        self.base_anchor = anchor;
        self.pin_base();
    }

    /// Add a velocity impulse to every free segment
    pub fn kick(&mut self, impulse: Vec2) {
        for segment in &mut self.segments {
            segment.kick(impulse);
        }
    }

    pub fn tip_position(&self) -> Vec2 {
        self.segments.last().map(|s| s.position).unwrap_or(self.base_anchor)
    }

    /// Per-frame tip velocity
    pub fn tip_velocity(&self) -> Vec2 {
        self.segments.last().map(|s| s.velocity()).unwrap_or(Vec2::ZERO)
    }

    pub fn segment_positions(&self) -> Vec<Vec2> {
        self.segments.iter().map(|s| s.position).collect()
    }
}
