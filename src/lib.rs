//! Octo Motion - procedural tentacle physics for a desktop creature
//!
//! Core modules:
//! - `sim`: Simulation (vector math, Verlet segments, tentacles, mood, events)
//! - `settings`: Data-driven configuration with JSON defaults

pub mod settings;
pub mod sim;

pub use settings::SimConfig;
pub use sim::{Creature, FrameSnapshot, TickInput, tick};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Physics frames per simulated second
    pub const PHYSICS_FRAME_RATE: f32 = 30.0;
    /// Cap on physics frames consumed by a single tick (spiral-of-death guard)
    pub const MAX_FRAMES_PER_TICK: f32 = 4.0;

    /// Tentacle layout
    pub const TENTACLE_COUNT: usize = 6;
    pub const SEGMENTS_PER_TENTACLE: usize = 8;
    pub const SEGMENT_REST_LENGTH: f32 = 12.0;
    /// Distance of each tentacle base from the body center
    pub const BODY_RADIUS: f32 = 20.0;

    /// Segment mass at the base, reduced per segment toward the tip
    pub const SEGMENT_MASS: f32 = 1.0;
    pub const MASS_FALLOFF: f32 = 0.05;
    pub const MIN_SEGMENT_MASS: f32 = 0.1;

    /// Verlet damping = BASE_DAMPING + stiffness * DAMPING_BOOST (must stay < 1)
    pub const BASE_DAMPING: f32 = 0.95;
    pub const DAMPING_BOOST: f32 = 0.03;
    pub const MAX_DAMPING: f32 = 0.999;

    /// Constraint relaxation passes per frame
    pub const RELAXATION_PASSES: u32 = 3;

    /// Resting mood value for all four variables
    pub const NEUTRAL_MOOD: f32 = 0.5;
    /// Idle seconds after which mood targets drift sleepy
    pub const IDLE_DECAY_AFTER: f64 = 30.0;
}

/// Clamp a mood value to [0, 1], mapping NaN to the neutral value
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        consts::NEUTRAL_MOOD
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
