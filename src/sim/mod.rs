//! Deterministic simulation module
//!
//! All motion logic lives here. This module must stay pure and deterministic:
//! - Caller-supplied `dt` and timestamps only (no clock reads)
//! - Seeded RNG threaded explicitly
//! - Stable iteration order (tentacles by index, segments base to tip)
//! - No rendering, windowing or I/O dependencies

pub mod body;
pub mod events;
pub mod mood;
pub mod segment;
pub mod state;
pub mod system;
pub mod tentacle;
pub mod tick;
pub mod vector;

pub use body::{BodyPose, BodyState, pupil_offset};
pub use events::{
    Event, EventDispatcher, EventKind, EventSystem, FocusTracker, IdleTracker, ListenerId,
    StampedEvent, TypingDetector,
};
pub use mood::{
    AnimationState, LEGACY_MOOD_TABLE, MoodLabel, MoodUpdate, MoodVector, legacy_mood_profile,
};
pub use segment::{Segment, apply_gravity, apply_spring, apply_wind};
pub use state::{Creature, FrameSnapshot, TentacleSnapshot};
pub use system::{Reaction, TentacleSystem};
pub use tentacle::{Tentacle, TentacleTuning};
pub use tick::{TickInput, tick};
pub use vector::{Vector2D, VectorExt};
