//! Verlet segments and pairwise forces
//!
//! A segment stores its current and previous position; velocity is implicit
//! in their difference. Forces accumulate during a frame and are consumed
//! (reset) by the integration step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;

/// A single physics body in a tentacle chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub position: Vec2,
    pub prev_position: Vec2,
    /// Always > 0
    pub mass: f32,
    /// Pinned segments ignore forces and integration
    pub pinned: bool,
    /// Per-frame force sum, cleared after every integration step
    #[serde(default)]
    pub force: Vec2,
}

impl Segment {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            prev_position: position,
            mass: if mass > 0.0 { mass } else { crate::consts::MIN_SEGMENT_MASS },
            pinned: false,
            force: Vec2::ZERO,
        }
    }

    pub fn pinned(position: Vec2, mass: f32) -> Self {
        Self {
            pinned: true,
            ..Self::new(position, mass)
        }
    }

    /// Implicit per-frame velocity
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.position - self.prev_position
    }

    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Verlet step: x' = x + (x - x_prev) * damping + (F / m) * dt²
    ///
    /// `damping` must be < 1 for bounded energy under constant force.
    pub fn update(&mut self, dt: f32, damping: f32) {
        if self.pinned {
            self.force = Vec2::ZERO;
            return;
        }

        let velocity = self.velocity() * damping;
        let acceleration = self.force.checked_div(self.mass);

        self.prev_position = self.position;
        self.position += velocity + acceleration * (dt * dt);

        self.force = Vec2::ZERO;
    }

    /// Soft distance constraint toward `parent_pos`.
    ///
    /// Moves this segment by `stiffness * 0.5` of the length error, so a
    /// single pass never fully satisfies the constraint.
    pub fn constrain_to_parent(&mut self, parent_pos: Vec2, rest_length: f32, stiffness: f32) {
        if self.pinned {
            return;
        }

        let delta = self.position - parent_pos;
        let current_length = delta.length();
        if current_length > 0.0 {
            let difference = (current_length - rest_length) / current_length;
            self.position -= delta * (difference * stiffness * 0.5);
        }
    }

    /// Add a velocity impulse by shifting the previous position
    #[inline]
    pub fn kick(&mut self, impulse: Vec2) {
        if !self.pinned {
            self.prev_position -= impulse;
        }
    }
}

/// Spring-damper force between two segments.
///
/// Returns the force applied to `a`; `b` receives its exact negation. A
/// stretched spring pulls the pair together. Coincident segments get no force.
pub fn apply_spring(a: &mut Segment, b: &mut Segment, rest_length: f32, spring_k: f32, damping_k: f32) -> Vec2 {
    let delta = b.position - a.position;
    let current_length = delta.length();
    if current_length == 0.0 {
        return Vec2::ZERO;
    }

    let direction = delta.normalized();
    let extension = current_length - rest_length;
    let spring_force = direction * (extension * spring_k);

    let relative_velocity = b.velocity() - a.velocity();
    let damping_force = direction * (relative_velocity.dot(direction) * damping_k);

    let total = spring_force + damping_force;
    a.apply_force(total);
    b.apply_force(-total);
    total
}

/// Gravity scaled by segment mass
#[inline]
pub fn apply_gravity(segment: &mut Segment, gravity: Vec2) {
    let mass = segment.mass;
    segment.apply_force(gravity * mass);
}

/// Environmental force, independent of mass
#[inline]
pub fn apply_wind(segment: &mut Segment, wind: Vec2) {
    segment.apply_force(wind);
}
