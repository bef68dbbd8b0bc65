//! Body pose for the renderer: breathing bob, blinking, twist and pupils
//!
//! Pupil offsets are pure functions of eye and cursor position. Blink timing
//! draws from the RNG the caller threads in.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;

/// Eye positions relative to the body center
pub const LEFT_EYE_OFFSET: Vec2 = Vec2::new(-14.0, -14.0);
pub const RIGHT_EYE_OFFSET: Vec2 = Vec2::new(14.0, -14.0);

/// Vertical bob in pixels
const BOB_AMPLITUDE: f32 = 2.0;
/// Seconds between blinks
const BLINK_INTERVAL: std::ops::RangeInclusive<f32> = 2.0..=5.0;
/// Blink closes fully then opens over ~0.1s
const BLINK_DECAY_RATE: f32 = 10.0;
/// Max twist from a shake, degrees
const MAX_TWIST: f32 = 15.0;
/// Fraction of twist removed per second
const TWIST_RECOVERY: f32 = 4.0;

/// Renderer-facing body transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub center: Vec2,
    /// Vertical breathing offset in pixels
    pub bob_offset: f32,
    /// Degrees
    pub rotation: f32,
    /// 0 = open, 1 = closed
    pub blink: f32,
    pub left_pupil: Vec2,
    pub right_pupil: Vec2,
}

/// Animated body state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyState {
    pub bob_phase: f32,
    pub blink: f32,
    /// Seconds until the next blink
    pub blink_timer: f32,
    pub rotation: f32,
}

impl BodyState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            bob_phase: 0.0,
            blink: 0.0,
            blink_timer: rng.random_range(BLINK_INTERVAL),
            rotation: 0.0,
        }
    }

    /// Advance by `dt` seconds; calmer creatures breathe slower
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, calmness: f32, rng: &mut R) {
        let calmness = crate::clamp_unit(calmness);
        self.bob_phase = (self.bob_phase + dt * (1.0 + (1.0 - calmness))) % std::f32::consts::TAU;

        self.blink_timer -= dt;
        if self.blink_timer <= 0.0 {
            self.blink = 1.0;
            self.blink_timer = rng.random_range(BLINK_INTERVAL);
        } else {
            self.blink = (self.blink - dt * BLINK_DECAY_RATE).max(0.0);
        }

        self.rotation -= self.rotation * (dt * TWIST_RECOVERY).min(1.0);
    }

    /// Random twist, used by the shake reaction
    pub fn twist<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.rotation = (self.rotation + rng.random_range(-MAX_TWIST..=MAX_TWIST)).clamp(-MAX_TWIST, MAX_TWIST);
    }

    pub fn bob_offset(&self) -> f32 {
        self.bob_phase.sin() * BOB_AMPLITUDE
    }

    pub fn pose(&self, center: Vec2, cursor: Option<Vec2>, pupil_max_offset: f32) -> BodyPose {
        let body = center + Vec2::new(0.0, self.bob_offset());
        BodyPose {
            center: body,
            bob_offset: self.bob_offset(),
            rotation: self.rotation,
            blink: self.blink,
            left_pupil: pupil_offset(body + LEFT_EYE_OFFSET, cursor, pupil_max_offset),
            right_pupil: pupil_offset(body + RIGHT_EYE_OFFSET, cursor, pupil_max_offset),
        }
    }
}

/// Pupil offset looking from `eye` toward `cursor`, at most `max_offset` long
pub fn pupil_offset(eye: Vec2, cursor: Option<Vec2>, max_offset: f32) -> Vec2 {
    match cursor {
        Some(target) => {
            let to_cursor = target - eye;
            to_cursor.normalized() * to_cursor.length().min(max_offset)
        }
        None => Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pupil_offset_clamped() {
        let eye = Vec2::new(50.0, 50.0);
        let far = pupil_offset(eye, Some(Vec2::new(150.0, 50.0)), 3.0);
        assert!((far - Vec2::new(3.0, 0.0)).length() < 1e-5);

        let near = pupil_offset(eye, Some(Vec2::new(51.0, 50.0)), 3.0);
        assert!((near - Vec2::new(1.0, 0.0)).length() < 1e-5);

        assert_eq!(pupil_offset(eye, Some(eye), 3.0), Vec2::ZERO);
        assert_eq!(pupil_offset(eye, None, 3.0), Vec2::ZERO);
    }

    #[test]
    fn test_blinks_within_interval() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut body = BodyState::new(&mut rng);
        let mut blinks = 0;
        let mut last_blink = 0.0;
        let dt = 1.0 / 30.0;
        for i in 1..=900 {
            body.update(dt, 0.5, &mut rng);
            if body.blink == 1.0 {
                let t = i as f32 * dt;
                if blinks > 0 {
                    let gap = t - last_blink;
                    assert!((1.9..=5.1).contains(&gap), "blink gap {}", gap);
                }
                blinks += 1;
                last_blink = t;
            }
        }
        // 30 seconds at one blink every 2-5 seconds
        assert!((5..=16).contains(&blinks));
        assert!((0.0..=1.0).contains(&body.blink));
    }

    #[test]
    fn test_twist_recovers() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut body = BodyState::new(&mut rng);
        body.rotation = 12.0;
        for _ in 0..60 {
            body.update(1.0 / 30.0, 0.5, &mut rng);
        }
        assert!(body.rotation.abs() < 0.1);
        body.twist(&mut rng);
        assert!(body.rotation.abs() <= MAX_TWIST);
    }

    #[test]
    fn test_bob_bounded() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut body = BodyState::new(&mut rng);
        for _ in 0..500 {
            body.update(0.05, 0.0, &mut rng);
            assert!(body.bob_offset().abs() <= BOB_AMPLITUDE);
        }
        let pose = body.pose(Vec2::new(64.0, 64.0), None, 3.0);
        assert_eq!(pose.center.x, 64.0);
        assert_eq!(pose.left_pupil, Vec2::ZERO);
    }
}
