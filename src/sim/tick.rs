//! Per-frame simulation tick
//!
//! Feeds the sampled inputs through the event system into the mood state,
//! pushes mood into the tentacles and advances physics. Works under any
//! positive `dt`; physics always steps whole frames at the config frame rate.

use glam::Vec2;

use super::mood::{MoodUpdate, legacy_mood_profile};
use super::state::Creature;
use super::system::Reaction;
use crate::consts::MAX_FRAMES_PER_TICK;

/// Keeps 0.99999994 accumulated frames from waiting a whole extra tick
const FRAME_EPSILON: f32 = 1e-4;

/// Inputs sampled by the host for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in creature space (None when tracking is off)
    pub cursor: Option<Vec2>,
    pub click: bool,
    /// Keystrokes since the last tick
    pub keystrokes: u32,
    /// New focus flag; only changes emit events
    pub focus: Option<bool>,
    /// Start a learning moment lasting this many seconds
    pub learning_moment: Option<f64>,
    /// Discrete mood label from the evolution engine
    pub legacy_mood: Option<String>,
    pub reaction: Option<Reaction>,
    /// Random target jitter intensity
    pub mood_shift: Option<f32>,
    /// Re-center the body (window drag)
    pub move_to: Option<Vec2>,
}

/// Advance the creature by `dt` seconds
pub fn tick(creature: &mut Creature, input: &TickInput, dt: f32) {
    if !(dt.is_finite() && dt > 0.0) {
        log::warn!("Ignoring tick with dt={}", dt);
        return;
    }

    creature.time_ticks += 1;
    let now = creature.now() + f64::from(dt);

    if let Some(center) = input.move_to.filter(|c| c.is_finite()) {
        creature.tentacles.set_center(center);
    }

    // Discrete inputs -> events
    let events = &mut creature.events;
    if input.click {
        events.on_click(now);
    }
    for _ in 0..input.keystrokes {
        events.on_keystroke(now);
    }
    if let Some(has_focus) = input.focus {
        events.on_focus_change(has_focus, now);
    }
    if let Some(duration) = input.learning_moment {
        events.trigger_learning_moment(duration, now);
    }
    events.update(now);

    // Events -> mood targets
    for stamped in events.drain() {
        creature.animation.apply_event(&stamped.event);
    }
    if let Some(label) = &input.legacy_mood {
        creature
            .animation
            .set_mood_targets(MoodUpdate::all(legacy_mood_profile(label)));
    }
    if let Some(intensity) = input.mood_shift {
        creature.animation.apply_random_mood_shift(intensity, &mut creature.rng);
    }
    if let Some(reaction) = input.reaction {
        creature.tentacles.apply_reaction(reaction, &mut creature.rng);
        if reaction == Reaction::Shake {
            creature.body.twist(&mut creature.rng);
        }
    }

    creature.animation.update(dt);
    let label = creature.animation.label();
    if label != creature.last_label {
        log::debug!("Mood {} -> {} at {:.1}s", creature.last_label, label, creature.now());
        creature.last_label = label;
    }

    // Mood -> physics
    let mood = creature.animation.mood();
    creature.tentacles.update_mood(mood);

    let cursor_config = &creature.config.cursor;
    let center = creature.tentacles.center;
    creature.cursor = input
        .cursor
        .filter(|_| cursor_config.enabled)
        .filter(|c| c.is_finite() && c.distance(center) <= cursor_config.max_distance);
    let attraction = cursor_config.attraction_strength;

    // Fixed one-frame physics steps; the fraction of a frame left over
    // carries into the next tick so motion is independent of the host rate
    let frame_rate = creature.config.physics.frame_rate;
    creature.frame_accumulator = (creature.frame_accumulator + dt * frame_rate).min(MAX_FRAMES_PER_TICK);
    let mut steps = 0;
    while creature.frame_accumulator >= 1.0 - FRAME_EPSILON {
        creature.tentacles.update(1.0, creature.cursor, attraction);
        creature.frame_accumulator = (creature.frame_accumulator - 1.0).max(0.0);
        steps += 1;
    }
    if steps > 0 {
        creature.last_step = 1.0 / frame_rate;
    }

    creature.body.update(dt, mood.calmness, &mut creature.rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::mood::MoodLabel;

    const DT: f32 = 1.0 / 30.0;

    fn make_creature() -> Creature {
        Creature::new(Vec2::new(200.0, 200.0), SimConfig::default())
    }

    #[test]
    fn test_click_raises_energy_gradually() {
        let mut creature = make_creature();
        tick(
            &mut creature,
            &TickInput {
                click: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(creature.animation.target().energy, 0.9);
        let after_one = creature.animation.energy();
        assert!(after_one > 0.5 && after_one < 0.9);

        for _ in 0..200 {
            tick(&mut creature, &TickInput::default(), DT);
        }
        assert!((creature.animation.energy() - 0.9).abs() < 0.01);
    }

    #[test]
    fn test_invalid_dt_is_noop() {
        let mut creature = make_creature();
        let before = creature.snapshot();
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            tick(&mut creature, &TickInput::default(), dt);
        }
        assert_eq!(creature.snapshot(), before);
    }

    #[test]
    fn test_determinism() {
        let mut a = make_creature();
        let mut b = make_creature();
        let inputs = [
            TickInput {
                cursor: Some(Vec2::new(260.0, 150.0)),
                ..Default::default()
            },
            TickInput {
                reaction: Some(Reaction::Shake),
                mood_shift: Some(0.2),
                ..Default::default()
            },
            TickInput {
                keystrokes: 3,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..10 {
            for input in &inputs {
                tick(&mut a, input, DT);
                tick(&mut b, input, DT);
            }
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_typing_burst_from_keystrokes() {
        let mut creature = make_creature();
        tick(
            &mut creature,
            &TickInput {
                keystrokes: 5,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(creature.animation.typing_burst_count, 1);
        assert_eq!(creature.animation.target().curiosity, 0.6);
    }

    #[test]
    fn test_learning_moment_end_to_end() {
        let mut creature = make_creature();
        tick(
            &mut creature,
            &TickInput {
                learning_moment: Some(5.0),
                ..Default::default()
            },
            DT,
        );
        assert!(creature.animation.learning_mode);
        assert!(creature.snapshot().learning_mode);

        for _ in 0..(6 * 30) {
            tick(&mut creature, &TickInput::default(), DT);
        }
        assert!(!creature.animation.learning_mode);
        let target = creature.animation.target();
        assert_eq!(target.energy, 0.5);
        assert_eq!(target.curiosity, 0.7);
        assert_eq!(target.happiness, 0.6);
    }

    #[test]
    fn test_long_idle_gets_sleepy() {
        let mut creature = make_creature();
        for _ in 0..(120 * 30) {
            tick(&mut creature, &TickInput::default(), DT);
        }
        assert_eq!(creature.animation.label(), MoodLabel::Sleepy);
        assert_eq!(creature.snapshot().label, MoodLabel::Sleepy);

        tick(
            &mut creature,
            &TickInput {
                click: true,
                ..Default::default()
            },
            DT,
        );
        for _ in 0..60 {
            tick(&mut creature, &TickInput::default(), DT);
        }
        assert_ne!(creature.animation.label(), MoodLabel::Sleepy);
    }

    #[test]
    fn test_focus_loss_is_edge_triggered() {
        let mut creature = make_creature();
        let lose_focus = TickInput {
            focus: Some(false),
            ..Default::default()
        };
        tick(&mut creature, &lose_focus, DT);
        assert_eq!(creature.animation.target().calmness, 0.8);

        // Repeated false does not re-emit, so manual targets survive
        creature.animation.set_mood_targets(MoodUpdate {
            calmness: Some(0.1),
            ..Default::default()
        });
        tick(&mut creature, &lose_focus, DT);
        assert_eq!(creature.animation.target().calmness, 0.1);
    }

    #[test]
    fn test_legacy_mood_sets_targets() {
        let mut creature = make_creature();
        tick(
            &mut creature,
            &TickInput {
                legacy_mood: Some("hyper".to_string()),
                ..Default::default()
            },
            DT,
        );
        let target = creature.animation.target();
        assert_eq!(target.energy, 1.0);
        assert_eq!(target.calmness, 0.2);
    }

    #[test]
    fn test_far_cursor_is_ignored() {
        let mut tracked = make_creature();
        let mut untracked = make_creature();
        let far = TickInput {
            cursor: Some(Vec2::new(900.0, 900.0)),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut tracked, &far, DT);
            tick(&mut untracked, &TickInput::default(), DT);
        }
        assert_eq!(tracked.snapshot(), untracked.snapshot());
    }

    #[test]
    fn test_near_cursor_moves_pupils() {
        let mut creature = make_creature();
        tick(
            &mut creature,
            &TickInput {
                cursor: Some(Vec2::new(300.0, 200.0)),
                ..Default::default()
            },
            DT,
        );
        let body = creature.snapshot().body;
        assert!(body.left_pupil.x > 0.0);
        assert!(body.right_pupil.length() <= creature.config.cursor.pupil_max_offset + 1e-4);
    }

    #[test]
    fn test_move_to_recenters() {
        let mut creature = make_creature();
        for _ in 0..10 {
            tick(&mut creature, &TickInput::default(), DT);
        }
        tick(
            &mut creature,
            &TickInput {
                move_to: Some(Vec2::new(400.0, 100.0)),
                ..Default::default()
            },
            DT,
        );
        assert_eq!(creature.center(), Vec2::new(400.0, 100.0));
        for tentacle in &creature.tentacles.tentacles {
            assert_eq!(tentacle.segments[0].position, tentacle.base_anchor);
            assert!((tentacle.base_anchor.distance(Vec2::new(400.0, 100.0)) - 20.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_non_finite_move_to_is_ignored() {
        let mut creature = make_creature();
        for target in [Vec2::new(f32::NAN, 10.0), Vec2::new(0.0, f32::INFINITY)] {
            tick(
                &mut creature,
                &TickInput {
                    move_to: Some(target),
                    ..Default::default()
                },
                DT,
            );
        }
        assert_eq!(creature.center(), Vec2::new(200.0, 200.0));
        for p in creature.tentacles.segment_positions().into_iter().flatten() {
            assert!(p.is_finite());
        }
    }

    #[test]
    fn test_motion_independent_of_host_rate() {
        let mut slow = make_creature();
        let mut fast = make_creature();
        let input = TickInput::default();
        for _ in 0..30 {
            tick(&mut slow, &input, DT);
        }
        for _ in 0..60 {
            tick(&mut fast, &input, DT / 2.0);
        }

        for (a, b) in slow.tentacles.tentacles.iter().zip(&fast.tentacles.tentacles) {
            assert!((a.idle_phase - b.idle_phase).abs() < 1e-3);
            assert!(a.tip_position().distance(b.tip_position()) < 0.5);
        }
    }

    #[test]
    fn test_short_ticks_carry_partial_frames() {
        let mut creature = make_creature();
        let phase = creature.tentacles.tentacles[0].idle_phase;

        tick(&mut creature, &TickInput::default(), DT / 4.0);
        assert_eq!(creature.tentacles.tentacles[0].idle_phase, phase);

        for _ in 0..3 {
            tick(&mut creature, &TickInput::default(), DT / 4.0);
        }
        assert!(creature.tentacles.tentacles[0].idle_phase > phase);
    }

    #[test]
    fn test_long_tick_is_capped() {
        let mut creature = make_creature();
        let phase = creature.tentacles.tentacles[0].idle_phase;
        tick(&mut creature, &TickInput::default(), 10.0);
        let t = &creature.tentacles.tentacles[0];
        let frames = (t.idle_phase - phase) / (t.idle_speed * t.energy);
        assert!((frames - MAX_FRAMES_PER_TICK).abs() < 1e-2, "stepped {} frames", frames);
    }

    #[test]
    fn test_variable_dt_stays_bounded() {
        let mut creature = make_creature();
        let steps = [DT, 0.001, 0.25, DT * 2.0, 1.0];
        for i in 0..1000 {
            let input = TickInput {
                cursor: Some(Vec2::new(220.0, 260.0)),
                reaction: (i % 97 == 0).then_some(Reaction::Shake),
                ..Default::default()
            };
            tick(&mut creature, &input, steps[i % steps.len()]);
        }
        let snapshot = creature.snapshot();
        for tentacle in &snapshot.tentacles {
            for p in &tentacle.segments {
                assert!(p.is_finite());
                assert!(p.distance(creature.center()) < 500.0);
            }
            assert!(tentacle.tip_velocity.is_finite());
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut creature = make_creature();
        tick(&mut creature, &TickInput::default(), DT);
        let json = serde_json::to_string(&creature.snapshot()).unwrap();
        assert!(json.contains("\"label\":\"neutral\""));
        assert!(json.contains("\"tentacles\""));
    }
}
