//! Octo Motion headless demo
//!
//! Runs the creature at a fixed 30 Hz with a scripted input timeline and
//! prints a JSON snapshot once per simulated second.
//!
//! Usage: octo-motion [config.json] [seconds]

use glam::Vec2;

use octo_motion::SimConfig;
use octo_motion::sim::{Creature, Reaction, TickInput, tick};

const FRAME_DT: f32 = 1.0 / 30.0;
const DEFAULT_SECONDS: u32 = 90;

/// Scripted host input for a given frame
fn scripted_input(frame: u32, center: Vec2) -> TickInput {
    let second = frame / 30;
    let at_second_start = frame % 30 == 0;

    // Cursor circles the body for the first 20 seconds
    let t = frame as f32 * FRAME_DT;
    let cursor = (second < 20).then(|| center + Vec2::new(t.cos(), t.sin()) * 120.0);

    TickInput {
        cursor,
        click: at_second_start && second == 2,
        keystrokes: if (5..7).contains(&second) { 1 } else { 0 },
        focus: match second {
            10 => Some(false),
            15 => Some(true),
            _ => None,
        },
        learning_moment: (at_second_start && second == 20).then_some(5.0),
        legacy_mood: (at_second_start && second == 28).then(|| "goofy".to_string()),
        reaction: (at_second_start && second == 8).then_some(Reaction::Celebrate),
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path),
        None => SimConfig::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let center = Vec2::new(64.0, 64.0);
    let mut creature = Creature::new(center, config);
    log::info!("Octo Motion running for {} simulated seconds", seconds);

    for frame in 0..seconds * 30 {
        let input = scripted_input(frame, center);
        tick(&mut creature, &input, FRAME_DT);

        if (frame + 1) % 30 == 0 {
            match serde_json::to_string(&creature.snapshot()) {
                Ok(json) => println!("{}", json),
                Err(e) => log::warn!("Snapshot serialization failed: {}", e),
            }
        }
    }

    log::info!(
        "Finished at {:.1}s, mood: {}",
        creature.now(),
        creature.animation.get_mood_string()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless demo on wasm; hosts drive `tick` directly
}
