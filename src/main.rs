//! Hover Racer headless driver
//!
//! Sets up a race from an optional JSON config, flies every craft with a
//! simple autopilot and prints the final snapshot as JSON.

#[cfg(not(target_arch = "wasm32"))]
use hover_racer::consts::FRAME_DT;
#[cfg(not(target_arch = "wasm32"))]
use hover_racer::sim::{Control, Race};
#[cfg(not(target_arch = "wasm32"))]
use hover_racer::RaceConfig;

/// Frames to run before giving up on the field finishing (two minutes)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 120 * 60;

/// Nose-down tilt the autopilot holds; thrust comes from leaning the beam back
#[cfg(not(target_arch = "wasm32"))]
const TARGET_TILT: f32 = -0.3;

/// Log progress every this many frames
#[cfg(not(target_arch = "wasm32"))]
const REPORT_EVERY: u64 = 600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hover Racer (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match RaceConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => RaceConfig::default(),
    };

    let mut race = match Race::new(&config) {
        Ok(race) => race,
        Err(e) => {
            log::error!("Race setup failed: {}", e);
            std::process::exit(1);
        }
    };

    while race.frame() < MAX_FRAMES && !race.is_finished() {
        autopilot(&mut race);
        race.step(FRAME_DT);

        if race.frame() % REPORT_EVERY == 0 {
            let leader = race
                .crafts()
                .iter()
                .map(|c| c.pos().x)
                .fold(f32::NEG_INFINITY, f32::max);
            log::info!(
                "t={:.1}s leader x={:.1}/{:.1} finished={}",
                race.elapsed(),
                leader,
                race.finish_x(),
                race.finish_order().len()
            );
        }
    }

    match serde_json::to_string_pretty(&race.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

/// Full boost, and dip the nose whenever it rises above the target tilt
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(race: &mut Race) {
    for i in 0..race.crafts().len() {
        let nose_high = race.crafts()[i].angle() > TARGET_TILT;
        race.set_control(i, Control::Boost, true);
        race.set_control(i, Control::RotateCw, nose_high);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host on the web; there is no CLI
}
