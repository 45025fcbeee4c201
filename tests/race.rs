//! End-to-end race scenarios through the public API

use glam::Vec2;
use hover_racer::consts::{FRAME_DT, VERTEX_DIST};
use hover_racer::sim::{Control, Craft, Race, Surroundings};
use hover_racer::terrain::{Level, TrackProfile};
use hover_racer::{RaceConfig, TerrainConfig};

fn run_race(seed: u32, frames: usize) -> Race {
    let config = RaceConfig::default().with_seed(seed).with_craft_count(4);
    let mut race = Race::new(&config).expect("stock config is valid");
    for i in 0..4 {
        race.set_control(i, Control::Boost, true);
    }
    for _ in 0..frames {
        race.step(FRAME_DT);
    }
    race
}

#[test]
fn test_stock_race_replays_exactly() {
    let a = serde_json::to_string(&run_race(31337, 240).snapshot()).unwrap();
    let b = serde_json::to_string(&run_race(31337, 240).snapshot()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_seeds_give_different_tracks() {
    let config = TerrainConfig::default();
    let a = Level::generate(1, &config).unwrap();
    let b = Level::generate(2, &config).unwrap();
    assert_ne!(a.track().points(), b.track().points());
}

#[test]
fn test_boosting_field_stays_finite() {
    let race = run_race(99, 600);
    for craft in race.crafts() {
        assert!(craft.pos().is_finite());
        assert!(craft.vel().is_finite());
        assert!(craft.angle().abs() <= std::f32::consts::PI);
    }
    assert!(race.trails().alive_count() <= hover_racer::sim::TRAIL_CAPACITY);
}

#[test]
fn test_generated_track_height_queries() {
    let level = Level::generate(4242, &TerrainConfig::default()).unwrap();
    let track = level.track();

    assert_eq!(level.height_at(-3.0), 0.0);
    assert_eq!(level.height_at(level.width() + 3.0), 0.0);

    for (i, p) in track.points().iter().enumerate() {
        assert_eq!(level.height_at(i as f32 * VERTEX_DIST), p.y, "vertex {i}");
    }

    // Halfway between two vertices sits on the segment joining them
    let (a, b) = (track.points()[100], track.points()[101]);
    let mid = level.height_at(0.5 * (a.x + b.x));
    assert!((mid - 0.5 * (a.y + b.y)).abs() < 1e-4);
}

#[test]
fn test_tilted_craft_flies_forward() {
    let track = TrackProfile::from_heights(std::iter::repeat_n(0.0, 200));
    let surroundings = Surroundings::new(&track);
    let mut craft = Craft::new();
    craft.reset(Vec2::new(10.1, 1.1));

    for _ in 0..600 {
        craft.set_control(Control::RotateCw, craft.angle() > -0.3);
        craft.update(FRAME_DT, &surroundings, &mut ());
        craft.level_collide(&track);
        craft.commit();
    }

    // Leaning the beam back pushes the craft along +x
    assert!(craft.pos().x > 15.0, "only reached x={}", craft.pos().x);
    assert!(craft.pos().y > 0.3);
    assert!(craft.angle().abs() < std::f32::consts::FRAC_PI_2);
}

#[test]
fn test_invalid_config_is_reported() {
    let mut config = RaceConfig::default().with_seed(1);
    config.terrain.width = 500;
    assert!(Race::new(&config).is_err());

    let json = r#"{"seed": 5, "craft_count": 2}"#;
    let config = RaceConfig::from_json(json).unwrap();
    let race = Race::new(&config).unwrap();
    assert_eq!(race.crafts().len(), 2);
    assert_eq!(race.level().seed(), 5);
}
