//! Race context and world step
//!
//! The race owns the level, every craft and the exhaust pool. `step` runs the
//! three frame phases in a fixed order so a race is reproducible from its
//! seed and inputs.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::craft::{BeamBlocker, Control, Craft, Surroundings};
use super::trail::TrailPool;
use crate::error::SetupError;
use crate::settings::RaceConfig;
use crate::terrain::Level;

/// Craft colours in grid order
pub const PALETTE: [Vec3; 8] = [
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.65, 0.0, 1.0),
    Vec3::new(0.20, 0.64, 0.69),
    Vec3::new(0.89, 0.63, 0.18),
    Vec3::new(0.59, 0.56, 0.88),
];

/// One craft's entry in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftSnapshot {
    pub pos: Vec2,
    pub angle: f32,
    pub vel: Vec2,
    pub omega: f32,
    pub boost_fuel: f32,
    pub hover_force: f32,
    pub finish_time: Option<f32>,
}

/// Serializable summary of a race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub seed: u32,
    pub elapsed: f32,
    pub finish_x: f32,
    pub crafts: Vec<CraftSnapshot>,
    /// Craft indices in finishing order
    pub finish_order: Vec<usize>,
}

/// A race in progress
#[derive(Debug, Clone)]
pub struct Race {
    level: Level,
    crafts: Vec<Craft>,
    finish_times: Vec<Option<f32>>,
    trails: TrailPool,
    elapsed: f32,
    frame: u64,
}

impl Race {
    /// Generate the level and line the craft up on the starting grid
    ///
    /// A config without a seed gets a random one.
    pub fn new(config: &RaceConfig) -> Result<Self, SetupError> {
        let count = config.effective_craft_count();
        if count == 0 {
            return Err(SetupError::NoCraft);
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let level = Level::generate(seed, &config.terrain)?;

        let crafts = (0..count)
            .map(|k| {
                let pos = config.grid.slot(k, |x| level.height_at(x));
                if pos.x < 0.0 || pos.x > level.width() {
                    log::warn!("Grid slot {} at x={:.2} is off the track", k, pos.x);
                }
                let mut craft = Craft::new();
                craft.reset(pos);
                craft.set_color(PALETTE[k % PALETTE.len()]);
                craft
            })
            .collect();

        log::info!("Race set up: seed={} craft={}", seed, count);

        Ok(Self {
            level,
            crafts,
            finish_times: vec![None; count],
            trails: TrailPool::new(),
            elapsed: 0.0,
            frame: 0,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn crafts(&self) -> &[Craft] {
        &self.crafts
    }

    pub fn craft(&self, index: usize) -> Option<&Craft> {
        self.crafts.get(index)
    }

    pub fn trails(&self) -> &TrailPool {
        &self.trails
    }

    /// Race clock in seconds
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// x coordinate a craft must reach to finish
    pub fn finish_x(&self) -> f32 {
        self.level.track().finish_x()
    }

    pub fn finish_time(&self, index: usize) -> Option<f32> {
        self.finish_times.get(index).copied().flatten()
    }

    /// Craft indices ordered by finish time; unfinished craft are left out
    pub fn finish_order(&self) -> Vec<usize> {
        let mut finished: Vec<(usize, f32)> = self
            .finish_times
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|t| (i, t)))
            .collect();
        finished.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        finished.into_iter().map(|(i, _)| i).collect()
    }

    /// True once every craft has crossed the finish line
    pub fn is_finished(&self) -> bool {
        self.finish_times.iter().all(Option::is_some)
    }

    /// Press or release a control; finished craft ignore input
    pub fn set_control(&mut self, index: usize, control: Control, value: bool) {
        let finished = self.finish_time(index).is_some();
        if let Some(craft) = self.crafts.get_mut(index) {
            craft.set_control(control, value && !finished);
        }
    }

    /// Advance the world by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.elapsed += dt;
        self.frame += 1;
        let finish_x = self.finish_x();

        // Poses stay committed through the update phase, so one snapshot serves every craft
        let blockers: Vec<BeamBlocker> = self
            .crafts
            .iter()
            .enumerate()
            .map(|(i, craft)| craft.blocker(i))
            .collect();

        for i in 0..self.crafts.len() {
            let surroundings = Surroundings::new(self.level.track()).with_blockers(&blockers, i);
            let update = self.crafts[i].update(dt, &surroundings, &mut self.trails);

            for reaction in update.reactions {
                if let Some(target) = self.crafts.get_mut(reaction.target) {
                    target.add_force(reaction.force);
                }
            }

            if self.finish_times[i].is_none() && self.crafts[i].pos().x >= finish_x {
                self.finish_times[i] = Some(self.elapsed);
                self.crafts[i].clear_controls();
                log::info!("Craft {} finished in {:.2}s", i, self.elapsed);
            }
        }

        self.trails.update(dt);
        self.collide_pairs();

        let track = self.level.track();
        for craft in &mut self.crafts {
            craft.level_collide(track);
            craft.commit();
        }
    }

    /// Resolve craft contacts pair by pair in ascending index order
    ///
    /// The lower index tests first; the reverse test only runs when it finds
    /// no contact.
    fn collide_pairs(&mut self) {
        let count = self.crafts.len();
        for i in 0..count {
            for j in i + 1..count {
                let (head, tail) = self.crafts.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if !a.collide(b) {
                    b.collide(a);
                }
            }
        }
    }

    /// Serializable view of the race
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            seed: self.level.seed(),
            elapsed: self.elapsed,
            finish_x: self.finish_x(),
            crafts: self
                .crafts
                .iter()
                .zip(&self.finish_times)
                .map(|(craft, &finish_time)| CraftSnapshot {
                    pos: craft.pos(),
                    angle: craft.angle(),
                    vel: craft.vel(),
                    omega: craft.omega(),
                    boost_fuel: craft.boost_fuel(),
                    hover_force: craft.hover_force(),
                    finish_time,
                })
                .collect(),
            finish_order: self.finish_order(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TerrainConfig;

    fn small_config(craft_count: usize) -> RaceConfig {
        RaceConfig {
            seed: Some(2024),
            craft_count,
            terrain: TerrainConfig {
                width: 64,
                height: 16,
                descent_row: 14,
                track_row: 8,
                track_vertices: 64,
            },
            ..RaceConfig::default()
        }
    }

    #[test]
    fn test_grid_placement() {
        let race = Race::new(&small_config(3)).unwrap();
        assert_eq!(race.crafts().len(), 3);

        for (k, craft) in race.crafts().iter().enumerate() {
            let x = 15.0 - k as f32 * 0.75;
            let lift = 0.75 + if k % 2 == 1 { 0.5 } else { 0.0 };
            assert!((craft.pos().x - x).abs() < 1e-6);
            assert!((craft.pos().y - (race.level().height_at(x) + lift)).abs() < 1e-5);
            assert_eq!(craft.vel(), Vec2::ZERO);
            assert_eq!(craft.angle(), 0.0);
            assert_eq!(craft.color(), PALETTE[k]);
        }
    }

    #[test]
    fn test_zero_craft_rejected() {
        assert_eq!(Race::new(&small_config(0)).unwrap_err(), SetupError::NoCraft);
    }

    #[test]
    fn test_craft_count_clamped_to_grid() {
        let race = Race::new(&small_config(12)).unwrap();
        assert_eq!(race.crafts().len(), crate::consts::MAX_CRAFT);
    }

    #[test]
    fn test_step_advances_clock() {
        let mut race = Race::new(&small_config(2)).unwrap();
        for _ in 0..10 {
            race.step(0.1);
        }
        assert!((race.elapsed() - 1.0).abs() < 1e-5);
        assert_eq!(race.frame(), 10);
        assert!(race.crafts().iter().all(|c| c.delta() == Default::default()));
    }

    #[test]
    fn test_finish_recorded_once() {
        let mut race = Race::new(&small_config(2)).unwrap();
        let finish_x = race.finish_x();
        assert_eq!(finish_x, 63.0 * 0.5);

        race.crafts[1].set_pos(Vec2::new(finish_x + 1.0, 20.0));
        race.set_control(1, Control::Boost, true);
        race.step(0.1);

        assert_eq!(race.finish_time(0), None);
        let t = race.finish_time(1).expect("craft 1 is past the line");
        assert!((t - 0.1).abs() < 1e-6);
        assert!(!race.crafts()[1].controls().boost);
        assert_eq!(race.finish_order(), vec![1]);
        assert!(!race.is_finished());

        race.step(0.1);
        assert_eq!(race.finish_time(1), Some(t));

        // Finished craft ignore input
        race.set_control(1, Control::Boost, true);
        assert!(!race.crafts()[1].controls().boost);
    }

    #[test]
    fn test_finish_order_by_time() {
        let mut race = Race::new(&small_config(3)).unwrap();
        race.finish_times = vec![Some(3.0), None, Some(1.5)];
        assert_eq!(race.finish_order(), vec![2, 0]);
        race.finish_times[1] = Some(2.0);
        assert_eq!(race.finish_order(), vec![2, 1, 0]);
        assert!(race.is_finished());
    }

    /// Three craft in a row: the outer two fly at the resting middle one
    fn pile_up(left: usize, middle: usize, right: usize) -> Race {
        let mut race = Race::new(&small_config(3)).unwrap();
        let y = 5.0;
        race.crafts[left].set_pos(Vec2::new(-0.4, y));
        race.crafts[left].set_vel(Vec2::new(1.0, 0.0));
        race.crafts[middle].set_pos(Vec2::new(0.0, y));
        race.crafts[right].set_pos(Vec2::new(0.4, y));
        race.crafts[right].set_vel(Vec2::new(-1.0, 0.0));
        race.collide_pairs();
        race
    }

    #[test]
    fn test_lower_index_pair_resolves_first() {
        // Left craft first: a clean head-on hit it never hears about again
        let race = pile_up(0, 1, 2);
        let left = &race.crafts()[0];
        assert!((left.vel() - Vec2::new(0.25, 0.0)).length() < 1e-5);
        assert!((left.pos() - Vec2::new(-0.43, 5.0)).length() < 1e-5);
        assert!((left.angle() + 0.05).abs() < 1e-6);
        assert!(left.omega().abs() < 1e-4);

        // The right craft meets a middle craft that is already moving and tilted
        let right = &race.crafts()[2];
        assert!((right.vel() - Vec2::new(-0.25, 0.0)).length() > 0.05);
    }

    #[test]
    fn test_pair_order_follows_index_not_position() {
        // Same layout, right craft first: now it gets the clean hit
        let race = pile_up(2, 1, 0);
        let right = &race.crafts()[0];
        assert!((right.vel() - Vec2::new(-0.25, 0.0)).length() < 1e-5);
        assert!((right.pos() - Vec2::new(0.43, 5.0)).length() < 1e-5);
        assert!((right.angle() + 0.05).abs() < 1e-6);

        let left = &race.crafts()[2];
        assert!((left.vel() - Vec2::new(0.25, 0.0)).length() > 0.05);
    }

    #[test]
    fn test_reverse_test_skipped_after_hit() {
        let mut race = Race::new(&small_config(2)).unwrap();
        race.crafts[0].set_pos(Vec2::new(0.0, 5.0));
        race.crafts[0].set_vel(Vec2::new(1.0, 0.0));
        race.crafts[1].set_pos(Vec2::new(0.4, 5.0));
        race.crafts[1].set_vel(Vec2::new(-1.0, 0.0));
        race.collide_pairs();

        // A second pass from craft 1 would nudge and spin both craft again
        let (a, b) = (&race.crafts()[0], &race.crafts()[1]);
        assert!((a.pos() - Vec2::new(-0.03, 5.0)).length() < 1e-5);
        assert!((b.pos() - Vec2::new(0.43, 5.0)).length() < 1e-5);
        assert!((a.angle() + 0.05).abs() < 1e-6);
        assert!((b.angle() + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_race() {
        let run = || {
            let mut race = Race::new(&small_config(4)).unwrap();
            for i in 0..4 {
                race.set_control(i, Control::Boost, true);
            }
            for _ in 0..120 {
                race.step(1.0 / 60.0);
            }
            race.crafts()
                .iter()
                .map(|c| (c.pos().x.to_bits(), c.pos().y.to_bits(), c.angle().to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut race = Race::new(&small_config(2)).unwrap();
        race.step(1.0 / 60.0);
        let snapshot = race.snapshot();
        assert_eq!(snapshot.seed, 2024);
        assert_eq!(snapshot.crafts.len(), 2);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RaceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.crafts.len(), 2);
        assert_eq!(back.crafts[0].pos, snapshot.crafts[0].pos);
    }
}
