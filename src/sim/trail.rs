//! Exhaust trail markers
//!
//! Craft drop short-lived markers behind them; the pool only moves and fades
//! them. Drawing is left to whoever reads `alive()`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Marker slots in the pool
pub const TRAIL_CAPACITY: usize = 100;
/// Seconds a marker lives
pub const TRAIL_LIFE: f32 = 1.0;

/// A single fading exhaust marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailMarker {
    pub pos: Vec2,
    pub angle: f32,
    pub vel: Vec2,
    pub color: Vec3,
    /// Remaining life in seconds; dead at or below zero
    pub life: f32,
}

impl TrailMarker {
    pub fn new(pos: Vec2, angle: f32, vel: Vec2, color: Vec3) -> Self {
        Self {
            pos,
            angle,
            vel,
            color,
            life: TRAIL_LIFE,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Opacity, fading linearly over the marker's life
    pub fn alpha(&self) -> f32 {
        (self.life / TRAIL_LIFE).clamp(0.0, 1.0)
    }
}

/// Receiver for markers spawned during a craft update
pub trait TrailSink {
    fn spawn(&mut self, marker: TrailMarker);
}

/// Discards every marker
impl TrailSink for () {
    fn spawn(&mut self, _marker: TrailMarker) {}
}

/// Collects markers, mostly for tests
impl TrailSink for Vec<TrailMarker> {
    fn spawn(&mut self, marker: TrailMarker) {
        self.push(marker);
    }
}

/// Fixed-size marker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailPool {
    slots: Vec<TrailMarker>,
}

impl Default for TrailPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailPool {
    pub fn new() -> Self {
        let dead = TrailMarker {
            life: 0.0,
            ..TrailMarker::new(Vec2::ZERO, 0.0, Vec2::ZERO, Vec3::ZERO)
        };
        Self {
            slots: vec![dead; TRAIL_CAPACITY],
        }
    }

    /// Move and fade every live marker
    pub fn update(&mut self, dt: f32) {
        for marker in self.slots.iter_mut().filter(|m| m.is_alive()) {
            marker.pos += marker.vel * dt;
            marker.life -= dt;
        }
    }

    /// Live markers in slot order
    pub fn alive(&self) -> impl Iterator<Item = &TrailMarker> {
        self.slots.iter().filter(|m| m.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Kill every marker
    pub fn clear(&mut self) {
        for marker in &mut self.slots {
            marker.life = 0.0;
        }
    }
}

impl TrailSink for TrailPool {
    /// Store in the first dead slot; dropped when the pool is full
    fn spawn(&mut self, marker: TrailMarker) {
        match self.slots.iter_mut().find(|m| !m.is_alive()) {
            Some(slot) => *slot = marker,
            None => log::trace!("Trail pool full, marker dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(x: f32) -> TrailMarker {
        TrailMarker::new(Vec2::new(x, 0.0), 0.0, Vec2::new(2.0, 0.0), Vec3::X)
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = TrailPool::new();
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_markers_move_and_fade() {
        let mut pool = TrailPool::new();
        pool.spawn(marker(1.0));
        pool.update(0.25);

        let m = pool.alive().next().expect("marker still alive");
        assert!((m.pos.x - 1.5).abs() < 1e-6);
        assert!((m.alpha() - 0.75).abs() < 1e-6);

        pool.update(0.8);
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_full_pool_drops_new_markers() {
        let mut pool = TrailPool::new();
        for i in 0..TRAIL_CAPACITY + 5 {
            pool.spawn(marker(i as f32));
        }
        assert_eq!(pool.alive_count(), TRAIL_CAPACITY);
        // The overflow never displaced the first marker
        assert_eq!(pool.alive().next().map(|m| m.pos.x), Some(0.0));
    }

    #[test]
    fn test_dead_slot_reused() {
        let mut pool = TrailPool::new();
        pool.spawn(marker(0.0));
        pool.update(TRAIL_LIFE + 0.1);
        pool.spawn(marker(7.0));
        assert_eq!(pool.alive_count(), 1);
        assert_eq!(pool.slots[0].pos.x, 7.0);
    }

    #[test]
    fn test_clear_and_sinks() {
        let mut pool = TrailPool::new();
        pool.spawn(marker(0.0));
        pool.clear();
        assert_eq!(pool.alive_count(), 0);

        let mut collected: Vec<TrailMarker> = Vec::new();
        collected.spawn(marker(1.0));
        assert_eq!(collected.len(), 1);
        ().spawn(marker(2.0));
    }
}
