//! Planar rigid-body state
//!
//! The same type carries a pose, its first derivative (velocity and angular
//! velocity) and its second derivative, so the integrator can treat all three
//! as one vector space.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position and orientation (or their derivatives)
///
/// Orientation is not wrapped by arithmetic; callers wrap after committing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftState {
    pub pos: Vec2,
    pub angle: f32,
}

impl CraftState {
    pub const ZERO: Self = Self {
        pos: Vec2::ZERO,
        angle: 0.0,
    };

    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self { pos, angle }
    }
}

impl Add for CraftState {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.pos + rhs.pos, self.angle + rhs.angle)
    }
}

impl AddAssign for CraftState {
    fn add_assign(&mut self, rhs: Self) {
        self.pos += rhs.pos;
        self.angle += rhs.angle;
    }
}

impl Sub for CraftState {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.pos - rhs.pos, self.angle - rhs.angle)
    }
}

impl Neg for CraftState {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.pos, -self.angle)
    }
}

impl Mul<f32> for CraftState {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.pos * rhs, self.angle * rhs)
    }
}

impl Mul<CraftState> for f32 {
    type Output = CraftState;

    fn mul(self, rhs: CraftState) -> CraftState {
        rhs * self
    }
}
