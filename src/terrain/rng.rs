//! Park-Miller "minimal standard" generator
//!
//! Terrain must be bit-identical for a given seed, so the generator is a
//! fixed multiplicative LCG rather than whatever `rand` currently ships as
//! its default.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Modulus 2^31 - 1
const MODULUS: u32 = 2_147_483_647;
/// Multiplier (MINSTD revision)
const MULTIPLIER: u64 = 48_271;

/// Multiplicative LCG with modulus 2^31 - 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinStd {
    state: u32,
}

impl MinStd {
    /// Create a generator; the seed is reduced into [1, 2^31 - 2]
    pub fn new(seed: u32) -> Self {
        let state = seed % MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Advance and return the new state, in [1, 2^31 - 2]
    #[inline]
    pub fn next_state(&mut self) -> u32 {
        self.state = ((self.state as u64 * MULTIPLIER) % MODULUS as u64) as u32;
        self.state
    }

    /// Advance and return a float in (0, 1]
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.next_state() as f32 / MODULUS as f32
    }
}

impl RngCore for MinStd {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for MinStd {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
