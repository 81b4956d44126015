//! Match-owned random number generator
//!
//! The only randomness in the simulation is the starting angle of ring bursts.
//! The generator lives inside the game state and is advanced explicitly, so two
//! matches with the same seed and inputs draw the same values in the same order.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Exponent bits of 1.0f32; OR-ing 23 random mantissa bits gives [1, 2)
const ONE_EXPONENT_BITS: u32 = 0x3f80_0000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRng {
    seed: u64,
    inner: Pcg32,
}

impl MatchRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed the generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in [0, 1)
    pub fn next_unit(&mut self) -> f32 {
        let mantissa = self.inner.next_u32() >> 9;
        f32::from_bits(mantissa | ONE_EXPONENT_BITS) - 1.0
    }

    /// Uniform angle in [0, 2π)
    pub fn next_angle(&mut self) -> f32 {
        self.next_unit() * std::f32::consts::TAU
    }
}
