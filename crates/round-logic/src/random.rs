//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG so every randomized strategy branch is reproducible.
//! Uses xorshift64*.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Source of uniform draws in `[0, 1)`.
///
/// Every randomized decision in the engine goes through this trait, so tests
/// can substitute a scripted source and hit an exact branch.
pub trait RandomSource {
    /// Next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

/// Seeded random number generator
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and stream index
    pub fn new(seed: &[u8; 32], stream: u32) -> Self {
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        state ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);

        // xorshift never leaves the all-zero state
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }

        rng
    }

    /// Seed from a single integer, spread across all four seed words.
    pub fn from_u64(seed: u64) -> Self {
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.chunks_mut(8).enumerate() {
            let word = seed.rotate_left(i as u32 * 16) ^ (i as u64);
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Self::new(&bytes, 0)
    }

    /// Independent stream derived from the current state without advancing it
    pub fn fork(&self, stream: u32) -> Self {
        let mut new_state = self.state;
        new_state ^= (stream as u64 + 1).wrapping_mul(0x9e3779b97f4a7c15);
        if new_state == 0 {
            new_state = 0x2545f4914f6cdd1d;
        }

        let mut rng = Self { state: new_state };
        rng.next_u64();
        rng
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    /// Generate next u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }
}

impl RandomSource for SeededRng {
    fn next_unit(&mut self) -> f64 {
        // 53 high bits -> exact f64 mantissa
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of draws, then repeats the last one.
///
/// Lets tests and replays force a specific branch of a randomized decision.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedDraws {
    draws: VecDeque<f64>,
    last: f64,
}

impl ScriptedDraws {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            last: draws.last().copied().unwrap_or(0.0),
        }
    }

    pub fn always(draw: f64) -> Self {
        Self::new(&[draw])
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> f64 {
        if let Some(d) = self.draws.pop_front() {
            self.last = d;
        }
        self.last
    }
}
