//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource` handed to the engine.
//!
//! Seeded play uses `SimRng` streams derived from one master seed and a
//! stable stream slot, so that:
//!   - Adding a new stream never changes existing streams.
//!   - A game is fully reproducible from (seed, commands).
//!
//! Tests that need exact outcomes script the draws with `SequenceRng`.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A source of uniform draws in [0.0, 1.0).
pub trait RandomSource: Send {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Pick an index in [0, len) from a single uniform draw.
    /// `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// A named, deterministic PCG stream.
pub struct SimRng {
    pub name: &'static str,
    inner:    Pcg64Mcg,
}

impl SimRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name:  "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl RandomSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// All streams for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: RngStream) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// Stream for a game restored from a save at `turn`. Each resume point
    /// gets its own stream so that replays from a save stay reproducible.
    pub fn for_resume(&self, turn: u32) -> SimRng {
        let slot = RngStream::Resume as u64 + u64::from(turn);
        SimRng::new(self.master_seed, slot).with_name(RngStream::Resume.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    Session  = 0,
    Strategy = 1,
    // Resume streams occupy Resume + turn; keep this last.
    Resume   = 1_000,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Session  => "session",
            Self::Strategy => "strategy",
            Self::Resume   => "resume",
        }
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Values are clamped into [0.0, 1.0) so a script can never produce an
/// out-of-contract draw.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    draws:    Vec<f64>,
    position: usize,
}

impl SequenceRng {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, position: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            self.position += 1;
            return 0.0;
        }
        let value = self.draws[self.position % self.draws.len()];
        self.position += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
