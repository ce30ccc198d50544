//! Stream Generator - seeded random workloads
//!
//! Generates:
//! - Strictly ordered sequences with configurable spacing
//! - Frames of many keys, aligned or not
//! - Two-level cubes
//! - Shuffled batches for staging

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use seqframe_core::{Cube, Frame, Sequence, TimedValue, Timestamp};

/// Spacing model for generated item times
#[derive(Clone, Debug)]
pub struct GapModel {
    /// Smallest gap between consecutive items (microseconds, at least 1)
    pub min_gap_us: i64,
    /// Largest gap between consecutive items (microseconds)
    pub max_gap_us: i64,
    /// Times are rounded up to a multiple of this, so keys collide
    pub grid_us: i64,
}

impl GapModel {
    pub fn new(min_gap_us: i64, max_gap_us: i64, grid_us: i64) -> Self {
        let min_gap_us = min_gap_us.max(1);
        GapModel {
            min_gap_us,
            max_gap_us: max_gap_us.max(min_gap_us),
            grid_us: grid_us.max(1),
        }
    }

    /// Every key ticks on the same 1ms clock
    pub fn regular() -> Self {
        Self::new(1_000, 1_000, 1_000)
    }

    /// Roughly 1ms apart, often colliding across keys
    pub fn jittered() -> Self {
        Self::new(500, 1_500, 250)
    }

    /// Dense bursts with occasional long pauses
    pub fn bursty() -> Self {
        Self::new(1, 5_000, 1)
    }

    /// Far apart and rarely aligned
    pub fn sparse() -> Self {
        Self::new(10_000, 50_000, 1)
    }

    fn next_gap(&self, rng: &mut StdRng) -> i64 {
        let gap = rng.gen_range(self.min_gap_us..=self.max_gap_us);
        // Round up so the gap never collapses to zero
        ((gap + self.grid_us - 1) / self.grid_us) * self.grid_us
    }
}

impl Default for GapModel {
    fn default() -> Self {
        Self::jittered()
    }
}

/// Seeded generator of sequences, frames and cubes.
///
/// Values are a random walk, so filters see realistic drift. The same seed
/// always yields the same workload.
pub struct StreamGenerator {
    model: GapModel,
    start: Timestamp,
    rng: StdRng,
    seed_counter: u64,
}

impl StreamGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_model(seed, GapModel::default())
    }

    pub fn with_model(seed: u64, model: GapModel) -> Self {
        StreamGenerator {
            model,
            start: Timestamp::EPOCH,
            rng: StdRng::seed_from_u64(seed),
            seed_counter: seed,
        }
    }

    /// First generated time
    pub fn starting_at(mut self, start: Timestamp) -> Self {
        self.start = start;
        self
    }

    pub fn model(&self) -> &GapModel {
        &self.model
    }

    /// `len` strictly increasing items
    pub fn items(&mut self, len: usize) -> Vec<TimedValue<Timestamp, f64>> {
        let mut rng = self.fork();
        let mut t = self.start.as_micros();
        let mut value = 0.0;
        let mut out = Vec::with_capacity(len);

        for _ in 0..len {
            t += self.model.next_gap(&mut rng);
            value += rng.gen_range(-1.0..1.0);
            out.push(TimedValue::new(Timestamp::from_micros(t), value));
        }
        out
    }

    pub fn sequence(&mut self, len: usize) -> Sequence<Timestamp, f64> {
        let mut seq = Sequence::new();
        for item in self.items(len) {
            // Generated times are strictly increasing
            if seq.push(item).is_err() {
                break;
            }
        }
        seq
    }

    /// `keys` sequences named `k0`, `k1`, ... of up to `len` items each
    pub fn frame(&mut self, keys: usize, len: usize) -> Frame<String, Timestamp, f64> {
        let mut frame = Frame::new();
        for k in 0..keys {
            let len = self.rng.gen_range(0..=len);
            for item in self.items(len) {
                let (time, value) = item.into_parts();
                if frame.add(format!("k{}", k), time, value).is_err() {
                    break;
                }
            }
        }
        frame
    }

    /// `outer` x `inner` grid of sequences
    pub fn cube(
        &mut self,
        outer: usize,
        inner: usize,
        len: usize,
    ) -> Cube<String, String, Timestamp, f64> {
        let mut cube = Cube::new();
        for o in 0..outer {
            for i in 0..inner {
                let seq = self.sequence(len);
                if cube.add_seq(format!("o{}", o), format!("i{}", i), seq).is_err() {
                    break;
                }
            }
        }
        cube
    }

    /// `len` items with unique times, in random order
    pub fn shuffled(&mut self, len: usize) -> Vec<TimedValue<Timestamp, f64>> {
        let mut items = self.items(len);
        items.shuffle(&mut self.rng);
        items
    }

    /// Independent stream per call, reproducible from the root seed
    fn fork(&mut self) -> StdRng {
        self.seed_counter = self.seed_counter.wrapping_add(1);
        StdRng::seed_from_u64(self.seed_counter ^ self.rng.gen::<u64>())
    }
}
