// Deterministic, portable pseudo-random number generator for string lights.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// plus the `RandomSource` trait that the mesh generator samples bulb
// placement, color and size from. The generator never talks to `LightRng`
// directly: it takes any `RandomSource`, so tests can script exact sequences
// and hosts can plug in their own engine RNG.
//
// **Critical constraint: determinism.** Every method on `LightRng` must
// produce identical output given the same prior state, regardless of
// platform, compiler version, or optimization level. The core generator uses
// integer arithmetic only; floats are derived from its upper bits.

use serde::{Deserialize, Serialize};

/// A source of uniform random numbers for procedural generation.
///
/// Only `next_f32` and `range_u32` are required. `range_f32` follows the
/// host-engine convention of accepting any pair of bounds: `low == high`
/// returns `low`, and `low > high` samples the reversed interval instead of
/// panicking.
pub trait RandomSource {
    /// Uniform `f32` in [0, 1).
    fn next_f32(&mut self) -> f32;

    /// Uniform integer in `[low, high)`. Returns `low` when the range is empty.
    fn range_u32(&mut self, low: u32, high: u32) -> u32;

    /// Uniform `f32` between `low` and `high`.
    fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + self.next_f32() * (high - low)
    }
}

/// Xoshiro256++ PRNG, the default `RandomSource`.
///
/// Two `LightRng` instances created from the same seed produce identical
/// streams, so a seeded generation run always yields the same mesh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightRng {
    s: [u64; 4],
}

impl LightRng {
    /// Seeded generator. The four state words are successive SplitMix64
    /// outputs starting from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut state = seed;
        Self {
            s: std::array::from_fn(|_| splitmix64(&mut state)),
        }
    }

    /// Raw 64-bit output; every other draw is derived from this.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)` using rejection sampling to avoid
    /// modulo bias. Returns `low` when `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // Draws below (2^64 - range) % range would bias the low buckets.
        let reject_below = range.wrapping_neg() % range;
        loop {
            let draw = self.next_u64();
            if draw >= reject_below {
                return low + draw % range;
            }
        }
    }
}

impl RandomSource for LightRng {
    /// Top 24 bits scaled into [0, 1): exactly representable in an f32.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        self.range_u64(low as u64, high as u64) as u32
    }
}

/// One SplitMix64 step, advancing `state`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
