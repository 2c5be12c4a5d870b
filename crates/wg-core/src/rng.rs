//! Seed derivation and random streams
//!
//! Every random decision in the crate goes through a [`RegionRng`] obtained
//! from [`derive_stream`]. A stream is a pure function of the world seed and
//! a [`Discriminant`], so regenerating a region replays the exact same
//! sequence while neighboring regions get unrelated ones.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::position::Position;

const TAG_POSITION: u64 = 0x504f_5349; // "POSI"
const TAG_REGION: u64 = 0x5245_4749; // "REGI"

/// Root seed of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Derive a seed from a human-readable name (FNV-1a over the UTF-8 bytes).
    pub fn from_name(name: &str) -> Self {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in name.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        Self(hash)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for WorldSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}

/// What a stream is derived for, alongside the world seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant {
    /// A lattice position (used when choosing a region's type).
    Position(Position),
    /// A region-local seed (used for initializers and effects).
    Region(u64),
}

impl Discriminant {
    fn key(self, world_seed: WorldSeed) -> u64 {
        let (tag, a, b) = match self {
            Discriminant::Position(p) => (TAG_POSITION, p.x as u32 as u64, p.y as u32 as u64),
            Discriminant::Region(seed) => (TAG_REGION, seed, 0),
        };
        let mut h = splitmix64(world_seed.value() ^ tag);
        h = splitmix64(h ^ a);
        splitmix64(h ^ b.rotate_left(32))
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derive an independent, reproducible stream for `(world_seed, discriminant)`.
pub fn derive_stream(world_seed: WorldSeed, discriminant: Discriminant) -> RegionRng {
    RegionRng::new(discriminant.key(world_seed))
}

/// Seeded random stream handed to initializers and effects.
///
/// Wraps ChaCha8Rng and remembers the seed it was built from.
#[derive(Debug, Clone)]
pub struct RegionRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl RegionRng {
    /// Create a stream directly from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Uniform integer in `0..n`. Returns 0 if `n` is 0.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Bernoulli trial: true with probability `p`.
    ///
    /// Always consumes exactly one value, whatever `p` is.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A value with a selection weight. A bare value converts with weight 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WeightedRepr<T>")]
pub struct Weighted<T> {
    pub value: T,
    pub weight: u32,
}

impl<T> Weighted<T> {
    pub fn new(value: T, weight: u32) -> Self {
        Self { value, weight }
    }
}

impl<T> From<T> for Weighted<T> {
    fn from(value: T) -> Self {
        Self { value, weight: 1 }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeightedRepr<T> {
    Bare(T),
    Full {
        value: T,
        #[serde(default = "default_weight")]
        weight: u32,
    },
}

fn default_weight() -> u32 {
    1
}

impl<T> From<WeightedRepr<T>> for Weighted<T> {
    fn from(repr: WeightedRepr<T>) -> Self {
        match repr {
            WeightedRepr::Bare(value) => Weighted { value, weight: 1 },
            WeightedRepr::Full { value, weight } => Weighted { value, weight },
        }
    }
}

/// Cumulative-weight table built once and sampled many times.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    cumulative: Vec<u64>,
}

impl<T> WeightedTable<T> {
    pub fn new(entries: impl IntoIterator<Item = Weighted<T>>) -> Self {
        let mut values = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0u64;
        for Weighted { value, weight } in entries {
            total += u64::from(weight);
            values.push(value);
            cumulative.push(total);
        }
        Self { values, cumulative }
    }

    /// Table where every value has weight 1.
    pub fn uniform(values: impl IntoIterator<Item = T>) -> Self {
        Self::new(values.into_iter().map(Weighted::from))
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Draw one value. Returns `None` when every weight is zero.
    pub fn sample(&self, rng: &mut RegionRng) -> Option<&T> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let pick = rng.below(total as usize) as u64;
        // First bucket whose running total exceeds the pick; zero-weight
        // buckets share their predecessor's total and are skipped.
        let index = self.cumulative.partition_point(|&c| c <= pick);
        self.values.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_discriminant_same_sequence() {
        let seed = WorldSeed::new(42);
        let mut a = derive_stream(seed, Discriminant::Position(Position::new(3, -4)));
        let mut b = derive_stream(seed, Discriminant::Position(Position::new(3, -4)));
        for _ in 0..100 {
            assert_eq!(a.below(1000), b.below(1000));
        }
    }

    #[test]
    fn test_distinct_positions_diverge() {
        let seed = WorldSeed::new(42);
        let mut a = derive_stream(seed, Discriminant::Position(Position::new(0, 1)));
        let mut b = derive_stream(seed, Discriminant::Position(Position::new(1, 0)));
        let xs: Vec<usize> = (0..32).map(|_| a.below(1 << 20)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.below(1 << 20)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_position_and_region_streams_differ() {
        let seed = WorldSeed::new(7);
        let mut a = derive_stream(seed, Discriminant::Position(Position::new(0, 0)));
        let mut b = derive_stream(seed, Discriminant::Region(0));
        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.below(1 << 30), b.below(1 << 30));
    }

    #[test]
    fn test_named_seed_is_stable() {
        assert_eq!(WorldSeed::from_name("abc"), WorldSeed::from_name("abc"));
        assert_ne!(WorldSeed::from_name("abc"), WorldSeed::from_name("abd"));
        assert_eq!(WorldSeed::from_name("").value(), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_next_f64_range() {
        let mut rng = RegionRng::new(1);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_below_zero() {
        let mut rng = RegionRng::new(1);
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let table = WeightedTable::new([
            Weighted::new(1u32, 0),
            Weighted::new(2, 3),
            Weighted::new(3, 0),
            Weighted::new(4, 1),
        ]);
        let mut rng = RegionRng::new(99);
        for _ in 0..2000 {
            let v = *table.sample(&mut rng).unwrap();
            assert!(v == 2 || v == 4, "zero-weight entry {v} selected");
        }
    }

    #[test]
    fn test_all_zero_weights() {
        let table = WeightedTable::new([Weighted::new('a', 0)]);
        let mut rng = RegionRng::new(0);
        assert!(table.is_empty());
        assert_eq!(table.sample(&mut rng), None);
    }

    #[test]
    fn test_bare_values_weight_one() {
        let table = WeightedTable::uniform([1u32, 2, 3]);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_weighted_deserializes_bare_and_full() {
        let entries: Vec<Weighted<u32>> =
            serde_json::from_str(r#"[5, {"value": 6, "weight": 3}, {"value": 7}]"#).unwrap();
        assert_eq!(
            entries,
            vec![Weighted::new(5, 1), Weighted::new(6, 3), Weighted::new(7, 1)]
        );
    }
}
