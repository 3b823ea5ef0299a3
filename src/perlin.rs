//! Seeded lattice-gradient noise and its fractal composite.
//!
//! `NoiseGenerator` is classic improved Perlin noise over a 512-entry
//! permutation table shuffled from the seed. It implements
//! [`noise::NoiseFn`] so it can be mixed with the `noise` crate's sources,
//! and the fractal sum ([`fbm`]) works over any such source.

use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{IslandError, Result};

/// Frequency multiplier between consecutive fbm octaves.
pub const LACUNARITY: f64 = 2.0;

/// Seed used when none is given (matches the generator's start-up state).
pub const DEFAULT_SEED: u64 = 1;

// =============================================================================
// PERMUTATION TABLE
// =============================================================================

/// 512 lattice hash entries: a seeded permutation of 0..=255 followed by a
/// copy of itself, so `table[i + 1]` never needs a modulo for i < 511.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationTable {
    values: [u8; 512],
}

impl PermutationTable {
    /// Fisher-Yates shuffle of 0..=255 driven by a ChaCha8 stream seeded from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut source = [0u8; 256];
        for (i, v) in source.iter_mut().enumerate() {
            *v = i as u8;
        }
        for i in (1..256).rev() {
            let j = rng.gen_range(0..=i);
            source.swap(i, j);
        }

        let mut values = [0u8; 512];
        values[..256].copy_from_slice(&source);
        values[256..].copy_from_slice(&source);

        Self { values }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    #[inline]
    fn at(&self, i: usize) -> usize {
        self.values[i] as usize
    }
}

// =============================================================================
// SHARED INTERPOLATION HELPERS
// =============================================================================

/// Quintic fade curve 6t^5 - 15t^4 + 10t^3 (zero 1st and 2nd derivative at 0 and 1).
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the offset (x, y) with one of 8 gradient directions
/// picked from the low 4 bits of `hash`.
#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        0.0
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Split a coordinate into its wrapped lattice index and fractional offset.
#[inline]
fn lattice(v: f64) -> (usize, f64) {
    let floor = v.floor();
    ((floor as i64 & 255) as usize, v - floor)
}

/// Bilinear blend of four corner gradients with fade weights.
#[inline]
fn blend_corners(h00: usize, h10: usize, h01: usize, h11: usize, x: f64, y: f64) -> f64 {
    let u = fade(x);
    let v = fade(y);
    let result = lerp(
        lerp(grad(h00, x, y), grad(h10, x - 1.0, y), u),
        lerp(grad(h01, x, y - 1.0), grad(h11, x - 1.0, y - 1.0), u),
        v,
    );
    // Gradients have length <= sqrt(2), which bounds the blend to [-1, 1];
    // the clamp only absorbs rounding.
    result.clamp(-1.0, 1.0)
}

// =============================================================================
// NOISE GENERATOR
// =============================================================================

/// Deterministic seeded 2D gradient noise.
///
/// The permutation table is built once and never patched; reseeding swaps in
/// a whole new value, so a shared borrow held by a generation pass always
/// sees a complete table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseGenerator {
    seed: u64,
    permutation: PermutationTable,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            permutation: PermutationTable::from_seed(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn permutation(&self) -> &PermutationTable {
        &self.permutation
    }

    /// Replace this generator with one built from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// A fresh generator for `seed`, leaving `self` untouched.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self::new(seed)
    }

    /// Improved Perlin noise at (x, y), in [-1, 1]. Exactly 0 on integer lattice points.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let (xi, x) = lattice(x);
        let (yi, y) = lattice(y);

        let p = &self.permutation;
        let a = p.at(xi) + yi;
        let b = p.at(xi + 1) + yi;

        blend_corners(p.at(a), p.at(b), p.at(a + 1), p.at(b + 1), x, y)
    }

    /// Fractal Brownian motion of this generator, see [`fbm`].
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> Result<f64> {
        fbm(self, x, y, octaves, persistence)
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl NoiseFn<f64, 2> for NoiseGenerator {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise(point[0], point[1])
    }
}

// =============================================================================
// LEGACY HASH NOISE
// =============================================================================

/// Lattice noise hashed directly from (seed, x, y) with no permutation table.
///
/// Kept for reproducing maps made with the older generator; its gradients are
/// less evenly distributed than [`NoiseGenerator`]'s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashNoise {
    seed: i32,
}

impl HashNoise {
    pub fn new(seed: u64) -> Self {
        // The legacy hash works on 32-bit signed arithmetic.
        Self { seed: seed as i32 }
    }

    fn hash(&self, x: i32, y: i32) -> usize {
        let h = self
            .seed
            .wrapping_mul(1_234_567)
            .wrapping_add(x.wrapping_mul(2_345_678))
            .wrapping_add(y.wrapping_mul(3_456_789))
            & 255;
        let mixed = ((h << 13) ^ h).wrapping_mul(
            h.wrapping_mul(h.wrapping_mul(h).wrapping_mul(15_731).wrapping_add(789_221))
                .wrapping_add(1_376_312_589),
        );
        (mixed & 255) as usize
    }

    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let (xi, x) = lattice(x);
        let (yi, y) = lattice(y);
        let (xi, yi) = (xi as i32, yi as i32);

        blend_corners(
            self.hash(xi, yi),
            self.hash(xi + 1, yi),
            self.hash(xi, yi + 1),
            self.hash(xi + 1, yi + 1),
            x,
            y,
        )
    }
}

impl NoiseFn<f64, 2> for HashNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise(point[0], point[1])
    }
}

// =============================================================================
// FRACTAL SUM
// =============================================================================

/// Reject fbm parameters that would make the normalised sum undefined.
pub fn validate_fbm_params(octaves: u32, persistence: f64) -> Result<()> {
    if octaves < 1 {
        return Err(IslandError::invalid("octaves must be at least 1"));
    }
    if !(persistence.is_finite() && persistence > 0.0) {
        return Err(IslandError::invalid(format!(
            "persistence must be a positive finite number, got {persistence}"
        )));
    }
    Ok(())
}

/// Sum of `octaves` noise layers at doubling frequency and `persistence^i`
/// amplitude, divided by the total amplitude so the result keeps the source's range.
pub fn fbm<N>(noise: &N, x: f64, y: f64, octaves: u32, persistence: f64) -> Result<f64>
where
    N: NoiseFn<f64, 2> + ?Sized,
{
    validate_fbm_params(octaves, persistence)?;
    Ok(fractal_sum(noise, x, y, octaves, persistence))
}

/// Unchecked fbm for inner loops; parameters must already pass [`validate_fbm_params`].
pub(crate) fn fractal_sum<N>(noise: &N, x: f64, y: f64, octaves: u32, persistence: f64) -> f64
where
    N: NoiseFn<f64, 2> + ?Sized,
{
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= LACUNARITY;
    }

    total / max_value
}

/// Selects which lattice noise drives generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// Seeded permutation table (canonical)
    #[default]
    Permutation,
    /// Legacy direct hash
    Hash,
}

impl NoiseKind {
    /// Build the noise source of this kind for `seed`.
    pub fn build(self, seed: u64) -> NoiseSource {
        match self {
            NoiseKind::Permutation => NoiseSource::Permutation(NoiseGenerator::new(seed)),
            NoiseKind::Hash => NoiseSource::Hash(HashNoise::new(seed)),
        }
    }
}

impl std::fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseKind::Permutation => write!(f, "permutation"),
            NoiseKind::Hash => write!(f, "hash"),
        }
    }
}

impl std::str::FromStr for NoiseKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permutation" => Ok(Self::Permutation),
            "hash" => Ok(Self::Hash),
            other => Err(format!("unknown noise kind '{other}' (expected permutation or hash)")),
        }
    }
}

/// A noise source chosen at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum NoiseSource {
    Permutation(NoiseGenerator),
    Hash(HashNoise),
}

impl NoiseSource {
    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiseSource::Permutation(_) => NoiseKind::Permutation,
            NoiseSource::Hash(_) => NoiseKind::Hash,
        }
    }
}

impl NoiseFn<f64, 2> for NoiseSource {
    fn get(&self, point: [f64; 2]) -> f64 {
        match self {
            NoiseSource::Permutation(gen) => gen.noise(point[0], point[1]),
            NoiseSource::Hash(legacy) => legacy.noise(point[0], point[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_on_integer_lattice() {
        let gen = NoiseGenerator::new(12345);
        let legacy = HashNoise::new(12345);
        for i in -20..20 {
            for j in -20..20 {
                let (x, y) = (i as f64, j as f64);
                assert!(gen.noise(x, y).abs() < 1e-12, "noise({x}, {y}) = {}", gen.noise(x, y));
                assert!(legacy.noise(x, y).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let a = NoiseGenerator::new(42);
        let b = NoiseGenerator::new(42);
        assert_eq!(a.permutation(), b.permutation());

        for i in 0..200 {
            let x = i as f64 * 0.137 - 7.3;
            let y = i as f64 * 0.291 + 1.9;
            assert_eq!(a.noise(x, y).to_bits(), b.noise(x, y).to_bits());
            assert_eq!(
                a.fbm(x, y, 6, 0.5).unwrap().to_bits(),
                b.fbm(x, y, 6, 0.5).unwrap().to_bits()
            );
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseGenerator::new(1);
        let b = NoiseGenerator::new(2);

        let differs = (0..32).any(|i| {
            let x = 0.37 + i as f64 * 1.13;
            let y = 0.61 + i as f64 * 0.77;
            a.noise(x, y) != b.noise(x, y)
        });
        assert!(differs, "seeds 1 and 2 produced identical samples");
    }

    #[test]
    fn test_permutation_table_shape() {
        let table = PermutationTable::from_seed(7);
        let values = table.as_slice();
        assert_eq!(values.len(), 512);

        let mut first: Vec<u8> = values[..256].to_vec();
        assert_eq!(&values[..256], &values[256..]);
        first.sort_unstable();
        let expected: Vec<u8> = (0..=255).collect();
        assert_eq!(first, expected);
    }

    #[test]
    fn test_reseed_replaces_whole_generator() {
        let mut gen = NoiseGenerator::new(3);
        gen.reseed(99);
        assert_eq!(gen, NoiseGenerator::new(99));
        assert_eq!(gen.seed(), 99);

        let other = gen.with_seed(3);
        assert_eq!(other, NoiseGenerator::new(3));
        assert_eq!(gen.seed(), 99);
    }

    #[test]
    fn test_fbm_bounded() {
        let gen = NoiseGenerator::new(2024);
        for octaves in 1..=8 {
            for &persistence in &[0.1, 0.35, 0.5, 0.8, 1.0] {
                for i in 0..60 {
                    for j in 0..60 {
                        let x = i as f64 * 0.173 - 3.0;
                        let y = j as f64 * 0.219 + 11.0;
                        let v = gen.fbm(x, y, octaves, persistence).unwrap();
                        assert!((-1.0..=1.0).contains(&v), "fbm out of range: {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_fbm_single_octave_is_noise() {
        let gen = NoiseGenerator::new(5);
        let (x, y) = (3.21, -0.45);
        assert_eq!(gen.fbm(x, y, 1, 0.5).unwrap(), gen.noise(x, y));
    }

    #[test]
    fn test_fbm_rejects_bad_params() {
        let gen = NoiseGenerator::default();
        assert!(matches!(gen.fbm(0.5, 0.5, 0, 0.5), Err(IslandError::InvalidConfiguration(_))));
        assert!(matches!(gen.fbm(0.5, 0.5, 4, 0.0), Err(IslandError::InvalidConfiguration(_))));
        assert!(matches!(gen.fbm(0.5, 0.5, 4, f64::NAN), Err(IslandError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_noise_fn_adapter() {
        let gen = NoiseGenerator::new(8);
        let (x, y) = (12.75, 3.5);
        assert_eq!(NoiseFn::get(&gen, [x, y]), gen.noise(x, y));

        // fbm accepts sources from the noise crate too
        let perlin = noise::Perlin::new(8);
        assert!(fbm(&perlin, x, y, 3, 0.5).unwrap().is_finite());
    }

    #[test]
    fn test_noise_is_continuous() {
        let gen = NoiseGenerator::new(77);
        // Straddle a lattice line; fade keeps both sides close.
        let left = gen.noise(4.0 - 1e-7, 2.3);
        let right = gen.noise(4.0 + 1e-7, 2.3);
        assert!((left - right).abs() < 1e-5);
    }

    #[test]
    fn test_noise_kind_builds_matching_source() {
        let source = NoiseKind::Permutation.build(11);
        assert_eq!(source, NoiseSource::Permutation(NoiseGenerator::new(11)));
        assert_eq!(source.get([0.3, 0.7]), NoiseGenerator::new(11).noise(0.3, 0.7));

        let legacy = NoiseKind::Hash.build(11);
        assert_eq!(legacy.kind(), NoiseKind::Hash);
        assert_eq!(legacy.get([0.3, 0.7]), HashNoise::new(11).noise(0.3, 0.7));
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }
}
