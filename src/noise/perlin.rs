//! Classic 3D gradient noise (Ken Perlin's improved noise).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Classic 3D gradient noise generator.
///
/// Construction shuffles a 256-entry permutation of 0..=255 and duplicates it
/// to 512 entries so lattice-corner lookups can index `p[i + 1]` without a
/// wraparound check. The table is immutable afterwards; reseeding means
/// constructing a new instance.
#[derive(Clone)]
pub struct Perlin {
    p: [u8; 512],
}

impl Perlin {
    /// Creates a generator seeded from a nondeterministic source.
    pub fn new() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// Creates a generator with a reproducible permutation table.
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0u8..=255).collect();
        table.shuffle(rng);

        let mut p = [0u8; 512];
        p[..256].copy_from_slice(&table);
        p[256..].copy_from_slice(&table);
        Self { p }
    }

    /// Samples the noise field at a 3D position.
    ///
    /// Deterministic for a given instance. Output stays in approximately
    /// [-1, 1]; classic gradient noise does not guarantee exact bounds but
    /// remains close. At integer lattice points the value is exactly 0.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        // Lattice cell containing the point, wrapped to the table size.
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let zi = (z.floor() as i64 & 255) as usize;

        // Fractional offsets within the cell.
        let x = x - x.floor();
        let y = y - y.floor();
        let z = z - z.floor();

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        // Hash the 8 cube corners via chained permutation lookups.
        let a = self.p[xi] as usize + yi;
        let aa = self.p[a] as usize + zi;
        let ab = self.p[a + 1] as usize + zi;
        let b = self.p[xi + 1] as usize + yi;
        let ba = self.p[b] as usize + zi;
        let bb = self.p[b + 1] as usize + zi;

        // Trilinear interpolation of the corner gradients: x, then y, then z.
        lerp(
            w,
            lerp(
                v,
                lerp(
                    u,
                    grad(self.p[aa], x, y, z),
                    grad(self.p[ba], x - 1.0, y, z),
                ),
                lerp(
                    u,
                    grad(self.p[ab], x, y - 1.0, z),
                    grad(self.p[bb], x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(self.p[aa + 1], x, y, z - 1.0),
                    grad(self.p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(self.p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(self.p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }

    /// Sums `octaves` layers of noise at doubling frequency and decaying
    /// amplitude, normalized by the amplitude sum so the result stays in
    /// [-1, 1] regardless of octave count.
    ///
    /// The third noise coordinate is fixed at 0.5, turning the 3D primitive
    /// into an effectively 2D heightfield function. With `octaves = 1` this
    /// reduces exactly to `noise(x, y, 0.5)`.
    ///
    /// # Panics
    /// Debug-panics if `octaves` is 0.
    pub fn octave_noise(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        debug_assert!(octaves >= 1, "octave_noise requires at least one octave");

        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.noise(x * frequency, y * frequency, 0.5) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        total / max_value
    }
}

impl Default for Perlin {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Perlin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Perlin").finish_non_exhaustive()
    }
}

/// Quintic ease curve `6t^5 - 15t^4 + 10t^3`.
///
/// Zero first and second derivative at t = 0 and t = 1, which removes visible
/// grid-aligned discontinuities from the interpolation.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Gradient dot product for one lattice corner.
///
/// The low 4 bits of the hash pick one of 12 gradient directions built from
/// conditional combinations of the fractional offsets.
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_deterministic_within_instance() {
        let perlin = Perlin::new();
        for i in 0..50 {
            let x = i as f64 * 0.317;
            let y = i as f64 * 0.211;
            let z = i as f64 * 0.173;
            assert_eq!(perlin.noise(x, y, z), perlin.noise(x, y, z));
        }
    }

    #[test]
    fn test_seeded_generators_match() {
        let a = Perlin::from_seed(1234);
        let b = Perlin::from_seed(1234);
        for i in 0..100 {
            let x = i as f64 * 0.173;
            assert_eq!(a.noise(x, 0.4, 0.5), b.noise(x, 0.4, 0.5));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Perlin::from_seed(1);
        let b = Perlin::from_seed(2);
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.31 + 0.17;
            a.noise(x, 0.9, 0.5) != b.noise(x, 0.9, 0.5)
        });
        assert!(differs, "different seeds should produce different fields");
    }

    #[test]
    fn test_noise_range() {
        let perlin = Perlin::from_seed(42);
        for i in 0..2000 {
            let x = (i % 61) as f64 * 0.137 - 4.0;
            let y = (i % 47) as f64 * 0.241 - 3.0;
            let z = (i % 31) as f64 * 0.193 - 2.0;
            let v = perlin.noise(x, y, z);
            assert!(
                (-1.0..=1.0).contains(&v),
                "noise({}, {}, {}) = {} out of range",
                x,
                y,
                z,
                v
            );
        }
    }

    #[test]
    fn test_noise_zero_at_lattice_points() {
        let perlin = Perlin::from_seed(7);
        for x in -3i32..4 {
            for y in -3i32..4 {
                assert_eq!(perlin.noise(x as f64, y as f64, 0.0), 0.0);
            }
        }
    }

    #[test]
    fn test_single_octave_reduces_to_noise() {
        let perlin = Perlin::from_seed(99);
        for i in 0..50 {
            let x = i as f64 * 0.213;
            let y = i as f64 * 0.127;
            assert_eq!(
                perlin.octave_noise(x, y, 1, 0.5),
                perlin.noise(x, y, 0.5),
                "one octave must reduce to the raw noise value"
            );
        }
    }

    #[test]
    fn test_octave_noise_normalized_range() {
        let perlin = Perlin::from_seed(5);
        for octaves in [1u32, 2, 4, 6, 8] {
            for i in 0..200 {
                let x = i as f64 * 0.083;
                let y = i as f64 * 0.059;
                let v = perlin.octave_noise(x, y, octaves, 0.5);
                assert!(
                    (-1.0..=1.0).contains(&v),
                    "octave_noise out of range with {} octaves: {}",
                    octaves,
                    v
                );
            }
        }
    }
}
