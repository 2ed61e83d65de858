//! Noise synthesis for terrain heightfields.
//!
//! Provides classic 3D gradient (Perlin) noise with multi-octave fractal
//! composition. Each generator instance owns its own permutation table.

mod perlin;

pub use perlin::Perlin;
