//! Terrain mesh generation.
//!
//! Walks a 2D grid, samples a height source per cell, estimates normals by
//! central differences, and emits interleaved vertex attributes plus a
//! triangulated index list.

mod mesh;
mod source;

pub use mesh::TerrainMesh;
pub use source::{GridSource, HeightSource, NoiseParams, NoiseSource};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::heightmap::{load_height_grid, HeightmapError};

/// Selects where terrain heights come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainMode {
    /// Procedural multi-octave Perlin noise.
    Noise,
    /// Grayscale heightmap image.
    Image,
}

impl TerrainMode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            TerrainMode::Noise => TerrainMode::Image,
            TerrainMode::Image => TerrainMode::Noise,
        }
    }
}

/// Errors that can occur while building a terrain mesh.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("image heightmap mode requires a heightmap path")]
    MissingHeightmapPath,
    #[error(transparent)]
    Heightmap(#[from] HeightmapError),
    #[error("height scale must be positive (got {0})")]
    InvalidHeightScale(f32),
    #[error("noise scale must be positive (got {0})")]
    InvalidNoiseScale(f32),
    #[error("octaves must be between 1 and 16 (got {0})")]
    InvalidOctaves(u32),
    #[error("persistence must be strictly between 0 and 1 (got {0})")]
    InvalidPersistence(f32),
}

/// Complete configuration for one terrain build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Height source selection.
    pub mode: TerrainMode,
    /// Grid width in vertices (noise mode; image mode uses image dimensions).
    pub width: u32,
    /// Grid height in vertices (noise mode; image mode uses image dimensions).
    pub height: u32,
    /// Vertical exaggeration applied to every sample (> 0).
    pub height_scale: f32,
    /// Noise source parameters.
    pub noise: NoiseParams,
    /// Heightmap image path, required in image mode.
    pub heightmap_path: Option<PathBuf>,
    /// Noise seed; a nondeterministic seed is drawn when absent.
    pub seed: Option<u64>,
}

impl TerrainConfig {
    /// Checks that every tunable is inside its documented range.
    ///
    /// `octave_noise` divides by the octave amplitude sum, so zero octaves
    /// would yield NaN heights; the remaining ranges keep the noise field
    /// and vertical scaling well formed. Grid dimensions are not checked
    /// here: degenerate grids produce empty buffers, which callers already
    /// treat as fatal.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.height_scale.is_finite() || self.height_scale <= 0.0 {
            return Err(TerrainError::InvalidHeightScale(self.height_scale));
        }
        if !self.noise.noise_scale.is_finite() || self.noise.noise_scale <= 0.0 {
            return Err(TerrainError::InvalidNoiseScale(self.noise.noise_scale));
        }
        if self.noise.octaves < 1 || self.noise.octaves > 16 {
            return Err(TerrainError::InvalidOctaves(self.noise.octaves));
        }
        let persistence = self.noise.persistence;
        if !persistence.is_finite() || persistence <= 0.0 || persistence >= 1.0 {
            return Err(TerrainError::InvalidPersistence(persistence));
        }
        Ok(())
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Noise,
            width: 200,
            height: 200,
            height_scale: 50.0,
            noise: NoiseParams::default(),
            heightmap_path: None,
            seed: None,
        }
    }
}

/// Builds a terrain mesh from the given configuration.
///
/// Parameter ranges are checked up front via [`TerrainConfig::validate`].
///
/// In noise mode the grid size comes from the config; in image mode it comes
/// from the decoded image, and the intermediate height grid is dropped once
/// generation completes. Switching modes is always a full rebuild; previous
/// buffers are replaced wholesale, never patched.
pub fn build_terrain(config: &TerrainConfig) -> Result<TerrainMesh, TerrainError> {
    config.validate()?;
    match config.mode {
        TerrainMode::Noise => {
            let source = match config.seed {
                Some(seed) => NoiseSource::from_seed(seed, config.noise.clone()),
                None => NoiseSource::new(config.noise.clone()),
            };
            Ok(TerrainMesh::generate(
                config.width,
                config.height,
                &source,
                config.height_scale,
            ))
        }
        TerrainMode::Image => {
            let path = config
                .heightmap_path
                .as_ref()
                .ok_or(TerrainError::MissingHeightmapPath)?;
            let grid = load_height_grid(path)?;
            let source = GridSource::new(&grid);
            Ok(TerrainMesh::generate(
                grid.width,
                grid.height,
                &source,
                config.height_scale,
            ))
        }
    }
}
