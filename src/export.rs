//! PNG export of sampled height fields.
//!
//! Diagnostic output for inspecting a height source before (or instead of)
//! rendering it: the sampled grid is written as a 16-bit grayscale PNG.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::heightmap::HeightGrid;
use crate::terrain::HeightSource;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Minimum height value for normalization.
    pub min_height: f32,
    /// Maximum height value for normalization.
    pub max_height: f32,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
        }
    }
}

impl PngExportOptions {
    /// Options spanning the raw noise range [-1, 1].
    pub fn noise_range() -> Self {
        Self {
            min_height: -1.0,
            max_height: 1.0,
        }
    }

    /// Options with the range auto-detected from the grid.
    pub fn auto_range(grid: &HeightGrid) -> Self {
        let (min, max) = grid.value_range();
        Self {
            min_height: min,
            max_height: max,
        }
    }
}

/// Materializes a height source into a grid of raw (unscaled) samples.
pub fn sample_height_grid(source: &dyn HeightSource, width: u32, height: u32) -> HeightGrid {
    let mut grid = HeightGrid::new(width, height);
    for z in 0..height {
        for x in 0..width {
            grid.set(x, z, source.sample(x, z));
        }
    }
    grid
}

/// Exports a height grid as a 16-bit grayscale PNG.
///
/// Samples are normalized into [0, 1] over `[min_height, max_height]` and
/// scaled to u16. Rows are flipped on write so the PNG's top row corresponds
/// to the grid's far edge, the inverse of the loader's convention; exporting
/// a loaded grid reproduces the source image's orientation.
pub fn export_height_png(
    grid: &HeightGrid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;
    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }
    let range = max - min;

    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(grid.width, grid.height);
    for y in 0..grid.height {
        for x in 0..grid.width {
            let sample = grid.get(x, grid.height - 1 - y);
            let normalized = ((sample - min) / range).clamp(0.0, 1.0);
            img.put_pixel(x, y, Luma([(normalized * 65535.0) as u16]));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(
        writer,
        CompressionType::Default,
        FilterType::Adaptive,
    );
    encoder.write_image(
        bytemuck::cast_slice(img.as_raw()),
        grid.width,
        grid.height,
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{HeightSource, NoiseParams, NoiseSource};

    #[test]
    fn test_sample_height_grid_matches_source() {
        let source = NoiseSource::from_seed(42, NoiseParams::default());
        let grid = sample_height_grid(&source, 8, 5);
        assert_eq!(grid.width, 8);
        assert_eq!(grid.height, 5);
        for z in 0..5 {
            for x in 0..8 {
                assert_eq!(grid.get(x, z), source.sample(x, z));
            }
        }
    }

    #[test]
    fn test_export_rejects_invalid_range() {
        let grid = HeightGrid::new(2, 2);
        let path = std::env::temp_dir().join("terramesh_export_invalid.png");
        let options = PngExportOptions {
            min_height: 1.0,
            max_height: 1.0,
        };
        let err = export_height_png(&grid, &path, &options).unwrap_err();
        assert!(matches!(err, PngExportError::InvalidHeightRange(_, _)));
    }

    #[test]
    fn test_export_round_trips_through_loader() {
        let mut grid = HeightGrid::new(2, 2);
        grid.set(0, 0, 0.0);
        grid.set(1, 0, 1.0);
        grid.set(0, 1, 0.5);
        grid.set(1, 1, 0.25);

        let path = std::env::temp_dir().join("terramesh_export_roundtrip.png");
        export_height_png(&grid, &path, &PngExportOptions::default()).unwrap();
        let loaded = crate::heightmap::load_height_grid(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // The export flips rows back, so load(export(grid)) preserves layout
        // up to 8-bit quantization in the loader.
        assert_eq!(loaded.width, 2);
        assert_eq!(loaded.height, 2);
        for z in 0..2 {
            for x in 0..2 {
                assert!(
                    (loaded.get(x, z) - grid.get(x, z)).abs() <= 1.0 / 255.0,
                    "mismatch at ({}, {})",
                    x,
                    z
                );
            }
        }
    }
}
