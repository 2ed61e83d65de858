//! Grayscale heightmap image loading.

use std::path::Path;

use thiserror::Error;

use super::HeightGrid;

/// Errors that can occur while loading a heightmap image.
#[derive(Error, Debug)]
pub enum HeightmapError {
    #[error("failed to decode heightmap {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("heightmap {0} has zero dimensions")]
    EmptyImage(String),
}

/// Loads an image as a normalized height grid.
///
/// Any format the `image` crate can decode is accepted. The image is reduced
/// to 8-bit luminance, flipped vertically (image row 0 is the top; grid row 0
/// is the near edge in the renderer's convention), and each byte is scaled to
/// [0, 1] by dividing by 255. The decoded pixel buffer is consumed while
/// building the grid and released before returning.
///
/// Grid dimensions are taken from the image; callers must not build a mesh
/// from a failed load.
pub fn load_height_grid<P: AsRef<Path>>(path: P) -> Result<HeightGrid, HeightmapError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| HeightmapError::Decode {
        path: path.display().to_string(),
        source,
    })?;

    let luma = img.flipv().into_luma8();
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 {
        return Err(HeightmapError::EmptyImage(path.display().to_string()));
    }

    let samples: Vec<f32> = luma.into_raw().into_iter().map(|b| b as f32 / 255.0).collect();

    log::info!(
        "loaded heightmap {} ({}x{}, {} samples)",
        path.display(),
        width,
        height,
        samples.len()
    );

    Ok(HeightGrid::from_samples(width, height, samples))
}
