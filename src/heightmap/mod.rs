//! Normalized height grids and the image-backed heightmap loader.

mod grid;
mod loader;

pub use grid::HeightGrid;
pub use loader::{load_height_grid, HeightmapError};
