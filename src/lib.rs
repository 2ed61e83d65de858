//! Procedural heightfield terrain mesh generator.
//!
//! This crate turns a height source (multi-octave Perlin noise or a grayscale
//! heightmap image) into a triangulated 3D mesh with per-vertex normals, ready
//! for GPU upload. An interactive wgpu viewer lives in
//! `src/bin/terrain_viewer.rs`.

pub mod camera;
pub mod export;
pub mod heightmap;
pub mod noise;
pub mod terrain;

pub use camera::{Camera, CameraController, MoveDirection};
pub use export::{export_height_png, sample_height_grid, PngExportOptions};
pub use heightmap::{load_height_grid, HeightGrid, HeightmapError};
pub use noise::Perlin;
pub use terrain::{
    build_terrain, GridSource, HeightSource, NoiseParams, NoiseSource, TerrainConfig,
    TerrainError, TerrainMesh, TerrainMode,
};
