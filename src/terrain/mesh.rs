//! Grid-to-mesh triangulation with central-difference normals.

use glam::Vec3;

use super::source::HeightSource;

/// A triangulated heightfield mesh.
///
/// `vertices` is a flat interleaved buffer of 6 floats per vertex
/// (position.xyz, normal.xyz) in row-major grid order; the vertex for grid
/// cell `(x, z)` starts at float index `(z * width + x) * 6`. `indices` holds
/// two triangles per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    /// Grid width in vertices.
    pub width: u32,
    /// Grid height in vertices.
    pub height: u32,
    /// Interleaved position + normal floats, length `width * height * 6`.
    pub vertices: Vec<f32>,
    /// Triangle indices, length `(width - 1) * (height - 1) * 6`.
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Returns a mesh with no vertices or indices.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Builds a terrain mesh by sampling `source` over a `width` x `height`
    /// grid, scaling each sample by `height_scale`.
    ///
    /// For every cell the position is `(x, sample * height_scale, z)`.
    /// Strictly interior cells get a central-difference normal,
    /// `normalize(hL - hR, 2.0, hD - hU)`, computed from the four axis
    /// neighbors through the same source and scale; border cells get the
    /// default up normal (0, 1, 0). A zero-sized grid (empty image grid)
    /// yields empty buffers without panicking.
    pub fn generate(width: u32, height: u32, source: &dyn HeightSource, height_scale: f32) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }

        let sample_at = |x: u32, z: u32| source.sample(x, z) * height_scale;

        let mut vertices = Vec::with_capacity((width as usize) * (height as usize) * 6);
        for z in 0..height {
            for x in 0..width {
                let h = sample_at(x, z);
                vertices.extend_from_slice(&[x as f32, h, z as f32]);

                let interior = x > 0 && x + 1 < width && z > 0 && z + 1 < height;
                let normal = if interior {
                    let hl = sample_at(x - 1, z);
                    let hr = sample_at(x + 1, z);
                    let hd = sample_at(x, z - 1);
                    let hu = sample_at(x, z + 1);
                    // Slope-to-normal estimate: the fixed 2.0 vertical weight
                    // stands in for twice the (unit) grid spacing.
                    Vec3::new(hl - hr, 2.0, hd - hu).normalize()
                } else {
                    Vec3::Y
                };
                vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
            }
        }

        let cells_x = width.saturating_sub(1) as usize;
        let cells_z = height.saturating_sub(1) as usize;
        let mut indices = Vec::with_capacity(cells_x * cells_z * 6);
        for z in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let top_left = z * width + x;
                let top_right = top_left + 1;
                let bottom_left = (z + 1) * width + x;
                let bottom_right = bottom_left + 1;

                // Two triangles per cell, consistent winding across the grid;
                // both share the (top_right, bottom_left) diagonal.
                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        log::debug!(
            "generated terrain mesh: {}x{} grid, {} vertices, {} indices",
            width,
            height,
            vertices.len() / 6,
            indices.len()
        );

        Self {
            width,
            height,
            vertices,
            indices,
        }
    }

    /// Returns the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Returns the number of triangle indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the mesh has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::HeightGrid;
    use crate::terrain::source::{GridSource, NoiseParams, NoiseSource};

    /// Height source with a deterministic slope, handy for normal checks.
    struct Ramp;

    impl HeightSource for Ramp {
        fn sample(&self, x: u32, z: u32) -> f32 {
            (x as f32) * 0.1 + (z as f32) * 0.05
        }
    }

    #[test]
    fn test_buffer_shape_invariants() {
        let source = NoiseSource::from_seed(42, NoiseParams::default());
        for (w, h) in [(2u32, 2u32), (3, 5), (16, 16), (7, 2)] {
            let mesh = TerrainMesh::generate(w, h, &source, 50.0);
            assert_eq!(mesh.vertices.len(), (w * h * 6) as usize);
            assert_eq!(mesh.indices.len(), ((w - 1) * (h - 1) * 6) as usize);
            assert!(mesh.indices.iter().all(|&i| i < w * h));
        }
    }

    #[test]
    fn test_positions_follow_grid_and_scale() {
        let mut grid = HeightGrid::new(3, 3);
        grid.set(1, 2, 0.5);
        let source = GridSource::new(&grid);
        let mesh = TerrainMesh::generate(3, 3, &source, 40.0);

        let v = |x: u32, z: u32| {
            let base = ((z * 3 + x) * 6) as usize;
            (&mesh.vertices[base..base + 3], &mesh.vertices[base + 3..base + 6])
        };

        let (pos, _) = v(1, 2);
        assert_eq!(pos, &[1.0, 20.0, 2.0]);
        let (pos, _) = v(0, 0);
        assert_eq!(pos, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_interior_normals_unit_length() {
        let mesh = TerrainMesh::generate(8, 8, &Ramp, 10.0);
        for z in 1..7u32 {
            for x in 1..7u32 {
                let base = ((z * 8 + x) * 6 + 3) as usize;
                let n = Vec3::new(
                    mesh.vertices[base],
                    mesh.vertices[base + 1],
                    mesh.vertices[base + 2],
                );
                assert!((n.length() - 1.0).abs() < 1e-5, "normal not unit: {:?}", n);
                // The ramp slopes upward in +x and +z, so the normal leans -x/-z.
                assert!(n.x < 0.0 && n.z < 0.0 && n.y > 0.0);
            }
        }
    }

    #[test]
    fn test_border_normals_are_default_up() {
        let mesh = TerrainMesh::generate(5, 5, &Ramp, 10.0);
        for z in 0..5u32 {
            for x in 0..5u32 {
                if x == 0 || x == 4 || z == 0 || z == 4 {
                    let base = ((z * 5 + x) * 6 + 3) as usize;
                    assert_eq!(
                        &mesh.vertices[base..base + 3],
                        &[0.0, 1.0, 0.0],
                        "border vertex ({}, {}) must keep the default up normal",
                        x,
                        z
                    );
                }
            }
        }
    }

    #[test]
    fn test_triangles_share_cell_diagonal() {
        let source = NoiseSource::from_seed(3, NoiseParams::default());
        let (w, h) = (6u32, 4u32);
        let mesh = TerrainMesh::generate(w, h, &source, 50.0);

        let mut cell = 0;
        for z in 0..h - 1 {
            for x in 0..w - 1 {
                let tri = &mesh.indices[cell * 6..cell * 6 + 6];
                let top_left = z * w + x;
                let top_right = top_left + 1;
                let bottom_left = (z + 1) * w + x;
                let bottom_right = bottom_left + 1;

                assert_eq!(tri[..3], [top_left, bottom_left, top_right]);
                assert_eq!(tri[3..], [top_right, bottom_left, bottom_right]);

                // Each triangle contains the shared diagonal exactly once.
                let first = &tri[..3];
                let second = &tri[3..];
                for t in [first, second] {
                    assert!(t.contains(&top_right) && t.contains(&bottom_left));
                }
                cell += 1;
            }
        }
    }

    #[test]
    fn test_empty_grid_yields_empty_mesh() {
        let grid = HeightGrid::empty();
        let source = GridSource::new(&grid);
        let mesh = TerrainMesh::generate(grid.width, grid.height, &source, 50.0);
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_single_row_grid_has_no_triangles() {
        let grid = HeightGrid::new(4, 1);
        let source = GridSource::new(&grid);
        let mesh = TerrainMesh::generate(4, 1, &source, 1.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.indices.is_empty());
        assert!(mesh.is_empty());
    }
}
