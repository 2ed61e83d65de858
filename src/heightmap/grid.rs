//! Row-major grid of normalized height samples.

use serde::{Deserialize, Serialize};

/// A 2D grid of height samples in [0, 1], stored row-major (width x height).
///
/// Row 0 is the near edge in the renderer's convention (image data is flipped
/// vertically on load). An empty 0x0 grid is a valid value; mesh generation
/// on an empty grid yields empty buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    /// Grid width in samples.
    pub width: u32,
    /// Grid height in samples.
    pub height: u32,
    /// Height values in row-major order, length `width * height`.
    pub samples: Vec<f32>,
}

impl HeightGrid {
    /// Creates a grid of the given size with all samples at 0.0.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: vec![0.0; (width as usize) * (height as usize)],
        }
    }

    /// Creates a grid from existing row-major samples.
    ///
    /// # Panics
    /// Panics if `samples.len() != width * height`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Self {
        assert_eq!(
            samples.len(),
            (width as usize) * (height as usize),
            "sample count must match grid dimensions"
        );
        Self {
            width,
            height,
            samples,
        }
    }

    /// Creates an empty 0x0 grid.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            samples: Vec::new(),
        }
    }

    /// Returns the sample at the given grid coordinate.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.samples[(y * self.width + x) as usize]
    }

    /// Sets the sample at the given grid coordinate.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.samples[(y * self.width + x) as usize] = value;
    }

    /// Returns the total number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the grid holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns (min, max) over all samples, or (0.0, 0.0) for an empty grid.
    pub fn value_range(&self) -> (f32, f32) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        let min = self.samples.iter().cloned().fold(f32::MAX, f32::min);
        let max = self.samples.iter().cloned().fold(f32::MIN, f32::max);
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = HeightGrid::new(4, 3);
        assert_eq!(grid.width, 4);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.len(), 12);
        assert!(grid.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_get_set() {
        let mut grid = HeightGrid::new(8, 8);
        grid.set(3, 5, 0.75);
        assert_eq!(grid.get(3, 5), 0.75);
        assert_eq!(grid.get(5, 3), 0.0);
    }

    #[test]
    fn test_empty_grid() {
        let grid = HeightGrid::empty();
        assert!(grid.is_empty());
        assert_eq!(grid.len(), 0);
        assert_eq!(grid.value_range(), (0.0, 0.0));
    }

    #[test]
    fn test_value_range() {
        let mut grid = HeightGrid::new(2, 2);
        grid.set(0, 0, 0.1);
        grid.set(1, 1, 0.9);
        assert_eq!(grid.value_range(), (0.0, 0.9));
    }

    #[test]
    #[should_panic(expected = "sample count must match")]
    fn test_from_samples_length_mismatch() {
        HeightGrid::from_samples(2, 2, vec![0.0; 3]);
    }
}
