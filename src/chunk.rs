//! Image sampling - resamples a source image into a sub-cell ink density grid
//! laid out so each output cell covers exactly one fingerprint grid.

use crate::fingerprint::{ink_density, Grid, GRID_COLS, GRID_LEN, GRID_ROWS};
use image::RgbaImage;

/// Mutable ink density field at sub-cell resolution, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl LuminanceGrid {
    /// Grid of `cols × rows` cells, all paper.
    pub fn new(cols: u32, rows: u32) -> Self {
        let width = cols as usize * GRID_COLS;
        let height = rows as usize * GRID_ROWS;
        Self { width, height, data: vec![0.0; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cols(&self) -> u32 {
        (self.width / GRID_COLS) as u32
    }

    pub fn rows(&self) -> u32 {
        (self.height / GRID_ROWS) as u32
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Add `delta` at signed coordinates; anything outside the grid is dropped.
    pub fn add(&mut self, x: isize, y: isize, delta: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.data[y as usize * self.width + x as usize] += delta;
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Copy out the sub-grid for the cell at (`col`, `row`).
    pub fn cell(&self, col: u32, row: u32) -> Grid {
        let (x0, y0) = (col as usize * GRID_COLS, row as usize * GRID_ROWS);
        let mut grid = [0.0; GRID_LEN];
        for gy in 0..GRID_ROWS {
            let start = (y0 + gy) * self.width + x0;
            grid[gy * GRID_COLS..(gy + 1) * GRID_COLS]
                .copy_from_slice(&self.data[start..start + GRID_COLS]);
        }
        grid
    }
}

/// Slope of the contrast curve. `contrast` is clamped below 1 so the
/// denominator never reaches zero.
pub fn contrast_factor(contrast: f32) -> f32 {
    (1.0 + contrast) / (1.0 - contrast.min(0.99))
}

/// Stretch densities around 0.5, clamping to `[0, 1]`.
pub fn apply_contrast(grid: &mut LuminanceGrid, contrast: f32) {
    if contrast == 0.0 {
        return;
    }
    let factor = contrast_factor(contrast);
    for v in &mut grid.data {
        *v = (factor * (*v - 0.5) + 0.5).clamp(0.0, 1.0);
    }
}

/// Nearest-neighbour sample `image` onto a `cols × rows` cell grid, then apply
/// the global contrast curve.
pub fn sample(image: &RgbaImage, cols: u32, rows: u32, contrast: f32) -> LuminanceGrid {
    let mut grid = LuminanceGrid::new(cols, rows);
    let (img_w, img_h) = (u64::from(image.width()), u64::from(image.height()));
    if img_w == 0 || img_h == 0 {
        return grid;
    }
    let (gw, gh) = (grid.width as u64, grid.height as u64);

    for y in 0..grid.height {
        let sy = (y as u64 * img_h / gh).min(img_h - 1) as u32;
        for x in 0..grid.width {
            let sx = (x as u64 * img_w / gw).min(img_w - 1) as u32;
            grid.data[y * grid.width + x] = ink_density(image.get_pixel(sx, sy));
        }
    }
    apply_contrast(&mut grid, contrast);
    grid
}
