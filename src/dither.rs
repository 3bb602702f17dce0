//! Floyd-Steinberg error diffusion at sub-cell resolution.

use crate::chunk::LuminanceGrid;
use crate::fingerprint::{Grid, GRID_COLS, GRID_ROWS};

/// (dx, dy, weight) relative to the sub-cell being quantized.
pub const FLOYD_STEINBERG: [(isize, isize, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Push the residual between the cell's desired densities and the matched
/// glyph's densities onto forward neighbours.
///
/// Offsets are taken from each sub-cell's absolute grid position, so error
/// crosses into neighbouring cells. Targets outside the grid are dropped.
pub fn diffuse(grid: &mut LuminanceGrid, col: u32, row: u32, desired: &Grid, actual: &Grid) {
    let (x0, y0) = (col as usize * GRID_COLS, row as usize * GRID_ROWS);
    for gy in 0..GRID_ROWS {
        for gx in 0..GRID_COLS {
            let i = gy * GRID_COLS + gx;
            let err = desired[i] - actual[i];
            if err == 0.0 {
                continue;
            }
            let (x, y) = ((x0 + gx) as isize, (y0 + gy) as isize);
            for (dx, dy, w) in FLOYD_STEINBERG {
                grid.add(x + dx, y + dy, err * w);
            }
        }
    }
}
