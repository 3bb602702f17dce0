//! Cell matching - picks the fingerprint closest to a cell's density pattern.

use crate::fingerprint::{Fingerprint, Grid, GRID_LEN};

#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub fingerprint: &'a Fingerprint,
    /// Mean squared error against the cell.
    pub error: f32,
}

impl Match<'_> {
    pub fn glyph(&self) -> &str {
        &self.fingerprint.glyph
    }
}

#[inline]
pub fn mean_squared_error(a: &Grid, b: &Grid) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>() / GRID_LEN as f32
}

/// Exhaustive scan for the minimum-error fingerprint. On ties the earliest
/// candidate wins. `None` only for an empty candidate list.
pub fn match_cell<'a, I>(cell: &Grid, candidates: I) -> Option<Match<'a>>
where
    I: IntoIterator<Item = &'a Fingerprint>,
{
    let mut best: Option<Match<'a>> = None;
    for fp in candidates {
        let error = mean_squared_error(cell, &fp.grid);
        if best.map_or(true, |b| error < b.error) {
            best = Some(Match { fingerprint: fp, error });
        }
    }
    best
}
