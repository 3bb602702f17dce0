//! Glyph fingerprints - sub-cell ink density grids measured from rendered glyphs.

use crate::raster::Rasterizer;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

pub const GRID_COLS: usize = 4;
pub const GRID_ROWS: usize = 8;
pub const GRID_LEN: usize = GRID_COLS * GRID_ROWS;

/// Pixels per sub-cell side in the measurement buffer.
pub const MEASURE_SCALE: usize = 8;
pub const MEASURE_W: u32 = (GRID_COLS * MEASURE_SCALE) as u32;
pub const MEASURE_H: u32 = (GRID_ROWS * MEASURE_SCALE) as u32;

/// Below this mean density a glyph is considered to have rendered nothing.
pub const BLANK_THRESHOLD: f32 = 0.001;

/// Row-major sub-cell densities, 0 = no ink, 1 = solid.
pub type Grid = [f32; GRID_LEN];

/// Ink density of one pixel, composited over white.
#[inline]
pub fn ink_density(px: &Rgba<u8>) -> f32 {
    let [r, g, b, a] = px.0;
    let alpha = f32::from(a) / 255.0;
    let over_white = |c: u8| f32::from(c) * alpha + 255.0 * (1.0 - alpha);
    let lum = (0.299 * over_white(r) + 0.587 * over_white(g) + 0.114 * over_white(b)) / 255.0;
    1.0 - lum
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub glyph: String,
    pub grid: Grid,
    pub density: f32,
}

impl Fingerprint {
    pub fn new(glyph: impl Into<String>, grid: Grid) -> Self {
        let density = grid.iter().sum::<f32>() / GRID_LEN as f32;
        Self { glyph: glyph.into(), grid, density }
    }

    /// Average each equal-area sub-cell of a rendered glyph.
    ///
    /// Returns `None` if the buffer does not divide evenly into the grid.
    pub fn from_pixels(glyph: impl Into<String>, img: &RgbaImage) -> Option<Self> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        if w == 0 || h == 0 || w % GRID_COLS != 0 || h % GRID_ROWS != 0 {
            return None;
        }
        let (sub_w, sub_h) = (w / GRID_COLS, h / GRID_ROWS);
        let samples = (sub_w * sub_h) as f32;

        let mut grid = [0.0; GRID_LEN];
        for (y, row) in img.rows().enumerate() {
            let gy = y / sub_h;
            for (x, px) in row.enumerate() {
                grid[gy * GRID_COLS + x / sub_w] += ink_density(px);
            }
        }
        for d in &mut grid {
            *d /= samples;
        }
        Some(Self::new(glyph, grid))
    }

    /// Whether the glyph drew no visible ink. The space never counts as blank.
    pub fn is_blank_render(&self) -> bool {
        self.density < BLANK_THRESHOLD && self.glyph != " "
    }
}

/// Render and fingerprint each glyph in order.
///
/// Glyphs that fail to rasterize, or that render with no visible ink, are
/// skipped. The space is always kept as the canonical blank.
pub fn measure<R: Rasterizer + ?Sized>(glyphs: &[String], rasterizer: &R) -> Vec<Fingerprint> {
    let mut out = Vec::with_capacity(glyphs.len());
    let (mut failed, mut blank) = (0usize, 0usize);

    for glyph in glyphs {
        let img = match rasterizer.render(glyph, MEASURE_W, MEASURE_H) {
            Ok(img) => img,
            Err(e) => {
                log::trace!("skipping {glyph:?}: {e}");
                failed += 1;
                continue;
            }
        };
        if img.dimensions() != (MEASURE_W, MEASURE_H) {
            log::trace!("skipping {glyph:?}: rendered {}x{}", img.width(), img.height());
            failed += 1;
            continue;
        }
        let Some(fp) = Fingerprint::from_pixels(glyph.as_str(), &img) else {
            failed += 1;
            continue;
        };
        if fp.is_blank_render() {
            log::trace!("skipping {glyph:?}: no ink");
            blank += 1;
            continue;
        }
        out.push(fp);
    }

    log::debug!(
        "measured {} of {} glyphs ({failed} failed, {blank} blank)",
        out.len(),
        glyphs.len()
    );
    out
}

/// Fingerprints for grids measured elsewhere, `GRID_LEN` densities per glyph.
///
/// Blank renders are dropped the same way [`measure`] drops them. Returns
/// `None` unless `grids` holds exactly one grid per glyph.
pub fn from_flat_grids(glyphs: Vec<String>, grids: &[f32]) -> Option<Vec<Fingerprint>> {
    if grids.len() != glyphs.len() * GRID_LEN {
        return None;
    }
    let fps = glyphs
        .into_iter()
        .zip(grids.chunks_exact(GRID_LEN))
        .filter_map(|(glyph, chunk)| {
            let mut grid: Grid = [0.0; GRID_LEN];
            grid.copy_from_slice(chunk);
            let fp = Fingerprint::new(glyph, grid);
            if fp.is_blank_render() {
                log::trace!("skipping {:?}: no ink", fp.glyph);
                return None;
            }
            Some(fp)
        })
        .collect();
    Some(fps)
}

/// Grid rounded to three decimals, used as a dedup key.
type Key = [i32; GRID_LEN];

fn key(grid: &Grid) -> Key {
    grid.map(|d| (d * 1000.0).round() as i32)
}

/// Fingerprints with no two sharing the same rounded grid.
///
/// Iteration order is the order in which each distinct grid was first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintSet {
    entries: Vec<Fingerprint>,
}

impl FingerprintSet {
    /// Collapse glyphs with identical rounded grids, keeping the one with
    /// the fewest characters (the earliest on a tie).
    pub fn dedupe(fingerprints: impl IntoIterator<Item = Fingerprint>) -> Self {
        let mut index: HashMap<Key, usize> = HashMap::new();
        let mut entries: Vec<Fingerprint> = Vec::new();

        for fp in fingerprints {
            match index.get(&key(&fp.grid)) {
                Some(&i) => {
                    if fp.glyph.chars().count() < entries[i].glyph.chars().count() {
                        entries[i] = fp;
                    }
                }
                None => {
                    index.insert(key(&fp.grid), entries.len());
                    entries.push(fp);
                }
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fingerprint> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Fingerprint] {
        &self.entries
    }

    pub fn get(&self, glyph: &str) -> Option<&Fingerprint> {
        self.entries.iter().find(|fp| fp.glyph == glyph)
    }
}

impl<'a> IntoIterator for &'a FingerprintSet {
    type Item = &'a Fingerprint;
    type IntoIter = std::slice::Iter<'a, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{GeometricRasterizer, RasterError};

    fn glyphs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    struct Blank;

    impl Rasterizer for Blank {
        fn render(&self, _: &str, w: u32, h: u32) -> Result<RgbaImage, RasterError> {
            Ok(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
        }
    }

    #[test]
    fn ink_density_extremes() {
        assert_eq!(ink_density(&Rgba([255, 255, 255, 255])), 0.0);
        assert!((ink_density(&Rgba([0, 0, 0, 255])) - 1.0).abs() < 1e-6);
        // fully transparent black is paper
        assert!(ink_density(&Rgba([0, 0, 0, 0])).abs() < 1e-6);
    }

    #[test]
    fn space_fingerprint_is_zero() {
        let fps = measure(&glyphs(&[" "]), &GeometricRasterizer);
        assert_eq!(fps.len(), 1);
        assert!(fps[0].grid.iter().all(|d| d.abs() < 1e-6));
        assert_eq!(fps[0].density, 0.0);
    }

    #[test]
    fn blank_renders_are_dropped_except_space() {
        let fps = measure(&glyphs(&["x", " ", "y"]), &Blank);
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].glyph, " ");
    }

    #[test]
    fn failures_are_skipped_and_order_kept() {
        let fps = measure(&glyphs(&["\u{2588}", "A", "\u{2580}", " "]), &GeometricRasterizer);
        let names: Vec<_> = fps.iter().map(|f| f.glyph.as_str()).collect();
        assert_eq!(names, ["\u{2588}", "\u{2580}", " "]);
    }

    #[test]
    fn upper_half_grid() {
        let fps = measure(&glyphs(&["\u{2580}"]), &GeometricRasterizer);
        let grid = fps[0].grid;
        assert!(grid[..GRID_LEN / 2].iter().all(|&d| (d - 1.0).abs() < 1e-6));
        assert!(grid[GRID_LEN / 2..].iter().all(|&d| d.abs() < 1e-6));
        assert!((fps[0].density - 0.5).abs() < 1e-6);
    }

    #[test]
    fn uneven_buffers_are_rejected() {
        let img = RgbaImage::new(30, 64);
        assert!(Fingerprint::from_pixels("x", &img).is_none());
    }

    #[test]
    fn dedupe_keeps_shortest_then_first() {
        let full = [1.0; GRID_LEN];
        let set = FingerprintSet::dedupe([
            Fingerprint::new("ab", full),
            Fingerprint::new("c", full),
            Fingerprint::new("d", full),
            Fingerprint::new(" ", [0.0; GRID_LEN]),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].glyph, "c");
        assert_eq!(set.as_slice()[1].glyph, " ");
    }

    #[test]
    fn dedupe_merges_within_rounding() {
        let mut near = [0.5; GRID_LEN];
        near[3] = 0.5001;
        let set = FingerprintSet::dedupe([
            Fingerprint::new("a", [0.5; GRID_LEN]),
            Fingerprint::new("b", near),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].glyph, "a");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let catalog = crate::catalog::build(["blocks", "quadrants", "sextants", "shades"]);
        let once = FingerprintSet::dedupe(measure(&catalog, &GeometricRasterizer));
        let twice = FingerprintSet::dedupe(once.iter().cloned());
        assert_eq!(once, twice);
    }

    #[test]
    fn sextants_never_alias_blocks() {
        // no sextant shares a grid with a block or quadrant glyph
        let catalog = crate::catalog::build(["blocks", "quadrants", "sextants"]);
        let measured = measure(&catalog, &GeometricRasterizer);
        let set = FingerprintSet::dedupe(measured.clone());
        assert_eq!(set.len(), measured.len());
        assert!(set.get("\u{2588}").is_some());
    }

    #[test]
    fn flat_grids_drop_blank_renders() {
        let mut grids = vec![0.0; GRID_LEN * 2];
        grids.extend([1.0; GRID_LEN]);
        let fps = from_flat_grids(glyphs(&["\u{1FB93}", " ", "\u{2588}"]), &grids).unwrap();
        let names: Vec<_> = fps.iter().map(|f| f.glyph.as_str()).collect();
        assert_eq!(names, [" ", "\u{2588}"]);

        let set = FingerprintSet::dedupe(fps);
        let m = crate::matcher::match_cell(&[0.0; GRID_LEN], &set).unwrap();
        assert_eq!(m.glyph(), " ");
    }

    #[test]
    fn flat_grids_must_match_glyph_count() {
        assert!(from_flat_grids(glyphs(&["a", "b"]), &[0.5; GRID_LEN]).is_none());
        assert_eq!(from_flat_grids(Vec::new(), &[]).map(|v| v.len()), Some(0));
    }
}
