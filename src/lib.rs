//! Image to Unicode converter using measured glyph fingerprints.

pub mod catalog;
pub mod chunk;
pub mod config;
pub mod dither;
pub mod fingerprint;
pub mod matcher;
pub mod output;
pub mod raster;
#[cfg(target_arch = "wasm32")]
pub mod wasm;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

pub use chunk::LuminanceGrid;
pub use config::{RenderParams, Settings};
pub use fingerprint::{Fingerprint, FingerprintSet};
pub use output::{Conversion, ConversionStats, OutputArt, PreviewStyle};
pub use raster::{GeometricRasterizer, RasterError, Rasterizer};

use image::RgbaImage;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlyphprintError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Output width must be at least one column")]
    InvalidWidth,
    #[error("Contrast must be in [-1, 1), got {0}")]
    InvalidContrast(f32),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No glyphs available: enable at least one group the rasterizer can draw")]
    EmptyCatalog,
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("Render worker has shut down")]
    WorkerClosed,
}

impl From<RasterError> for GlyphprintError {
    fn from(e: RasterError) -> Self {
        GlyphprintError::Font(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlyphprintError>;

struct Measured {
    candidates: usize,
    set: FingerprintSet,
}

/// Main converter. Glyph fingerprints are measured once per group set and
/// reused across every pass until the groups change.
pub struct Converter<R> {
    rasterizer: R,
    groups: BTreeSet<String>,
    measured: Option<Measured>,
}

impl<R: Rasterizer> Converter<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer, groups: catalog::default_groups(), measured: None }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_groups(groups);
        self
    }

    /// Replace the enabled group set. Fingerprints are dropped only if the
    /// set actually changed.
    pub fn set_groups<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups: BTreeSet<String> = groups.into_iter().map(|s| s.as_ref().to_string()).collect();
        if groups != self.groups {
            log::debug!("glyph groups changed, fingerprints invalidated");
            self.groups = groups;
            self.measured = None;
        }
    }

    /// Candidate count and the deduplicated fingerprints, measuring on first use.
    pub fn fingerprints(&mut self) -> (usize, &FingerprintSet) {
        let measured = self.measured.get_or_insert_with(|| {
            let glyphs = catalog::build(&self.groups);
            let set = FingerprintSet::dedupe(fingerprint::measure(&glyphs, &self.rasterizer));
            log::info!("{} unique glyphs from {} candidates", set.len(), glyphs.len());
            Measured { candidates: glyphs.len(), set }
        });
        (measured.candidates, &measured.set)
    }

    pub fn convert(&mut self, image: &RgbaImage, params: &RenderParams) -> Result<Conversion> {
        params.validate()?;
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return Err(GlyphprintError::EmptyImage);
        }

        let (candidates, set) = self.fingerprints();
        if set.is_empty() {
            return Err(GlyphprintError::EmptyCatalog);
        }

        let start = std::time::Instant::now();
        let rows = params.output_rows(img_w, img_h);
        let mut grid = chunk::sample(image, params.cols, rows, params.contrast);
        let art = quantize(&mut grid, set, params.dither)?;

        let stats = ConversionStats {
            candidates,
            unique_glyphs: set.len(),
            cols: params.cols,
            rows,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        log::info!("{stats} in {:.0}ms", stats.elapsed_ms);
        Ok(Conversion { art, stats })
    }

    pub fn convert_image(
        &mut self,
        image: &image::DynamicImage,
        params: &RenderParams,
    ) -> Result<Conversion> {
        self.convert(&image.to_rgba8(), params)
    }
}

/// Match every cell of `grid` against `set`, top to bottom, left to right.
///
/// With dithering each cell's residual is diffused before the next cell is
/// read, so the pass is sequential. Without it rows are independent.
pub fn quantize(grid: &mut LuminanceGrid, set: &FingerprintSet, dither: bool) -> Result<OutputArt> {
    if set.is_empty() {
        return Err(GlyphprintError::EmptyCatalog);
    }
    let lines = if dither {
        let mut lines = Vec::with_capacity(grid.rows() as usize);
        for row in 0..grid.rows() {
            let mut line = String::new();
            for col in 0..grid.cols() {
                let cell = grid.cell(col, row);
                let m = matcher::match_cell(&cell, set).ok_or(GlyphprintError::EmptyCatalog)?;
                line.push_str(m.glyph());
                dither::diffuse(grid, col, row, &cell, &m.fingerprint.grid);
            }
            lines.push(line);
        }
        lines
    } else {
        match_rows(grid, set)?
    };
    Ok(OutputArt::new(lines))
}

fn match_row(grid: &LuminanceGrid, set: &FingerprintSet, row: u32) -> Result<String> {
    let mut line = String::new();
    for col in 0..grid.cols() {
        let m = matcher::match_cell(&grid.cell(col, row), set)
            .ok_or(GlyphprintError::EmptyCatalog)?;
        line.push_str(m.glyph());
    }
    Ok(line)
}

#[cfg(not(target_arch = "wasm32"))]
fn match_rows(grid: &LuminanceGrid, set: &FingerprintSet) -> Result<Vec<String>> {
    use rayon::prelude::*;
    (0..grid.rows()).into_par_iter().map(|row| match_row(grid, set, row)).collect()
}

#[cfg(target_arch = "wasm32")]
fn match_rows(grid: &LuminanceGrid, set: &FingerprintSet) -> Result<Vec<String>> {
    (0..grid.rows()).map(|row| match_row(grid, set, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    fn blocks_only() -> Converter<GeometricRasterizer> {
        Converter::new(GeometricRasterizer).with_groups(["blocks"])
    }

    fn no_dither() -> RenderParams {
        RenderParams::default().with_cols(1).with_dither(false)
    }

    #[test]
    fn white_image_is_blank() {
        let out = blocks_only().convert(&solid(2, 2, 255), &no_dither()).unwrap();
        assert_eq!(out.art.lines(), [" "]);
        assert_eq!((out.stats.cols, out.stats.rows), (1, 1));
    }

    #[test]
    fn black_image_is_full_block() {
        let out = blocks_only().convert(&solid(2, 2, 0), &no_dither()).unwrap();
        assert_eq!(out.art.text(), "\u{2588}");
    }

    #[test]
    fn stats_count_candidates() {
        let out = blocks_only().convert(&solid(2, 2, 0), &no_dither()).unwrap();
        assert_eq!(out.stats.candidates, 20);
        assert_eq!(out.stats.unique_glyphs, 20);
    }

    #[test]
    fn dimensions_follow_image() {
        let params = RenderParams::default().with_cols(80);
        let out = blocks_only().convert(&solid(200, 100, 128), &params).unwrap();
        assert_eq!(out.art.rows(), 20);
        assert!(out.art.lines().iter().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn dither_and_plain_agree_on_flat_extremes() {
        let img = solid(40, 40, 0);
        let params = RenderParams::default().with_cols(8);
        let plain = blocks_only().convert(&img, &params.with_dither(false)).unwrap();
        let dithered = blocks_only().convert(&img, &params.with_dither(true)).unwrap();
        assert_eq!(plain.art, dithered.art);
    }

    #[test]
    fn dither_preserves_grey_tone() {
        // mid grey sits marginally closer to paper than to ink, so without
        // dithering every cell collapses to blank
        let mut conv = blocks_only();
        let img = solid(64, 64, 128);
        let params = RenderParams::default().with_cols(16);

        let plain = conv.convert(&img, &params.with_dither(false)).unwrap().art;
        assert!(plain.text().chars().all(|c| c == ' ' || c == '\n'));

        let dithered = conv.convert(&img, &params).unwrap().art;
        let (_, set) = conv.fingerprints();
        let densities: Vec<f32> = dithered
            .lines()
            .iter()
            .flat_map(|l| l.chars())
            .filter_map(|c| set.get(&c.to_string()).map(|fp| fp.density))
            .collect();
        assert_eq!(densities.len(), 16 * 8);
        let mean = densities.iter().sum::<f32>() / densities.len() as f32;
        assert!((0.3..0.7).contains(&mean), "mean density {mean}");
    }

    #[test]
    fn empty_groups_fail() {
        let mut conv = Converter::new(GeometricRasterizer).with_groups(Vec::<String>::new());
        let err = conv.convert(&solid(2, 2, 0), &no_dither());
        assert!(matches!(err, Err(GlyphprintError::EmptyCatalog)));
    }

    #[test]
    fn invalid_params_fail_before_measuring() {
        let mut conv = blocks_only();
        let err = conv.convert(&solid(2, 2, 0), &no_dither().with_contrast(1.0));
        assert!(matches!(err, Err(GlyphprintError::InvalidContrast(_))));
        assert!(conv.measured.is_none());
        let err = conv.convert(&solid(0, 0, 0), &no_dither());
        assert!(matches!(err, Err(GlyphprintError::EmptyImage)));
    }

    #[test]
    fn same_groups_keep_fingerprints() {
        let mut conv = blocks_only();
        conv.fingerprints();
        conv.set_groups(["blocks"]);
        assert!(conv.measured.is_some());
        conv.set_groups(["blocks", "quadrants"]);
        assert!(conv.measured.is_none());
    }
}
