//! Monospace font backend built on fontdue.

use super::{ink, white_canvas, RasterError, Rasterizer};
use fontdue::{Font, FontSettings};
use image::RgbaImage;
use std::path::Path;

/// Baseline sits 80% of the way down the cell.
const BASELINE: f32 = 0.8;

/// Glyph pixel size is the cell height.
pub struct FontRasterizer {
    font: Font,
}

impl FontRasterizer {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RasterError> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| RasterError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RasterError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RasterError::Font(format!("{}: {e}", path.display())))?;
        log::debug!("loaded font {}", path.display());
        Self::from_bytes(data)
    }

    /// Whether the font has an outline for `ch` (index 0 is `.notdef`).
    pub fn has_glyph(&self, ch: char) -> bool {
        ch == ' ' || self.font.lookup_glyph_index(ch) != 0
    }

    /// Draw `glyph` onto `img` with its pen starting at (`x`, `y_top`).
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        glyph: &str,
        x: i32,
        y_top: i32,
        cell_h: u32,
    ) -> Result<(), RasterError> {
        let px = cell_h as f32;
        let baseline = y_top + (cell_h as f32 * BASELINE).round() as i32;
        let (w, h) = (img.width() as i32, img.height() as i32);

        let mut pen = x as f32;
        for ch in glyph.chars() {
            if !self.has_glyph(ch) {
                return Err(RasterError::Unsupported(glyph.to_string()));
            }
            let (metrics, bitmap) = self.font.rasterize(ch, px);
            let x0 = pen.round() as i32 + metrics.xmin;
            let y0 = baseline - metrics.height as i32 - metrics.ymin;

            for sy in 0..metrics.height {
                for sx in 0..metrics.width {
                    let tx = x0 + sx as i32;
                    let ty = y0 + sy as i32;
                    if tx >= 0 && tx < w && ty >= 0 && ty < h {
                        ink(img, tx as u32, ty as u32, bitmap[sy * metrics.width + sx]);
                    }
                }
            }
            pen += metrics.advance_width;
        }
        Ok(())
    }
}

impl Rasterizer for FontRasterizer {
    fn render(&self, glyph: &str, width: u32, height: u32) -> Result<RgbaImage, RasterError> {
        let mut img = white_canvas(width, height);
        self.draw(&mut img, glyph, 0, 0, height)?;
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{self, Fingerprint, MEASURE_H, MEASURE_W};

    fn mono() -> FontRasterizer {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSansMono.ttf");
        FontRasterizer::open(path).unwrap()
    }

    fn density(img: &RgbaImage) -> f32 {
        Fingerprint::from_pixels("", img).unwrap().density
    }

    #[test]
    fn rejects_garbage_font_data() {
        assert!(matches!(FontRasterizer::from_bytes(vec![0; 16]), Err(RasterError::Font(_))));
    }

    #[test]
    fn missing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FontRasterizer::open(dir.path().join("none.ttf")).err();
        assert!(matches!(err, Some(RasterError::Font(_))));
    }

    #[test]
    fn full_block_fills_the_cell() {
        let img = mono().render("\u{2588}", MEASURE_W, MEASURE_H).unwrap();
        assert_eq!(img.dimensions(), (MEASURE_W, MEASURE_H));
        assert!(density(&img) > 0.95, "density {}", density(&img));
    }

    #[test]
    fn space_is_blank() {
        let img = mono().render(" ", MEASURE_W, MEASURE_H).unwrap();
        assert_eq!(density(&img), 0.0);
    }

    #[test]
    fn period_sits_on_the_baseline() {
        let img = mono().render(".", MEASURE_W, MEASURE_H).unwrap();
        let dark_rows: Vec<u32> = (0..MEASURE_H)
            .filter(|&y| (0..MEASURE_W).any(|x| img.get_pixel(x, y).0[0] < 128))
            .collect();
        let lowest = dark_rows.last().copied().unwrap();
        // baseline is row 51 of 64
        assert!((49..=52).contains(&lowest), "lowest inked row {lowest}");
        assert!(dark_rows[0] > 32);
    }

    #[test]
    fn unmapped_codepoint_is_unsupported() {
        let font = mono();
        assert!(!font.has_glyph('\u{1FB00}'));
        let err = font.render("\u{1FB00}", MEASURE_W, MEASURE_H).err();
        assert!(matches!(err, Some(RasterError::Unsupported(_))));
    }

    #[test]
    fn combining_mark_overlays_its_base() {
        let font = mono();
        let base = font.render("\u{2588}", MEASURE_W, MEASURE_H).unwrap();
        let marked = font.render("\u{2588}\u{0332}", MEASURE_W, MEASURE_H).unwrap();
        assert!(density(&marked) >= density(&base));
    }

    #[test]
    fn measuring_skips_what_the_font_lacks() {
        let glyphs = ["\u{1FB00}", "\u{2588}", "."].map(String::from);
        let fps = fingerprint::measure(&glyphs, &mono());
        let names: Vec<_> = fps.iter().map(|f| f.glyph.as_str()).collect();
        assert_eq!(names, ["\u{2588}", "."]);
    }
}
