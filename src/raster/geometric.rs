//! Font-free backend: paints block, quadrant, sextant and braille glyphs from
//! their Unicode definitions, so fingerprints are exact and font-independent.

use super::{ink, white_canvas, RasterError, Rasterizer};
use image::RgbaImage;

/// Axis-aligned rectangle in cell fractions, `[0, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    coverage: u8,
}

const fn solid(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
    Rect { x0, y0, x1, y1, coverage: 255 }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricRasterizer;

impl GeometricRasterizer {
    /// Whether this backend knows how to draw `ch`.
    pub fn supports(ch: char) -> bool {
        shapes(ch).is_some()
    }
}

impl Rasterizer for GeometricRasterizer {
    fn render(&self, glyph: &str, width: u32, height: u32) -> Result<RgbaImage, RasterError> {
        let mut chars = glyph.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(RasterError::Unsupported(glyph.to_string()));
        };
        let rects = shapes(ch).ok_or_else(|| RasterError::Unsupported(glyph.to_string()))?;

        let mut img = white_canvas(width, height);
        for r in rects {
            fill(&mut img, r);
        }
        Ok(img)
    }
}

fn fill(img: &mut RgbaImage, r: Rect) {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let px = |v: f32, max: f32| (v * max).round().clamp(0.0, max) as u32;
    for y in px(r.y0, h)..px(r.y1, h) {
        for x in px(r.x0, w)..px(r.x1, w) {
            ink(img, x, y, r.coverage);
        }
    }
}

fn shapes(ch: char) -> Option<Vec<Rect>> {
    let cp = u32::from(ch);
    let rects = match cp {
        0x20 => Vec::new(),
        0x2580 => vec![solid(0.0, 0.0, 1.0, 0.5)],
        0x2581..=0x2587 => {
            let n = (cp - 0x2580) as f32;
            vec![solid(0.0, 1.0 - n / 8.0, 1.0, 1.0)]
        }
        0x2588 => vec![solid(0.0, 0.0, 1.0, 1.0)],
        0x2589..=0x258F => {
            let n = (0x2590 - cp) as f32;
            vec![solid(0.0, 0.0, n / 8.0, 1.0)]
        }
        0x2590 => vec![solid(0.5, 0.0, 1.0, 1.0)],
        0x2591..=0x2593 => {
            let level = cp - 0x2590; // 1..=3 quarters of ink
            vec![Rect { coverage: (255 * level / 4) as u8, ..solid(0.0, 0.0, 1.0, 1.0) }]
        }
        0x2594 => vec![solid(0.0, 0.0, 1.0, 0.125)],
        0x2595 => vec![solid(0.875, 0.0, 1.0, 1.0)],
        0x2596..=0x259F => quadrants(QUADRANT_MASKS[(cp - 0x2596) as usize]),
        0x2800..=0x28FF => braille((cp - 0x2800) as u8),
        0x1FB00..=0x1FB3B => sextants(sextant_mask(cp)),
        _ => return None,
    };
    Some(rects)
}

// Bits: 1 = upper left, 2 = upper right, 4 = lower left, 8 = lower right.
const QUADRANT_MASKS: [u8; 10] = [4, 8, 1, 13, 9, 7, 11, 2, 6, 14];

fn quadrants(mask: u8) -> Vec<Rect> {
    (0..4)
        .filter(|bit| mask & (1 << bit) != 0)
        .map(|bit| {
            let (col, row) = ((bit % 2) as f32, (bit / 2) as f32);
            solid(col * 0.5, row * 0.5, (col + 1.0) * 0.5, (row + 1.0) * 0.5)
        })
        .collect()
}

/// Sextant pattern for a codepoint, bit `i` = column `i % 2`, row `i / 2`.
/// Unicode skips the two half-block patterns (left column 21, right column 42).
fn sextant_mask(cp: u32) -> u8 {
    let mut n = cp - 0x1FB00 + 1;
    if n >= 21 {
        n += 1;
    }
    if n >= 42 {
        n += 1;
    }
    n as u8
}

fn sextants(mask: u8) -> Vec<Rect> {
    (0..6)
        .filter(|bit| mask & (1 << bit) != 0)
        .map(|bit| {
            let (col, row) = ((bit % 2) as f32, (bit / 2) as f32);
            solid(col / 2.0, row / 3.0, (col + 1.0) / 2.0, (row + 1.0) / 3.0)
        })
        .collect()
}

// Dot n (1-based) lives at bit n-1: dots 1-3 and 7 form the left column,
// 4-6 and 8 the right.
const BRAILLE_DOTS: [(u8, u8); 8] =
    [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (0, 3), (1, 3)];

fn braille(mask: u8) -> Vec<Rect> {
    BRAILLE_DOTS
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, &(col, row))| {
            let (x, y) = (f32::from(col) / 2.0, f32::from(row) / 4.0);
            solid(x + 0.125, y + 0.0625, x + 0.375, y + 0.1875)
        })
        .collect()
}
