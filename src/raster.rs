//! Rasterizer backends that draw a single glyph into a measurement cell.

#[cfg(not(target_arch = "wasm32"))]
pub mod font;
pub mod geometric;

#[cfg(not(target_arch = "wasm32"))]
pub use font::FontRasterizer;
pub use geometric::GeometricRasterizer;

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("unsupported glyph {0:?}")]
    Unsupported(String),
    #[error("font error: {0}")]
    Font(String),
}

/// Draws a glyph in black on a white `width × height` RGBA buffer.
pub trait Rasterizer {
    fn render(&self, glyph: &str, width: u32, height: u32) -> Result<RgbaImage, RasterError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn render(&self, glyph: &str, width: u32, height: u32) -> Result<RgbaImage, RasterError> {
        (**self).render(glyph, width, height)
    }
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn render(&self, glyph: &str, width: u32, height: u32) -> Result<RgbaImage, RasterError> {
        (**self).render(glyph, width, height)
    }
}

/// Blank white canvas every backend draws onto.
pub(crate) fn white_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]))
}

/// Darken a pixel by `coverage` (0 = untouched, 255 = solid black).
/// Overlapping strokes keep the darkest value.
pub(crate) fn ink(img: &mut RgbaImage, x: u32, y: u32, coverage: u8) {
    let shade = 255 - coverage;
    let px = img.get_pixel_mut(x, y);
    for c in &mut px.0[..3] {
        *c = (*c).min(shade);
    }
}
