//! WebAssembly bindings for glyphprint
//!
//! The browser measures glyphs on a canvas and hands the grids over; sampling,
//! matching and dithering run here.

use crate::fingerprint::{self, FingerprintSet, GRID_LEN};
use crate::{chunk, quantize, RenderParams};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmConverter {
    params: RenderParams,
    candidates: usize,
    set: FingerprintSet,
    last_rows: u32,
}

#[wasm_bindgen]
impl WasmConverter {
    /// Create a converter from browser-measured fingerprints
    ///
    /// # Arguments
    /// * `grids` - Flat array of densities:
    ///   [glyph0_grid[0..GRID_LEN], glyph1_grid[0..GRID_LEN], ...]
    /// * `glyphs` - Glyph strings corresponding to the grids
    #[wasm_bindgen(constructor)]
    pub fn new(grids: Vec<f32>, glyphs: Vec<String>) -> Result<WasmConverter, JsValue> {
        let candidates = glyphs.len();
        let fingerprints = fingerprint::from_flat_grids(glyphs, &grids)
            .ok_or_else(|| JsValue::from_str("Grid length doesn't match glyphs * GRID_LEN"))?;
        let set = FingerprintSet::dedupe(fingerprints);
        if set.is_empty() {
            return Err(JsValue::from_str("No glyphs supplied"));
        }

        Ok(WasmConverter { params: RenderParams::default(), candidates, set, last_rows: 0 })
    }

    #[wasm_bindgen]
    pub fn grid_len() -> usize {
        GRID_LEN
    }

    #[wasm_bindgen]
    pub fn set_width(&mut self, width: u32) {
        self.params.cols = width;
    }

    #[wasm_bindgen]
    pub fn set_contrast(&mut self, contrast: f32) {
        self.params.contrast = contrast;
    }

    #[wasm_bindgen]
    pub fn set_dither(&mut self, enabled: bool) {
        self.params.dither = enabled;
    }

    /// Convert RGBA pixel data and return the art text
    #[wasm_bindgen]
    pub fn convert(
        &mut self,
        image_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<String, JsValue> {
        self.params.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let img = image::RgbaImage::from_raw(width, height, image_data.to_vec())
            .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))?;
        if width == 0 || height == 0 {
            return Err(JsValue::from_str("Image has no pixels"));
        }

        let rows = self.params.output_rows(width, height);
        let mut grid = chunk::sample(&img, self.params.cols, rows, self.params.contrast);
        let art = quantize(&mut grid, &self.set, self.params.dither)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.last_rows = rows;
        Ok(art.text())
    }

    /// Counts for the status line: candidates, unique glyphs, output size
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<js_sys::Object, JsValue> {
        let result = js_sys::Object::new();
        js_sys::Reflect::set(&result, &"totalGlyphs".into(), &(self.candidates as u32).into())?;
        js_sys::Reflect::set(&result, &"uniqueGlyphs".into(), &(self.set.len() as u32).into())?;
        js_sys::Reflect::set(&result, &"outputCols".into(), &self.params.cols.into())?;
        js_sys::Reflect::set(&result, &"outputRows".into(), &self.last_rows.into())?;
        Ok(result)
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"glyphprint ready".into());
}
