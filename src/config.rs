//! Render parameters and the optional TOML settings file.

use crate::output::PreviewStyle;
use crate::{GlyphprintError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Approximate width:height of a monospace cell.
pub const CELL_ASPECT: f32 = 0.5;
pub const DEFAULT_WIDTH: u32 = 80;

/// Per-pass parameters. Changing any of these never re-measures glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub cols: u32,
    pub contrast: f32,
    pub dither: bool,
    pub cell_aspect: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self { cols: DEFAULT_WIDTH, contrast: 0.0, dither: true, cell_aspect: CELL_ASPECT }
    }
}

impl RenderParams {
    pub fn with_cols(mut self, cols: u32) -> Self {
        self.cols = cols;
        self
    }

    pub fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_dither(mut self, enabled: bool) -> Self {
        self.dither = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 {
            return Err(GlyphprintError::InvalidWidth);
        }
        if !self.contrast.is_finite() || !(-1.0..1.0).contains(&self.contrast) {
            return Err(GlyphprintError::InvalidContrast(self.contrast));
        }
        if !self.cell_aspect.is_finite() || self.cell_aspect <= 0.0 {
            let msg = format!("cell aspect must be positive, got {}", self.cell_aspect);
            return Err(GlyphprintError::Config(msg));
        }
        Ok(())
    }

    /// Output rows that keep the image's proportions, at least one.
    pub fn output_rows(&self, img_w: u32, img_h: u32) -> u32 {
        let rows = (img_h as f32 / img_w as f32) * self.cols as f32 * self.cell_aspect;
        rows.round().max(1.0) as u32
    }
}

/// Settings file contents. Every field is optional; command-line flags win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub groups: Option<Vec<String>>,
    pub width: Option<u32>,
    pub contrast: Option<f32>,
    pub dither: Option<bool>,
    pub style: Option<PreviewStyle>,
    pub cell_aspect: Option<f32>,
    pub font: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn groups(&self) -> BTreeSet<String> {
        match &self.groups {
            Some(ids) => ids.iter().cloned().collect(),
            None => crate::catalog::default_groups(),
        }
    }

    pub fn params(&self) -> RenderParams {
        let d = RenderParams::default();
        RenderParams {
            cols: self.width.unwrap_or(d.cols),
            contrast: self.contrast.unwrap_or(d.contrast),
            dither: self.dither.unwrap_or(d.dither),
            cell_aspect: self.cell_aspect.unwrap_or(d.cell_aspect),
        }
    }
}
