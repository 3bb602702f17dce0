//! Finished art and the summary of the pass that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How art is presented. Only affects display, never the glyph choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PreviewStyle {
    #[default]
    Plain,
    /// HTML with one span per glyph, so each glyph occupies its own box.
    Spans,
}

/// One line of glyphs per output row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArt {
    lines: Vec<String>,
}

impl OutputArt {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined by `\n`, without a trailing newline.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn render(&self, style: PreviewStyle) -> String {
        match style {
            PreviewStyle::Plain => self.text(),
            PreviewStyle::Spans => self.spans(),
        }
    }

    fn spans(&self) -> String {
        let mut html = String::new();
        for line in &self.lines {
            html.push_str("<div class=\"art-line\">");
            for glyph in glyphs(line) {
                html.push_str("<span>");
                for c in glyph.chars() {
                    match c {
                        '&' => html.push_str("&amp;"),
                        '<' => html.push_str("&lt;"),
                        _ => html.push(c),
                    }
                }
                html.push_str("</span>");
            }
            html.push_str("</div>");
        }
        html
    }
}

fn is_combining(c: char) -> bool {
    matches!(u32::from(c), 0x0300..=0x036F)
}

/// Split a line into glyphs, keeping combining marks with their base.
pub fn glyphs(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in line.char_indices().skip(1) {
        if !is_combining(c) {
            out.push(&line[start..i]);
            start = i;
        }
    }
    if start < line.len() {
        out.push(&line[start..]);
    }
    out
}

impl fmt::Display for OutputArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionStats {
    /// Glyphs in the catalog before measuring.
    pub candidates: usize,
    /// Fingerprints left after dedup.
    pub unique_glyphs: usize,
    pub cols: u32,
    pub rows: u32,
    pub elapsed_ms: f64,
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unique glyphs (from {} candidates), output: {}x{}",
            self.unique_glyphs, self.candidates, self.cols, self.rows
        )
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub art: OutputArt,
    pub stats: ConversionStats,
}
