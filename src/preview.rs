//! glyphprint-preview - Render a text art file to a PNG with a monospace font

use clap::Parser;
use glyphprint::output::glyphs;
use glyphprint::raster::FontRasterizer;
use glyphprint::GlyphprintError;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glyphprint-preview", about = "Render text art to a PNG")]
struct Args {
    /// Text art file
    text: PathBuf,
    /// Output PNG
    output: PathBuf,
    /// Monospace font used for rendering
    #[arg(short, long, default_value = "assets/DejaVuSansMono.ttf")]
    font: PathBuf,
    /// Font size in pixels (cell height)
    #[arg(short = 's', long, default_value = "14")]
    font_size: u32,
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), GlyphprintError> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    if args.font_size == 0 {
        return Err(GlyphprintError::Config("font size must be positive".into()));
    }

    let font = FontRasterizer::open(&args.font)?;
    let text = std::fs::read_to_string(&args.text)?;
    let img = render_text(&font, &text, args.font_size);
    img.save(&args.output)?;

    eprintln!("[preview] Saved to {}", args.output.display());
    Ok(())
}

fn render_text(font: &FontRasterizer, text: &str, cell_h: u32) -> RgbaImage {
    // Terminal cells are ~1:2
    let cell_w = (cell_h / 2).max(1);
    let lines: Vec<Vec<&str>> = text.lines().map(glyphs).collect();
    let cols = lines.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;
    let rows = (lines.len() as u32).max(1);

    let mut img = RgbaImage::from_pixel(cols * cell_w, rows * cell_h, Rgba([255, 255, 255, 255]));
    for (row, line) in lines.iter().enumerate() {
        for (col, glyph) in line.iter().enumerate() {
            let x = (col as u32 * cell_w) as i32;
            let y = (row as u32 * cell_h) as i32;
            if let Err(e) = font.draw(&mut img, glyph, x, y, cell_h) {
                log::debug!("leaving cell blank: {e}");
            }
        }
    }
    img
}
