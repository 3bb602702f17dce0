//! glyphprint CLI - Convert images to Unicode art by glyph fingerprint matching

use clap::Parser;
use glyphprint::catalog::{self, WidthRisk};
use glyphprint::raster::FontRasterizer;
use glyphprint::{
    Converter, GeometricRasterizer, GlyphprintError, PreviewStyle, Rasterizer, RenderParams,
    Settings,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glyphprint", version, about = "Convert images to Unicode art")]
struct Args {
    /// Input image file
    #[arg(required_unless_present = "list_groups")]
    input: Option<PathBuf>,
    /// Output width in characters
    #[arg(short, long)]
    width: Option<u32>,
    /// Comma-separated glyph groups to enable (see --list-groups)
    #[arg(short, long, value_delimiter = ',')]
    groups: Option<Vec<String>>,
    /// Print the available glyph groups and exit
    #[arg(long)]
    list_groups: bool,
    /// Contrast adjustment in [-1, 1)
    #[arg(short, long, allow_hyphen_values = true)]
    contrast: Option<f32>,
    /// Enable Floyd-Steinberg error diffusion (the default)
    #[arg(long, overrides_with = "no_dither")]
    dither: bool,
    /// Disable Floyd-Steinberg error diffusion
    #[arg(long, overrides_with = "dither")]
    no_dither: bool,
    /// Monospace font used to measure glyphs (default: built-in block shapes)
    #[arg(short, long)]
    font: Option<PathBuf>,
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output style
    #[arg(short, long, value_enum)]
    style: Option<PreviewStyle>,
    /// Write art to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Invert the image
    #[arg(short, long)]
    invert: bool,
    /// Print pass statistics as JSON on stderr
    #[arg(long)]
    stats_json: bool,
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), GlyphprintError> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    if args.list_groups {
        list_groups();
        return Ok(());
    }

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let params = render_params(&args, &settings);
    params.validate()?;

    let groups: BTreeSet<String> = match &args.groups {
        Some(ids) => ids.iter().cloned().collect(),
        None => settings.groups(),
    };

    let rasterizer: Box<dyn Rasterizer> = match args.font.as_ref().or(settings.font.as_ref()) {
        Some(path) => Box::new(FontRasterizer::open(path)?),
        None => {
            let candidates = catalog::build(&groups);
            let drawable = candidates
                .iter()
                .filter(|g| g.chars().count() == 1 && g.chars().all(GeometricRasterizer::supports))
                .count();
            let total = candidates.len();
            log::info!("no font given, {drawable} of {total} candidates have built-in shapes");
            Box::new(GeometricRasterizer)
        }
    };
    let mut converter = Converter::new(rasterizer).with_groups(&groups);

    let Some(input) = args.input else {
        return Ok(());
    };
    let mut image = image::open(&input)?;
    if args.invert {
        image.invert();
    }

    let result = converter.convert_image(&image, &params)?;
    let style = args.style.or(settings.style).unwrap_or_default();
    let text = result.art.render(style);

    match &args.output {
        Some(path) => std::fs::write(path, &text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }

    if args.stats_json {
        eprintln!("{}", serde_json::to_string(&result.stats)?);
    } else {
        eprintln!("[glyphprint] {}", result.stats);
    }
    Ok(())
}

/// Settings file values, overridden by whichever flags were given.
fn render_params(args: &Args, settings: &Settings) -> RenderParams {
    let mut params = settings.params();
    if let Some(width) = args.width {
        params.cols = width;
    }
    if let Some(contrast) = args.contrast {
        params.contrast = contrast;
    }
    if args.dither {
        params.dither = true;
    } else if args.no_dither {
        params.dither = false;
    }
    params
}

fn list_groups() {
    let defaults = catalog::default_groups();
    for group in catalog::GROUPS {
        let on = if defaults.contains(group.id) { "*" } else { " " };
        let note = match group.width_risk {
            WidthRisk::None => String::new(),
            WidthRisk::Width(note) => format!("  (width: {note})"),
        };
        let count = group.glyphs().len();
        println!("{on} {:<14} {:<22} {count:>4} glyphs{note}", group.id, group.label);
    }
}
