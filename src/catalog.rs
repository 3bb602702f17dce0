//! Glyph catalog - the fixed master list of candidate glyph groups.

use std::collections::{BTreeSet, HashSet};

/// Whether a group's glyphs have unreliable display width in some environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthRisk {
    None,
    Width(&'static str),
}

/// A statically defined family of glyphs that can be toggled as a unit.
#[derive(Debug, Clone, Copy)]
pub struct GlyphGroup {
    pub id: &'static str,
    pub label: &'static str,
    pub width_risk: WidthRisk,
    pub default_on: bool,
    generate: fn() -> Vec<String>,
}

impl GlyphGroup {
    /// Member glyphs, in the group's own order.
    pub fn glyphs(&self) -> Vec<String> {
        (self.generate)()
    }
}

fn range(start: u32, end: u32) -> impl Iterator<Item = String> {
    (start..=end).filter_map(char::from_u32).map(String::from)
}

fn blocks() -> Vec<String> {
    let mut g = vec![" ".to_string(), "\u{2588}".to_string()];
    g.extend(range(0x2581, 0x2587)); // lower 1/8..7/8
    g.extend(range(0x2589, 0x258F)); // left 7/8..1/8
    g.extend(["\u{2580}", "\u{2584}", "\u{258C}", "\u{2590}"].map(String::from));
    g.extend(["\u{2594}", "\u{2595}"].map(String::from));
    g
}

fn quadrants() -> Vec<String> {
    range(0x2596, 0x259F).collect()
}

fn diagonals() -> Vec<String> {
    ["\u{2571}", "\u{2572}", "\u{2573}"].map(String::from).to_vec()
}

fn braille() -> Vec<String> {
    range(0x2800, 0x28FF).collect()
}

fn triangles() -> Vec<String> {
    ["\u{25E2}", "\u{25E3}", "\u{25E4}", "\u{25E5}"].map(String::from).to_vec()
}

fn sextants() -> Vec<String> {
    range(0x1FB00, 0x1FB3B).collect()
}

fn wedges() -> Vec<String> {
    range(0x1FB3C, 0x1FB6F).collect()
}

fn ascii_punct() -> Vec<String> {
    (0x21u8..=0x7E)
        .map(char::from)
        .filter(|c| !c.is_ascii_alphabetic())
        .map(String::from)
        .collect()
}

fn ascii_letters() -> Vec<String> {
    ('A'..='Z').chain('a'..='z').map(String::from).collect()
}

fn ascii_ramp() -> Vec<String> {
    " .:-=+*#%@".chars().map(String::from).collect()
}

fn geometric() -> Vec<String> {
    // U+25E2..=U+25E5 belong to the triangles group
    range(0x25A0, 0x25FF)
        .filter(|g| !matches!(g.chars().next().map(u32::from), Some(0x25E2..=0x25E5)))
        .collect()
}

fn legacy_blocks() -> Vec<String> {
    // U+1FB93 is unassigned and renders as a missing glyph
    (0x1FB70..=0x1FB9F)
        .filter(|&cp| cp != 0x1FB93)
        .filter_map(char::from_u32)
        .map(String::from)
        .collect()
}

fn shades() -> Vec<String> {
    range(0x2591, 0x2593).collect()
}

fn combining() -> Vec<String> {
    const BASES: [char; 6] = [' ', '\u{2580}', '\u{2584}', '\u{258C}', '\u{2590}', '\u{2588}'];
    // overline, low line, long stroke overlay
    const MARKS: [char; 3] = ['\u{0305}', '\u{0332}', '\u{0336}'];

    let mut g = Vec::with_capacity(BASES.len() * MARKS.len());
    for base in BASES {
        for mark in MARKS {
            g.push([base, mark].iter().collect());
        }
    }
    g
}

/// Master list. The order is part of the catalog contract and never changes.
pub const GROUPS: &[GlyphGroup] = &[
    GlyphGroup {
        id: "blocks",
        label: "Blocks",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: blocks,
    },
    GlyphGroup {
        id: "quadrants",
        label: "Quadrants",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: quadrants,
    },
    GlyphGroup {
        id: "diagonals",
        label: "Diagonals",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: diagonals,
    },
    GlyphGroup {
        id: "braille",
        label: "Braille",
        width_risk: WidthRisk::Width(
            "Width doesn't mix well with other characters in some environments",
        ),
        default_on: false,
        generate: braille,
    },
    GlyphGroup {
        id: "triangles",
        label: "Triangles",
        width_risk: WidthRisk::Width("Grossly unsafe width in pre mode"),
        default_on: false,
        generate: triangles,
    },
    GlyphGroup {
        id: "sextants",
        label: "Sextants",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: sextants,
    },
    GlyphGroup {
        id: "wedges",
        label: "Wedges",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: wedges,
    },
    GlyphGroup {
        id: "ascii_punct",
        label: "ASCII punctuation",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: ascii_punct,
    },
    GlyphGroup {
        id: "ascii_letters",
        label: "ASCII letters",
        width_risk: WidthRisk::None,
        default_on: false,
        generate: ascii_letters,
    },
    GlyphGroup {
        id: "ascii_ramp",
        label: "ASCII ramp",
        width_risk: WidthRisk::None,
        default_on: false,
        generate: ascii_ramp,
    },
    GlyphGroup {
        id: "geometric",
        label: "Geometric shapes",
        width_risk: WidthRisk::Width("Grossly unsafe width - many characters render double-wide"),
        default_on: false,
        generate: geometric,
    },
    GlyphGroup {
        id: "legacy_blocks",
        label: "Legacy block combos",
        width_risk: WidthRisk::None,
        default_on: true,
        generate: legacy_blocks,
    },
    GlyphGroup {
        id: "shades",
        label: "Shades ░▒▓",
        width_risk: WidthRisk::None,
        default_on: false,
        generate: shades,
    },
    GlyphGroup {
        id: "combining",
        label: "Combining overlays",
        width_risk: WidthRisk::Width("Combining marks stack unpredictably in some terminals"),
        default_on: false,
        generate: combining,
    },
];

/// Look up a group by id.
pub fn group(id: &str) -> Option<&'static GlyphGroup> {
    GROUPS.iter().find(|g| g.id == id)
}

/// Ids of the groups enabled out of the box.
pub fn default_groups() -> BTreeSet<String> {
    GROUPS.iter().filter(|g| g.default_on).map(|g| g.id.to_string()).collect()
}

/// Assemble the candidate list for the enabled groups.
///
/// Groups are visited in master-list order and a glyph already emitted by an
/// earlier group is skipped. Unknown ids are ignored.
pub fn build<I, S>(enabled: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let enabled: HashSet<String> = enabled.into_iter().map(|s| s.as_ref().to_string()).collect();
    for id in &enabled {
        if group(id).is_none() {
            log::warn!("ignoring unknown glyph group '{id}'");
        }
    }

    let mut seen = HashSet::new();
    let mut glyphs = Vec::new();
    for g in GROUPS.iter().filter(|g| enabled.contains(g.id)) {
        for glyph in g.glyphs() {
            if seen.insert(glyph.clone()) {
                glyphs.push(glyph);
            }
        }
    }
    log::debug!("catalog: {} candidates from {} groups", glyphs.len(), enabled.len());
    glyphs
}
