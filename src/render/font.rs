//! Font database and text measurement
//!
//! Widths come from the horizontal advances of the face fontdb resolves for
//! the requested family. When no face resolves (no fonts installed) widths
//! are estimated per character so hit testing still works.

use std::path::PathBuf;
use std::sync::Arc;

use ttf_parser::Face;
use usvg::fontdb;

use super::geometry::{TextFace, TextMeasure};

/// Shared font database used for both layout and rasterization
#[derive(Clone)]
pub struct FontBook {
    db: Arc<fontdb::Database>,
}

impl FontBook {
    /// System fonts plus any extra font files
    pub fn load(extra_files: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for path in extra_files {
            if let Err(err) = db.load_font_file(path) {
                log::warn!("Failed to load font {}: {}", path.display(), err);
            }
        }
        resolve_sans_serif(&mut db);
        log::debug!("Font database holds {} faces", db.len());
        Self { db: Arc::new(db) }
    }

    /// Book without any faces; text measures by estimate and does not rasterize
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    fn query(&self, family: &str, face: TextFace) -> Option<fontdb::ID> {
        let families = [fontdb::Family::Name(family), fontdb::Family::SansSerif];
        let (weight, style) = match face {
            TextFace::Regular => (fontdb::Weight::NORMAL, fontdb::Style::Normal),
            TextFace::Bold => (fontdb::Weight::BOLD, fontdb::Style::Normal),
            TextFace::Italic => (fontdb::Weight::NORMAL, fontdb::Style::Italic),
        };
        let query = fontdb::Query {
            families: &families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style,
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|face| face.id))
    }
}

/// Point the generic `sans-serif` family at an installed face
///
/// fontdb maps it to Arial by default. Without Arial, usvg would find no
/// face for `'<family>', sans-serif` and draw nothing.
fn resolve_sans_serif(db: &mut fontdb::Database) {
    let families = [fontdb::Family::SansSerif];
    let query = fontdb::Query {
        families: &families,
        ..fontdb::Query::default()
    };
    if db.query(&query).is_some() {
        return;
    }
    let names: Vec<&str> = db
        .faces()
        .filter_map(|face| face.families.first().map(|(name, _)| name.as_str()))
        .collect();
    let preferred = names
        .iter()
        .find(|name| name.contains("Sans") && !name.contains("Mono"))
        .or_else(|| names.first())
        .map(|name| name.to_string());
    if let Some(name) = preferred {
        log::debug!("Using '{}' for sans-serif", name);
        db.set_sans_serif_family(name);
    }
}

impl TextMeasure for FontBook {
    fn text_width(&self, text: &str, family: &str, size: f32, face: TextFace) -> f32 {
        self.query(family, face)
            .and_then(|id| {
                self.db
                    .with_face_data(id, |data, index| measure_with_face(data, index, text, size))
            })
            .flatten()
            .unwrap_or_else(|| estimate_text_width(text, size))
    }
}

fn measure_with_face(data: &[u8], index: u32, text: &str, size: f32) -> Option<f32> {
    let face = Face::parse(data, index).ok()?;
    let units_per_em = face.units_per_em().max(1);
    let space_advance = face
        .glyph_index(' ')
        .and_then(|id| face.glyph_hor_advance(id))
        .unwrap_or(units_per_em / 2);
    let mut advance = 0u32;
    for ch in text.chars() {
        let glyph_advance = face
            .glyph_index(ch)
            .and_then(|glyph| face.glyph_hor_advance(glyph))
            .unwrap_or(space_advance);
        advance = advance.saturating_add(glyph_advance as u32);
    }
    Some(advance as f32 * size / units_per_em as f32)
}

fn estimate_char_units(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_alphanumeric() {
        0.6
    } else if ch.is_ascii() {
        0.35
    } else {
        0.9
    }
}

/// Width estimate used when no font face is available
pub fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars().map(estimate_char_units).sum::<f32>() * size
}
