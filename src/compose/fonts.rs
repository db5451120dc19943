use crate::config::FontsConfig;
use crate::document::Document;
use crate::font::{Font, StandardFace};
use crate::PDFError;
use id_arena::Id;
use std::path::Path;

/// The four faces body text is set in, selected by weight and slant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSet {
    pub regular: Id<Font>,
    pub bold: Id<Font>,
    pub italic: Id<Font>,
    pub bold_italic: Id<Font>,
}

impl FontSet {
    /// Register the Helvetica family with the document
    pub fn standard(doc: &mut Document) -> FontSet {
        FontSet {
            regular: doc.add_font(Font::standard(StandardFace::Helvetica)),
            bold: doc.add_font(Font::standard(StandardFace::HelveticaBold)),
            italic: doc.add_font(Font::standard(StandardFace::HelveticaOblique)),
            bold_italic: doc.add_font(Font::standard(StandardFace::HelveticaBoldOblique)),
        }
    }

    /// Register the configured faces, falling back to Helvetica for any face
    /// without a configured file
    pub fn from_config(doc: &mut Document, config: &FontsConfig) -> Result<FontSet, PDFError> {
        let mut load = |path: &Option<std::path::PathBuf>, fallback: StandardFace| {
            let font = match path {
                Some(path) => load_truetype(path)?,
                None => Font::standard(fallback),
            };
            Ok::<_, PDFError>(doc.add_font(font))
        };

        Ok(FontSet {
            regular: load(&config.regular, StandardFace::Helvetica)?,
            bold: load(&config.bold, StandardFace::HelveticaBold)?,
            italic: load(&config.italic, StandardFace::HelveticaOblique)?,
            bold_italic: load(&config.bold_italic, StandardFace::HelveticaBoldOblique)?,
        })
    }

    /// The face for a combination of the two style flags
    pub fn select(&self, bold: bool, italic: bool) -> Id<Font> {
        match (bold, italic) {
            (false, false) => self.regular,
            (true, false) => self.bold,
            (false, true) => self.italic,
            (true, true) => self.bold_italic,
        }
    }
}

fn load_truetype(path: &Path) -> Result<Font, PDFError> {
    log::debug!("loading font {}", path.display());
    let bytes = std::fs::read(path)?;
    Font::load(bytes)
}
