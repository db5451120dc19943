mod standard;
mod truetype;

pub use standard::StandardFace;
pub use truetype::TrueTypeFont;

use crate::{
    refs::{ObjectReferences, RefType},
    PDFError, Pt,
};
use pdf_writer::{Name, Pdf};
use std::fmt::Write;

/// Drawn in place of characters a font cannot encode
pub const PLACEHOLDER: char = '?';

/// A font that text can be measured and drawn with. Either one of the standard
/// Helvetica faces that every viewer provides, or a TrueType face that is embedded
/// into the document.
pub enum Font {
    Standard(StandardFace),
    TrueType(TrueTypeFont),
}

impl Font {
    /// Load a TrueType font from raw bytes
    pub fn load(bytes: Vec<u8>) -> Result<Font, PDFError> {
        Ok(Font::TrueType(TrueTypeFont::load(bytes)?))
    }

    pub fn standard(face: StandardFace) -> Font {
        Font::Standard(face)
    }

    /// Whether this font can draw `ch`
    pub fn supports(&self, ch: char) -> bool {
        match self {
            Font::Standard(_) => StandardFace::encode(ch).is_some(),
            Font::TrueType(font) => font.glyph_id(ch).is_some(),
        }
    }

    /// The advance width of `ch` at the given size, [None] if the font cannot draw it
    pub fn char_advance(&self, ch: char, size: Pt) -> Option<Pt> {
        match self {
            Font::Standard(face) => face.advance(ch).map(|w| size * (w as f32 / 1000.0)),
            Font::TrueType(font) => font
                .advance(ch)
                .map(|w| size * (w / font.units_per_em())),
        }
    }

    /// Distance from the baseline to the top of the tallest glyphs
    pub fn ascent(&self, size: Pt) -> Pt {
        match self {
            Font::Standard(_) => size * (standard::ASCENDER / 1000.0),
            Font::TrueType(font) => font.ascent(size),
        }
    }

    /// Distance from the baseline to the bottom of descending glyphs, negative
    pub fn descent(&self, size: Pt) -> Pt {
        match self {
            Font::Standard(_) => size * (standard::DESCENDER / 1000.0),
            Font::TrueType(font) => size * (font.descender() / font.units_per_em()),
        }
    }

    /// Hex-encode `text` for a `Tj` operator, substituting [PLACEHOLDER] for
    /// anything the font cannot encode
    pub(crate) fn encode_hex(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 4);
        match self {
            Font::Standard(_) => {
                for ch in text.chars() {
                    let code = StandardFace::encode(ch).unwrap_or(PLACEHOLDER as u8);
                    let _ = write!(out, "{code:02x}");
                }
            }
            Font::TrueType(font) => {
                for ch in text.chars() {
                    let gid = font
                        .glyph_id(ch)
                        .or_else(|| font.replacement_glyph_id())
                        .unwrap_or(0);
                    let _ = write!(out, "{gid:04x}");
                }
            }
        }
        out
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        match self {
            Font::Standard(face) => {
                let id = refs.gen(RefType::Font(font_index));
                let mut font = writer.type1_font(id);
                font.base_font(Name(face.base_font().as_bytes()));
                font.encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            Font::TrueType(font) => font.write(refs, font_index, writer),
        }
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Font::Standard(face) => f.debug_tuple("Standard").field(face).finish(),
            Font::TrueType(font) => f.debug_tuple("TrueType").field(&font.name()).finish(),
        }
    }
}
