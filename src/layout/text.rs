use crate::font::{Font, PLACEHOLDER};
use crate::units::Pt;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A character the font has no glyph for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedGlyph(pub char);

/// Measure `text`, failing on the first character the font cannot encode
pub fn try_width_of_text(text: &str, font: &Font, size: Pt) -> Result<Pt, UnsupportedGlyph> {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| font.char_advance(ch, size).ok_or(UnsupportedGlyph(ch)))
        .sum()
}

/// Replace every character the font cannot encode with the placeholder glyph
pub fn sanitize_text<'a>(text: &'a str, font: &Font) -> Cow<'a, str> {
    if text.chars().all(|ch| ch == '\n' || font.supports(ch)) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|ch| {
                    if ch == '\n' || font.supports(ch) {
                        ch
                    } else {
                        PLACEHOLDER
                    }
                })
                .collect(),
        )
    }
}

/// Calculate the width of a given string of text given the font and font size.
/// Characters the font cannot encode are measured as the placeholder glyph they
/// will be drawn as.
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Pt {
    match try_width_of_text(text, font, size) {
        Ok(width) => width,
        Err(UnsupportedGlyph(ch)) => {
            log::debug!("measuring {ch:?} as a placeholder");
            let sanitized = sanitize_text(text, font);
            try_width_of_text(&sanitized, font, size).unwrap_or_default()
        }
    }
}

/// Horizontal alignment of the lines of a block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a CSS `text-align` value
    pub fn from_css(value: &str) -> Option<Alignment> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" | "centre" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Something that occupies horizontal space on a line, followed by a stretchable
/// space of natural width `space` if another item comes after it
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    pub item: T,
    pub width: Pt,
    pub space: Pt,
}

/// Total width of a line laid out with natural spacing
pub fn natural_width<T>(line: &[Measured<T>]) -> Pt {
    let words: Pt = line.iter().map(|m| m.width).sum();
    let spaces: Pt = line
        .iter()
        .take(line.len().saturating_sub(1))
        .map(|m| m.space)
        .sum();
    words + spaces
}

/// Greedily pack items into lines. A line keeps growing while its natural width
/// with the next item stays strictly below `max_width`; an item wider than
/// `max_width` on its own still gets a line to itself.
pub fn break_lines<T>(items: Vec<Measured<T>>, max_width: Pt) -> Vec<Vec<Measured<T>>> {
    let mut lines: Vec<Vec<Measured<T>>> = Vec::new();
    let mut line: Vec<Measured<T>> = Vec::new();
    let mut line_width = Pt(0.0);

    for item in items {
        let candidate = match line.last() {
            Some(previous) => line_width + previous.space + item.width,
            None => item.width,
        };

        if line.is_empty() || candidate < max_width {
            line_width = candidate;
            line.push(item);
        } else {
            line_width = item.width;
            lines.push(std::mem::replace(&mut line, vec![item]));
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The x-coordinate of each item on a line.
///
/// Justified lines other than the last of their block stretch every gap equally
/// so the line exactly fills `content_width`; all other lines use natural spacing.
pub fn position_line<T>(
    line: &[Measured<T>],
    alignment: Alignment,
    last_line: bool,
    left: Pt,
    content_width: Pt,
) -> Vec<Pt> {
    if line.is_empty() {
        return Vec::new();
    }

    let words_width: Pt = line.iter().map(|m| m.width).sum();
    let stretched_gap = (alignment == Alignment::Justify && !last_line && line.len() > 1)
        .then(|| (content_width - words_width) / (line.len() - 1) as f32);

    let line_width = match stretched_gap {
        Some(_) => content_width,
        None => natural_width(line),
    };

    let mut x = match alignment {
        Alignment::Left | Alignment::Justify => left,
        Alignment::Center => left + (content_width - line_width) / 2.0,
        Alignment::Right => left + content_width - line_width,
    };

    let mut positions = Vec::with_capacity(line.len());
    for m in line {
        positions.push(x);
        x += m.width + stretched_gap.unwrap_or(m.space);
    }
    positions
}

/// Split `text` into lines that fit within `max_width`, breaking only at whitespace
pub fn wrap_text(text: &str, font: &Font, size: Pt, max_width: Pt) -> Vec<String> {
    let space = width_of_text(" ", font, size);
    let words: Vec<Measured<&str>> = text
        .split_whitespace()
        .map(|word| Measured {
            item: word,
            width: width_of_text(word, font, size),
            space,
        })
        .collect();

    break_lines(words, max_width)
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|m| m.item)
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect()
}
