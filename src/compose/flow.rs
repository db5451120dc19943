use super::Composer;
use crate::colour::colours;
use crate::layout::{break_lines, position_line, Measured};
use crate::markup::{StyledFragment, TextStyle};
use crate::page::{LineLayout, LinkAnnotation, RectLayout};
use crate::rect::Rect;
use crate::units::Pt;

/// A list marker, drawn on the baseline of an item's first line
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub text: String,
    pub x: Pt,
    pub style: TextStyle,
}

/// Part of a word in one style
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    style: TextStyle,
    width: Pt,
}

type Word = Vec<Piece>;

/// Words up to a forced break (or the end of the content)
struct Segment {
    words: Vec<Measured<Word>>,
    /// Line height of the break that ends the segment
    break_height: Option<Pt>,
}

/// Whitespace other than the no-break space separates words
fn separates_words(ch: char) -> bool {
    ch.is_whitespace() && ch != '\u{a0}'
}

/// Whether flowing `fragments` would draw anything or move the cursor
pub fn has_content(fragments: &[StyledFragment]) -> bool {
    fragments
        .iter()
        .any(|f| f.is_line_break() || f.text.chars().any(|ch| !separates_words(ch)))
}

impl Composer<'_> {
    fn split_words(&self, fragments: &[StyledFragment]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut words: Vec<Measured<Word>> = Vec::new();
        let mut word: Word = Vec::new();

        for fragment in fragments {
            if fragment.is_line_break() {
                self.finish_word(&mut word, &mut words);
                segments.push(Segment {
                    words: std::mem::take(&mut words),
                    break_height: Some(fragment.style.line_height),
                });
                continue;
            }

            for ch in fragment.text.chars() {
                if separates_words(ch) {
                    self.finish_word(&mut word, &mut words);
                    continue;
                }
                match word.last_mut() {
                    Some(piece) if piece.style == fragment.style => piece.text.push(ch),
                    _ => word.push(Piece {
                        text: ch.to_string(),
                        style: fragment.style.clone(),
                        width: Pt(0.0),
                    }),
                }
            }
        }

        self.finish_word(&mut word, &mut words);
        segments.push(Segment {
            words,
            break_height: None,
        });
        segments
    }

    fn finish_word(&self, word: &mut Word, words: &mut Vec<Measured<Word>>) {
        if word.is_empty() {
            return;
        }
        let mut pieces = std::mem::take(word);
        for piece in pieces.iter_mut() {
            piece.width = self.measure(&piece.text, &piece.style);
        }
        let width = pieces.iter().map(|p| p.width).sum();
        let space = pieces
            .last()
            .map(|p| self.measure(" ", &p.style))
            .unwrap_or_default();
        words.push(Measured {
            item: pieces,
            width,
            space,
        });
    }

    /// Lay out styled text as lines within the current margins, breaking pages as
    /// needed. A pending `marker` is drawn on the first line and consumed.
    pub fn flow(&mut self, fragments: &[StyledFragment], marker: &mut Option<Marker>) {
        for segment in self.split_words(fragments) {
            if segment.words.is_empty() {
                if let Some(height) = segment.break_height {
                    self.blank_line(height, marker);
                }
                continue;
            }

            let lines = break_lines(segment.words, self.cursor.content_width());
            let count = lines.len();
            for (i, line) in lines.iter().enumerate() {
                self.draw_line(line, i + 1 == count, marker);
            }
        }
    }

    /// Flow a single run of text in one style
    pub fn write_line(&mut self, text: &str, style: &TextStyle) {
        let fragment = StyledFragment {
            text: text.to_string(),
            style: style.clone(),
        };
        self.flow(std::slice::from_ref(&fragment), &mut None);
    }

    fn blank_line(&mut self, height: Pt, marker: &mut Option<Marker>) {
        self.ensure_space(height);
        if let Some(marker) = marker.take() {
            let baseline = self.cursor.y - self.baseline_drop(&marker.style);
            self.draw_text(&marker.text, marker.x, baseline, &marker.style);
        }
        self.advance(height);
    }

    fn draw_line(&mut self, line: &[Measured<Word>], last_line: bool, marker: &mut Option<Marker>) {
        let pieces = || line.iter().flat_map(|m| m.item.iter());
        let line_height = pieces()
            .map(|p| p.style.line_height)
            .fold(Pt(0.0), Pt::max);
        let font_size = pieces().map(|p| p.style.font_size).fold(Pt(0.0), Pt::max);
        let ascent = pieces()
            .map(|p| self.font(&p.style).ascent(p.style.font_size))
            .fold(Pt(0.0), Pt::max);

        self.ensure_space(line_height);
        let top = self.cursor.y;
        let baseline = top - (line_height - font_size) / 2.0 - ascent;
        let xs = position_line(
            line,
            self.cursor.alignment,
            last_line,
            self.cursor.left(),
            self.cursor.content_width(),
        );

        if let Some(marker) = marker.take() {
            self.draw_text(&marker.text, marker.x, baseline, &marker.style);
        }

        for (i, (word, x)) in line.iter().zip(&xs).enumerate() {
            let mut x = *x;
            for (j, piece) in word.item.iter().enumerate() {
                // decorations that continue into the next word bridge the gap
                let next = match (j + 1 == word.item.len(), line.get(i + 1)) {
                    (true, Some(next)) => next
                        .item
                        .first()
                        .map(|first| (xs[i + 1] - (x + piece.width), &first.style)),
                    _ => None,
                };
                self.draw_piece(piece, x, baseline, next);
                x += piece.width;
            }
        }

        self.cursor.y = top - line_height;
    }

    fn draw_piece(&mut self, piece: &Piece, x: Pt, baseline: Pt, next: Option<(Pt, &TextStyle)>) {
        let style = &piece.style;
        let font = self.font(style);
        let ascent = font.ascent(style.font_size);
        let descent = font.descent(style.font_size);
        let reach = |continues: fn(&TextStyle, &TextStyle) -> bool| match next {
            Some((gap, next)) if continues(style, next) => piece.width + gap,
            _ => piece.width,
        };
        let text_box = |width: Pt| Rect {
            x1: x,
            y1: baseline + descent,
            x2: x + width,
            y2: baseline + ascent,
        };

        if style.highlight {
            let width = reach(|_, next| next.highlight);
            self.page_mut().add_rect(RectLayout {
                rect: text_box(width),
                colour: colours::HIGHLIGHT,
            });
        }

        let colour = if style.is_link() {
            colours::LINK
        } else {
            style.colour
        };
        self.draw_coloured(&piece.text, x, baseline, style, colour);

        if let Some(uri) = &style.link {
            let width = reach(|this, next| this.link == next.link);
            let underline = baseline - Pt(1.5);
            let page = self.page_mut();
            page.add_line(LineLayout {
                from: (x, underline),
                to: (x + width, underline),
                width: Pt(0.5),
                colour: colours::LINK,
            });
            page.add_link(LinkAnnotation {
                rect: text_box(width),
                uri: uri.clone(),
            });
        }

        if style.strikethrough {
            let width = reach(|_, next| next.strikethrough);
            let y = baseline + style.font_size * 0.3;
            self.page_mut().add_line(LineLayout {
                from: (x, y),
                to: (x + width, y),
                width: (style.font_size * 0.06).max(Pt(0.5)),
                colour: style.colour,
            });
        }
    }
}
