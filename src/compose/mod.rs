//! Flowing letter content onto pages.
//!
//! A [Composer] owns a cursor that walks down the current page. Everything that
//! draws asks it for room first with [Composer::ensure_space]; when the remaining
//! height runs out a fresh page is started, decorated with the watermark before
//! anything else is painted on it, and the cursor jumps back to the top margin.

mod body;
mod flow;
mod fonts;

pub use flow::Marker;
pub use fonts::FontSet;

use crate::colour::Colour;
use crate::document::Document;
use crate::font::Font;
use crate::form_xobject::{FormXObject, FormXObjectLayout};
use crate::layout::{width_of_text, Alignment, Margins};
use crate::markup::TextStyle;
use crate::page::{Page, SpanFont, SpanLayout};
use crate::pagesize::PageSize;
use crate::transform::Transform;
use crate::units::Pt;
use id_arena::Id;

/// Where the next line goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCursor {
    pub page: Id<Page>,
    /// Top of the next line
    pub y: Pt,
    pub page_width: Pt,
    pub page_height: Pt,
    /// The margins text currently flows within; narrower than the page margins
    /// inside list items and columns
    pub margins: Margins,
    pub alignment: Alignment,
}

impl DrawCursor {
    pub fn left(&self) -> Pt {
        self.margins.left
    }

    pub fn content_width(&self) -> Pt {
        self.page_width - self.margins.left - self.margins.right
    }

    /// Height left above the bottom margin
    pub fn remaining(&self) -> Pt {
        self.y - self.margins.bottom
    }

    pub fn top(&self) -> Pt {
        self.page_height - self.margins.top
    }
}

/// A form placed identically on every page before its content
#[derive(Debug, Clone)]
pub struct Watermark {
    pub form: Id<FormXObject>,
    pub placements: Vec<Transform>,
    pub opacity: f32,
}

impl Watermark {
    pub fn apply(&self, page: &mut Page) {
        for transform in &self.placements {
            page.add_form_xobject(
                FormXObjectLayout::new(self.form, *transform).with_opacity(self.opacity),
            );
        }
    }
}

/// Spacing and indentation of body blocks
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMetrics {
    pub list_indent: Pt,
    pub bullet_gap: Pt,
    /// Space above and below a paragraph
    pub paragraph_spacing: (Pt, Pt),
}

impl Default for BlockMetrics {
    fn default() -> Self {
        BlockMetrics {
            list_indent: Pt(20.0),
            bullet_gap: Pt(15.0),
            paragraph_spacing: (Pt(4.0), Pt(6.0)),
        }
    }
}

/// Size and spacing above/below of a heading level
pub(crate) fn heading_metrics(level: u8) -> (Pt, Pt, Pt) {
    match level {
        1 => (Pt(22.0), Pt(14.0), Pt(8.0)),
        2 => (Pt(18.0), Pt(12.0), Pt(6.0)),
        _ => (Pt(15.0), Pt(10.0), Pt(5.0)),
    }
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ordered: bool,
    counter: u32,
}

pub struct Composer<'d> {
    pub(crate) doc: &'d mut Document,
    pub(crate) fonts: FontSet,
    pub(crate) cursor: DrawCursor,
    page_size: PageSize,
    page_margins: Margins,
    watermark: Option<Watermark>,
    /// Style of plain body text
    pub(crate) body_style: TextStyle,
    pub(crate) metrics: BlockMetrics,
    lists: Vec<ListFrame>,
}

impl<'d> Composer<'d> {
    /// Start composing onto a fresh first page
    pub fn new(
        doc: &'d mut Document,
        fonts: FontSet,
        page_size: PageSize,
        page_margins: Margins,
        watermark: Option<Watermark>,
        body_style: TextStyle,
        metrics: BlockMetrics,
    ) -> Composer<'d> {
        let first = Self::create_page(doc, page_size, page_margins, watermark.as_ref());
        let (page_width, page_height) = page_size;
        Composer {
            doc,
            fonts,
            cursor: DrawCursor {
                page: first,
                y: page_height - page_margins.top,
                page_width,
                page_height,
                margins: page_margins,
                alignment: Alignment::Left,
            },
            page_size,
            page_margins,
            watermark,
            body_style,
            metrics,
            lists: Vec::new(),
        }
    }

    fn create_page(
        doc: &mut Document,
        page_size: PageSize,
        margins: Margins,
        watermark: Option<&Watermark>,
    ) -> Id<Page> {
        let mut page = Page::new(page_size, Some(margins));
        if let Some(watermark) = watermark {
            watermark.apply(&mut page);
        }
        doc.add_page(page)
    }

    /// Continue on a new page, keeping the current indentation and alignment
    pub fn new_page(&mut self) {
        self.cursor.page = Self::create_page(
            self.doc,
            self.page_size,
            self.page_margins,
            self.watermark.as_ref(),
        );
        self.cursor.y = self.cursor.top();
        log::debug!("started page {}", self.page_count());
    }

    /// Make sure `height` fits above the bottom margin, breaking the page if it
    /// does not. Returns whether a new page was started.
    pub fn ensure_space(&mut self, height: Pt) -> bool {
        let at_top = self.cursor.y >= self.cursor.top();
        if self.cursor.y - height < self.cursor.margins.bottom && !at_top {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Move the cursor down. Running off the page is settled by the next
    /// [ensure_space](Composer::ensure_space).
    pub fn advance(&mut self, height: Pt) {
        self.cursor.y -= height;
    }

    pub fn cursor(&self) -> &DrawCursor {
        &self.cursor
    }

    pub fn page_margins(&self) -> Margins {
        self.page_margins
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_order.len()
    }

    pub fn body_style(&self) -> &TextStyle {
        &self.body_style
    }

    pub(crate) fn page_mut(&mut self) -> &mut Page {
        &mut self.doc.pages[self.cursor.page]
    }

    pub(crate) fn font_id(&self, style: &TextStyle) -> Id<Font> {
        self.fonts.select(style.bold, style.italic)
    }

    pub(crate) fn font(&self, style: &TextStyle) -> &Font {
        &self.doc.fonts[self.font_id(style)]
    }

    pub fn measure(&self, text: &str, style: &TextStyle) -> Pt {
        width_of_text(text, self.font(style), style.font_size)
    }

    /// Offset from the top of a line box to its baseline
    pub fn baseline_drop(&self, style: &TextStyle) -> Pt {
        (style.line_height - style.font_size) / 2.0 + self.font(style).ascent(style.font_size)
    }

    /// Draw a single run of text with its baseline at `(x, baseline)` without
    /// touching the cursor
    pub fn draw_text(&mut self, text: &str, x: Pt, baseline: Pt, style: &TextStyle) {
        self.draw_coloured(text, x, baseline, style, style.colour);
    }

    pub(crate) fn draw_coloured(
        &mut self,
        text: &str,
        x: Pt,
        baseline: Pt,
        style: &TextStyle,
        colour: Colour,
    ) {
        let font = self.font_id(style);
        self.page_mut().add_span(SpanLayout {
            text: text.to_string(),
            font: SpanFont {
                id: font,
                size: style.font_size,
            },
            colour,
            coords: (x, baseline),
        });
    }

    /// Run `f` with text flowing `indent` further in from the current left edge
    pub fn indented<R>(&mut self, indent: Pt, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.cursor.margins;
        self.cursor.margins = saved.indented(indent);
        let result = f(self);
        self.cursor.margins = saved;
        result
    }

    /// Run `f` with text flowing between `left` and `right` (absolute x positions)
    pub fn within_columns<R>(&mut self, left: Pt, right: Pt, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.cursor.margins;
        self.cursor.margins = Margins {
            left,
            right: self.cursor.page_width - right,
            ..saved
        };
        let result = f(self);
        self.cursor.margins = saved;
        result
    }

    /// Run `f` with a different alignment for new lines
    pub fn aligned<R>(&mut self, alignment: Alignment, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.cursor.alignment;
        self.cursor.alignment = alignment;
        let result = f(self);
        self.cursor.alignment = saved;
        result
    }
}
