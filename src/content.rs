//! Shared content rendering logic for pages and form XObjects.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{PageContents, SpanFont, SpanLayout};
use id_arena::Arena;
use std::io::Write;

/// Key a fill/stroke opacity by whole percent so equal opacities share one
/// graphics state object
pub(crate) fn opacity_key(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Renders page contents to a PDF content stream.
///
/// This is the shared implementation used by both `Page::render()` and
/// `FormXObject::render()` to convert high-level content items into
/// low-level PDF operators.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    if contents.is_empty() {
        return Ok(Vec::default());
    }

    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(spans) => {
                render_text_spans(&mut content, spans, fonts)?;
            }
            PageContents::Image(image) => {
                write!(&mut content, "q\n")?;
                write!(
                    &mut content,
                    "{} 0 0 {} {} {} cm\n",
                    image.position.x2 - image.position.x1,
                    image.position.y2 - image.position.y1,
                    image.position.x1,
                    image.position.y1
                )?;
                write!(&mut content, "/I{} Do\n", image.image_id.index())?;
                write!(&mut content, "Q\n")?;
            }
            PageContents::FormXObject(layout) => {
                let t = &layout.transform;
                write!(&mut content, "q\n")?;
                if let Some(opacity) = layout.opacity {
                    write!(&mut content, "/GS{} gs\n", opacity_key(opacity))?;
                }
                write!(
                    &mut content,
                    "{} {} {} {} {} {} cm\n",
                    t.a, t.b, t.c, t.d, t.e, t.f
                )?;
                write!(&mut content, "/X{} Do\n", layout.xobj_id.index())?;
                write!(&mut content, "Q\n")?;
            }
            PageContents::Line(line) => {
                write!(&mut content, "q\n")?;
                write_stroke_colour(&mut content, line.colour)?;
                write!(&mut content, "{} w\n", line.width)?;
                write!(&mut content, "{} {} m\n", line.from.0, line.from.1)?;
                write!(&mut content, "{} {} l\n", line.to.0, line.to.1)?;
                write!(&mut content, "S\n")?;
                write!(&mut content, "Q\n")?;
            }
            PageContents::Rect(fill) => {
                write!(&mut content, "q\n")?;
                write_colour(&mut content, fill.colour)?;
                write!(
                    &mut content,
                    "{} {} {} {} re\n",
                    fill.rect.x1,
                    fill.rect.y1,
                    fill.rect.width(),
                    fill.rect.height()
                )?;
                write!(&mut content, "f\n")?;
                write!(&mut content, "Q\n")?;
            }
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_text_spans(
    content: &mut Vec<u8>,
    spans: &[SpanLayout],
    fonts: &Arena<Font>,
) -> Result<(), std::io::Error> {
    let Some(first) = spans.first() else {
        return Ok(());
    };

    write!(content, "q\n")?;

    let mut current_font: SpanFont = first.font;
    let mut current_colour: Colour = first.colour;

    write!(
        content,
        "/F{} {} Tf\n",
        current_font.id.index(),
        current_font.size
    )?;
    write_colour(content, current_colour)?;

    for span in spans.iter() {
        if span.font != current_font {
            current_font = span.font;
            write!(
                content,
                "/F{} {} Tf\n",
                current_font.id.index(),
                current_font.size
            )?;
        }
        if span.colour != current_colour {
            current_colour = span.colour;
            write_colour(content, current_colour)?;
        }

        let encoded = match fonts.get(current_font.id) {
            Some(font) => font.encode_hex(&span.text),
            None => continue,
        };

        write!(content, "BT\n")?;
        write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;
        write!(content, "<{encoded}> Tj\n")?;
        write!(content, "ET\n")?;
    }

    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n"),
        Colour::CMYK { c, m, y, k } => write!(content, "{c} {m} {y} {k} k\n"),
        Colour::Grey { g } => write!(content, "{g} g\n"),
    }
}

#[allow(clippy::write_with_newline)]
fn write_stroke_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} RG\n"),
        Colour::CMYK { c, m, y, k } => write!(content, "{c} {m} {y} {k} K\n"),
        Colour::Grey { g } => write!(content, "{g} G\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::StandardFace;
    use crate::page::{LineLayout, RectLayout};
    use crate::{colours, Pt, Rect};

    #[test]
    fn text_is_drawn_with_its_font_and_colour() {
        let mut fonts: Arena<Font> = Arena::new();
        let id = fonts.alloc(Font::standard(StandardFace::Helvetica));
        let contents = vec![PageContents::Text(vec![SpanLayout {
            text: "Hi".into(),
            font: SpanFont { id, size: Pt(12.0) },
            colour: colours::LINK,
            coords: (Pt(10.0), Pt(20.0)),
        }])];

        let rendered = String::from_utf8(render_contents(&contents, &fonts).unwrap()).unwrap();
        assert!(rendered.contains("/F0 12 Tf"));
        assert!(rendered.contains("0 0.2 0.8 rg"));
        assert!(rendered.contains("10 20 Td"));
        assert!(rendered.contains("<4869> Tj"));
    }

    #[test]
    fn lines_and_fills_use_the_right_operators() {
        let fonts: Arena<Font> = Arena::new();
        let contents = vec![
            PageContents::Rect(RectLayout {
                rect: Rect::from_origin(Pt(1.0), Pt(2.0), Pt(3.0), Pt(4.0)),
                colour: colours::HIGHLIGHT,
            }),
            PageContents::Line(LineLayout {
                from: (Pt(0.0), Pt(0.0)),
                to: (Pt(5.0), Pt(0.0)),
                width: Pt(0.5),
                colour: colours::BLACK,
            }),
        ];

        let rendered = String::from_utf8(render_contents(&contents, &fonts).unwrap()).unwrap();
        assert!(rendered.contains("1 2 3 4 re\nf"));
        assert!(rendered.contains("0 G\n0.5 w\n0 0 m\n5 0 l\nS"));
    }

    #[test]
    fn opacities_round_to_whole_percent() {
        assert_eq!(opacity_key(0.3), 30);
        assert_eq!(opacity_key(1.7), 100);
    }
}
