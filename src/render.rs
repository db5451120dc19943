//! Turning a letter record into finished, unprotected PDF bytes.

use crate::colour::colours;
use crate::compose::{BlockMetrics, Composer, FontSet};
use crate::config::GeneratorConfig;
use crate::decorations::{build_watermark, draw_blocks, draw_header, draw_opening, draw_signature};
use crate::document::Document;
use crate::error::GenerationError;
use crate::image::Image;
use crate::info::Info;
use crate::letter::{ApprovedRollNumbers, LetterRecord};
use crate::markup::{parse, TextStyle};
use crate::qr::qr_image;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// Lay out and serialize one letter. Every font face and the QR raster are
/// embedded once, whatever the page count.
pub fn render_letter(
    config: &GeneratorConfig,
    letter: &LetterRecord,
    approved: &ApprovedRollNumbers,
    verification_url: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, GenerationError> {
    let settings = &config.document;
    let page_size = settings.page.size();

    let mut doc = Document::default();
    let fonts = FontSet::from_config(&mut doc, &config.fonts)?;
    let qr = doc.add_image(Image::new_raster(qr_image(verification_url)?));
    let watermark = config.watermark.enabled.then(|| {
        let text = format!("{}-{}", settings.issuer, letter.club_name);
        build_watermark(&mut doc, fonts.regular, &text, &config.watermark, page_size)
    });

    let parsed = parse(&letter.body);
    if !parsed.ignored.is_empty() {
        log::debug!(
            "letter {}: ignored markup constructs {:?}",
            letter.id,
            parsed.ignored
        );
    }

    let body_style = TextStyle::new(settings.body_font_size, settings.line_height, colours::BLACK);
    let metrics = BlockMetrics {
        list_indent: settings.list_indent,
        bullet_gap: settings.bullet_gap,
        ..BlockMetrics::default()
    };

    let mut composer = Composer::new(
        &mut doc,
        fonts,
        page_size,
        settings.margins,
        watermark,
        body_style,
        metrics,
    );
    draw_header(
        &mut composer,
        settings,
        &letter.club_name,
        qr,
        &format_date(letter.date, &settings.date_format),
    );
    draw_opening(&mut composer, settings, &letter.subject);
    composer.compose(&parsed.nodes);
    draw_signature(&mut composer, settings, &letter.sincerely);
    draw_blocks(
        &mut composer,
        config.blocks.layout,
        &letter.approvals_in_order(),
        approved,
    );
    log::info!(
        "letter {} laid out on {} page(s)",
        letter.id,
        composer.page_count()
    );

    let mut info = Info::new();
    info.title(format!("Permission Letter - {}", letter.club_name))
        .author(&letter.sincerely)
        .subject(&letter.subject)
        .keywords(&settings.keywords)
        .creator(&settings.creator)
        .producer(&settings.producer)
        .creation_date(generated_at.into());
    doc.set_info(info);

    Ok(doc.to_bytes()?)
}

fn format_date(date: DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        log::warn!("invalid date format {pattern:?}, using {FALLBACK_DATE_FORMAT}");
        return date.format(FALLBACK_DATE_FORMAT).to_string();
    }
    out
}
