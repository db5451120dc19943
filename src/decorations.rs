//! The fixed parts of a permission letter that surround the free-form body:
//! the header with the club name, verification QR code and date, the opening
//! lines, the signature, the approval and permitted-students blocks, and the
//! watermark tiled across every page.

use crate::colour::{colours, Colour};
use crate::compose::{Composer, Watermark};
use crate::config::{BlockLayout, DocumentConfig, WatermarkConfig};
use crate::document::Document;
use crate::font::Font;
use crate::form_xobject::FormXObject;
use crate::image::Image;
use crate::layout::wrap_text;
use crate::letter::{group_label, ApprovalStatus, ApprovedRollNumbers, ReviewerRole};
use crate::markup::TextStyle;
use crate::page::{ImageLayout, SpanFont, SpanLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::transform::Transform;
use crate::units::Pt;
use id_arena::Id;

const CLUB_NAME_SIZE: Pt = Pt(18.0);
const CLUB_NAME_DROP: Pt = Pt(70.0);
const QR_SIZE: Pt = Pt(80.0);
/// Distance of the QR code's lower-left corner from the top-right page corner
const QR_INSET: Pt = Pt(120.0);
const DETAIL_SIZE: Pt = Pt(10.0);
const BLOCK_INDENT: Pt = Pt(20.0);
const ROLL_INDENT: Pt = Pt(40.0);
const COLUMN_GUTTER: Pt = Pt(20.0);

pub const APPROVALS_HEADING: &str = "Approval Status:";
pub const PERMITTED_HEADING: &str = "The following students are permitted:";

/// Draw the header on the first page and move the cursor to the first body line
pub fn draw_header(
    c: &mut Composer<'_>,
    config: &DocumentConfig,
    club_name: &str,
    qr: Id<Image>,
    date: &str,
) {
    let (width, height) = (c.cursor().page_width, c.cursor().page_height);

    let title = c.body_style().clone().sized(CLUB_NAME_SIZE).bold();
    let title_width = c.measure(club_name, &title);
    c.draw_text(
        club_name,
        (width - title_width) / 2.0,
        height - CLUB_NAME_DROP,
        &title,
    );

    let qr_x = width - QR_INSET;
    let qr_y = height - QR_INSET;
    c.page_mut().add_image(ImageLayout {
        image_id: qr,
        position: Rect::from_origin(qr_x, qr_y, QR_SIZE, QR_SIZE),
    });

    let detail = c.body_style().clone().sized(DETAIL_SIZE);
    c.draw_text(
        &format!("Date: {date}"),
        qr_x,
        qr_y - detail.line_height,
        &detail,
    );

    let body = c.body_style().clone();
    c.cursor.y = height - config.first_line_offset + c.baseline_drop(&body);
}

/// Recipient address, subject line and salutation
pub fn draw_opening(c: &mut Composer<'_>, config: &DocumentConfig, subject: &str) {
    let body = c.body_style().clone();
    for line in &config.recipient {
        c.write_line(line, &body);
    }
    c.advance(body.line_height);
    c.write_line(&format!("Subject: {subject}"), &body.clone().bold());
    c.advance(body.line_height);
    c.write_line(&config.salutation, &body);
}

pub fn draw_signature(c: &mut Composer<'_>, config: &DocumentConfig, name: &str) {
    let body = c.body_style().clone();
    c.advance(body.line_height);
    c.write_line(&config.closing, &body);
    c.write_line(name, &body.bold());
}

fn status_colour(status: ApprovalStatus) -> Colour {
    if status.is_approved() {
        colours::APPROVED
    } else {
        colours::NOT_APPROVED
    }
}

fn approval_line(role: ReviewerRole, status: ApprovalStatus) -> String {
    format!("{}: {}", role.label(), status).to_uppercase()
}

fn draw_approvals(c: &mut Composer<'_>, approvals: &[(ReviewerRole, ApprovalStatus)]) {
    let heading = c.body_style().clone().bold();
    c.write_line(APPROVALS_HEADING, &heading);
    let detail = c.body_style().clone().sized(DETAIL_SIZE);
    c.indented(BLOCK_INDENT, |c| {
        for (role, status) in approvals {
            let style = detail.clone().coloured(status_colour(*status));
            c.write_line(&approval_line(*role, *status), &style);
        }
    });
}

fn draw_permitted(c: &mut Composer<'_>, approved: &ApprovedRollNumbers) {
    let heading = c.body_style().clone().bold();
    c.write_line(PERMITTED_HEADING, &heading);
    let detail = c.body_style().clone().sized(DETAIL_SIZE);
    for (group, rolls) in approved.groups_in_order() {
        c.indented(BLOCK_INDENT, |c| {
            c.write_line(&format!("{}:", group_label(group)), &detail.clone().bold())
        });
        c.indented(ROLL_INDENT, |c| c.write_line(&rolls.join(", "), &detail));
    }
}

fn wrapped_height(c: &Composer<'_>, text: &str, style: &TextStyle, width: Pt) -> Pt {
    let lines = wrap_text(text, c.font(style), style.font_size, width).len().max(1);
    style.line_height * lines as f32
}

fn approvals_height(
    c: &Composer<'_>,
    approvals: &[(ReviewerRole, ApprovalStatus)],
    width: Pt,
) -> Pt {
    let heading = c.body_style().clone().bold();
    let detail = c.body_style().clone().sized(DETAIL_SIZE);
    approvals
        .iter()
        .map(|(role, status)| {
            wrapped_height(c, &approval_line(*role, *status), &detail, width - BLOCK_INDENT)
        })
        .sum::<Pt>()
        + wrapped_height(c, APPROVALS_HEADING, &heading, width)
}

fn permitted_height(c: &Composer<'_>, approved: &ApprovedRollNumbers, width: Pt) -> Pt {
    let heading = c.body_style().clone().bold();
    let detail = c.body_style().clone().sized(DETAIL_SIZE);
    let label = detail.clone().bold();
    approved
        .groups_in_order()
        .into_iter()
        .map(|(group, rolls)| {
            wrapped_height(c, &group_label(group), &label, width - BLOCK_INDENT)
                + wrapped_height(c, &rolls.join(", "), &detail, width - ROLL_INDENT)
        })
        .sum::<Pt>()
        + wrapped_height(c, PERMITTED_HEADING, &heading, width)
}

/// Draw the approval-status and permitted-students blocks. Empty blocks are
/// left out. Side by side placement is only used when both blocks fit on the
/// current page; otherwise they follow one another.
pub fn draw_blocks(
    c: &mut Composer<'_>,
    layout: BlockLayout,
    approvals: &[(ReviewerRole, ApprovalStatus)],
    approved: &ApprovedRollNumbers,
) {
    let gap = c.body_style().line_height;
    let show_approvals = !approvals.is_empty();
    let show_permitted = !approved.is_empty();

    if layout == BlockLayout::TwoColumn && show_approvals && show_permitted {
        let left = c.cursor().left();
        let total = c.cursor().content_width();
        let column = (total - COLUMN_GUTTER) / 2.0;
        let needed = approvals_height(c, approvals, column).max(permitted_height(c, approved, column));

        if gap + needed <= c.cursor().remaining() {
            c.advance(gap);
            let top = c.cursor().y;
            c.within_columns(left, left + column, |c| draw_approvals(c, approvals));
            let left_bottom = c.cursor().y;
            c.cursor.y = top;
            c.within_columns(left + column + COLUMN_GUTTER, left + total, |c| {
                draw_permitted(c, approved)
            });
            c.cursor.y = c.cursor.y.min(left_bottom);
            return;
        }
        log::debug!("approval blocks do not fit side by side, stacking them");
    }

    if show_approvals {
        c.advance(gap);
        draw_approvals(c, approvals);
    }
    if show_permitted {
        c.advance(gap);
        draw_permitted(c, approved);
    }
}

/// Register the watermark text as a form and lay out the grid of placements
/// covering a page of `page_size`
pub fn build_watermark(
    doc: &mut Document,
    font: Id<Font>,
    text: &str,
    config: &WatermarkConfig,
    page_size: PageSize,
) -> Watermark {
    let size = config.font_size;
    let (text_width, ascent, descent) = {
        let face = &doc.fonts[font];
        (
            crate::layout::width_of_text(text, face, size),
            face.ascent(size),
            face.descent(size),
        )
    };

    let mut form = FormXObject::from_bbox(Rect {
        x1: Pt(0.0),
        y1: descent,
        x2: text_width,
        y2: ascent,
    });
    form.add_span(SpanLayout {
        text: text.to_string(),
        font: SpanFont { id: font, size },
        colour: Colour::new_grey(config.grey),
        coords: (Pt(0.0), Pt(0.0)),
    });
    let form = doc.add_form_xobject(form);

    // where the far end of the rotated text lands relative to its origin
    let angle = config.angle.to_radians();
    let reach_x = text_width * angle.cos();
    let reach_y = text_width * angle.sin();
    let (width, height) = page_size;

    let mut placements = Vec::new();
    let mut y = -reach_y.max(Pt(0.0));
    while y <= height - reach_y.min(Pt(0.0)) {
        let mut x = -reach_x.max(Pt(0.0));
        while x <= width - reach_x.min(Pt(0.0)) {
            placements.push(Transform::rotate(angle).with_translate(x, y));
            x += config.column_spacing;
        }
        y += config.row_spacing;
    }
    log::debug!("watermark {text:?} tiled {} times per page", placements.len());

    Watermark {
        form,
        placements,
        opacity: config.opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::tests::composer;
    use crate::compose::FontSet;
    use crate::letter::tests::sample_letter;
    use crate::pagesize;

    fn texts(doc: &Document) -> Vec<String> {
        doc.ordered_pages()
            .flat_map(|p| p.spans())
            .map(|s| s.text.clone())
            .collect()
    }

    #[test]
    fn approvals_follow_role_order_with_status_colours() {
        let letter = sample_letter();
        let mut doc = Document::default();
        let mut c = composer(&mut doc);
        draw_blocks(
            &mut c,
            BlockLayout::Sequential,
            &letter.approvals_in_order(),
            &ApprovedRollNumbers::default(),
        );
        drop(c);

        let page = doc.ordered_pages().next().unwrap();
        let roles: Vec<_> = page
            .spans()
            .map(|s| s.text.as_str())
            .filter(|t| ["DIRECTOR:", "DSAA:", "HOD:"].contains(t))
            .collect();
        assert_eq!(roles, vec!["DIRECTOR:", "DSAA:", "HOD:"]);
        let director_status = page.spans().find(|s| s.text == "APPROVED").unwrap();
        assert_eq!(director_status.colour, colours::APPROVED);
        let pending = page.spans().find(|s| s.text == "PENDING").unwrap();
        assert_eq!(pending.colour, colours::NOT_APPROVED);
        assert!(texts(&doc).iter().all(|t| t != PERMITTED_HEADING));
    }

    #[test]
    fn permitted_block_lists_groups_in_department_order() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let mut doc = Document::default();
        let mut c = composer(&mut doc);
        draw_blocks(&mut c, BlockLayout::Sequential, &[], &approved);
        drop(c);

        let texts = texts(&doc);
        let cse = texts.iter().position(|t| t == "CSE:").unwrap();
        let frsh = texts.iter().position(|t| t == "Freshman:").unwrap();
        assert!(cse < frsh);
        assert!(texts.contains(&"22R01A0501".to_string()));
        assert!(!texts.iter().any(|t| t.starts_with("22R01A0502")));
        assert!(texts.contains(&"24R01A0002".to_string()));
        assert!(!texts.iter().any(|t| t.starts_with("24R01A0001")));
    }

    #[test]
    fn two_columns_share_a_top_when_they_fit() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let mut doc = Document::default();
        let mut c = composer(&mut doc);
        draw_blocks(
            &mut c,
            BlockLayout::TwoColumn,
            &letter.approvals_in_order(),
            &approved,
        );
        drop(c);

        let page = doc.ordered_pages().next().unwrap();
        let approvals = page.spans().find(|s| s.text == "Approval").unwrap();
        let permitted = page.spans().find(|s| s.text == "The").unwrap();
        assert_eq!(approvals.coords.1, permitted.coords.1);
        assert!(permitted.coords.0 > approvals.coords.0);
    }

    #[test]
    fn two_columns_fall_back_to_stacking_near_the_page_end() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let mut doc = Document::default();
        let mut c = composer(&mut doc);
        let room = c.cursor().remaining();
        c.advance(room - Pt(40.0));
        draw_blocks(
            &mut c,
            BlockLayout::TwoColumn,
            &letter.approvals_in_order(),
            &approved,
        );
        drop(c);

        let spans: Vec<_> = doc.ordered_pages().flat_map(|p| p.spans()).collect();
        let approvals = spans.iter().find(|s| s.text == "Approval").unwrap();
        let permitted = spans.iter().find(|s| s.text == "The").unwrap();
        assert_eq!(approvals.coords.0, permitted.coords.0);
        assert!(doc.page_order.len() > 1);
    }

    #[test]
    fn header_places_the_qr_code_in_the_top_right_corner() {
        let mut doc = Document::default();
        let qr = doc.add_image(Image::new_raster(image::DynamicImage::new_luma8(8, 8)));
        let mut c = composer(&mut doc);
        let config = DocumentConfig::default();
        draw_header(&mut c, &config, "Coding Club", qr, "14/03/2024");
        draw_opening(&mut c, &config, "Hackathon");
        drop(c);

        let (width, height) = pagesize::A4;
        let page = doc.ordered_pages().next().unwrap();
        let image = page
            .contents
            .iter()
            .find_map(|c| match c {
                crate::page::PageContents::Image(image) => Some(image),
                _ => None,
            })
            .unwrap();
        assert_eq!(image.position.x1, width - Pt(120.0));
        assert_eq!(image.position.y1, height - Pt(120.0));
        assert_eq!(image.position.width(), Pt(80.0));

        let title = page.spans().find(|s| s.text == "Coding Club").unwrap();
        assert_eq!(title.coords.1, height - Pt(70.0));
        let to = page.spans().find(|s| s.text == "To,").unwrap();
        assert!((*to.coords.1 - (*height - 150.0)).abs() < 1e-3);
        assert!(page.spans().any(|s| s.text == "Date: 14/03/2024"));
        assert!(page.spans().any(|s| s.text == "Hackathon"));
    }

    #[test]
    fn watermark_grid_covers_the_page() {
        let mut doc = Document::default();
        let fonts = FontSet::standard(&mut doc);
        let config = WatermarkConfig::default();
        let watermark = build_watermark(
            &mut doc,
            fonts.regular,
            "CMRIT-Coding Club",
            &config,
            pagesize::A4,
        );
        let (width, height) = pagesize::A4;
        let origins: Vec<_> = watermark
            .placements
            .iter()
            .map(|t| t.apply(Pt(0.0), Pt(0.0)))
            .collect();
        assert!(origins.iter().any(|(x, _)| *x <= Pt(0.0)));
        assert!(origins.iter().any(|(_, y)| *y >= height));
        assert!(origins.iter().any(|(x, _)| *x >= width - Pt(220.0)));
        assert_eq!(watermark.opacity, 0.3);
        assert_eq!(doc.form_xobjects[watermark.form].contents.len(), 1);
    }
}
