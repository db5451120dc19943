mod common;

use chrono::{TimeZone, Utc};
use common::{all_text, form_placements, letter, lines, pages, text_runs};
use lopdf::Document;
use permit_pdf::layout::width_of_text;
use permit_pdf::{
    render_letter, ApprovalStatus, ApprovedRollNumbers, Font, GeneratorConfig, LetterRecord, Pt,
    ReviewerRole, StandardFace,
};
use std::collections::HashMap;

const URL: &str = "https://clubs.example.org/verify-letter/letter-7";

fn render_with(config: &GeneratorConfig, letter: &LetterRecord) -> Document {
    let approved = ApprovedRollNumbers::from_letter(letter);
    let bytes = render_letter(
        config,
        letter,
        &approved,
        URL,
        Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap(),
    )
    .unwrap();
    Document::load_mem(&bytes).unwrap()
}

fn render(letter: &LetterRecord) -> Document {
    render_with(&GeneratorConfig::default(), letter)
}

fn long_body(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Paragraph {i}: the club requests the use of the seminar hall and \
                 the attached laboratories for the duration of the event, including \
                 setup on the previous evening.</p>"
            )
        })
        .collect()
}

#[test]
fn bold_runs_share_a_line_with_regular_text() {
    let doc = render(&letter("<p>Hello <strong>world</strong></p>"));
    let page = pages(&doc)[0];
    let runs = text_runs(&doc, page);

    let hello = runs.iter().find(|r| r.text == "Hello").unwrap();
    let world = runs.iter().find(|r| r.text == "world").unwrap();
    assert_eq!(hello.font, "F0");
    assert_eq!(world.font, "F1");
    assert_eq!(hello.y, world.y);
    assert!(world.x > hello.x);
}

#[test]
fn mixed_runs_advance_by_one_line_height() {
    let baseline_of = |body: &str, word: &str| {
        let doc = render(&letter(body));
        let runs = text_runs(&doc, pages(&doc)[0]);
        runs.iter().find(|r| r.text == word).unwrap().y
    };

    // a bold run costs no extra height before the next block
    let mixed = baseline_of("<p>Hello <strong>world</strong></p><p>next</p>", "next");
    let plain = baseline_of("<p>Hello world</p><p>next</p>", "next");
    assert!((mixed - plain).abs() < 0.01, "{mixed} != {plain}");

    let doc = render(&letter("<p>Hello <strong>world</strong><br>next</p>"));
    let runs = text_runs(&doc, pages(&doc)[0]);
    let hello = runs.iter().find(|r| r.text == "Hello").unwrap();
    let next = runs.iter().find(|r| r.text == "next").unwrap();
    let line_height = 12.0 * 1.4;
    assert!(
        (hello.y - next.y - line_height).abs() < 0.01,
        "dropped {} instead of {line_height}",
        hello.y - next.y
    );
}

#[test]
fn deeply_nested_markup_still_renders() {
    let n = 10_000;
    let body = format!("{}x{}", "<span>".repeat(n), "</span>".repeat(n));
    let doc = render(&letter(&body));
    assert!(text_runs(&doc, pages(&doc)[0]).iter().any(|r| r.text == "x"));
}

#[test]
fn ordered_items_are_numbered_and_indented() {
    let doc = render(&letter("<ol><li>first</li><li>second</li><li>third</li></ol>"));
    let runs = text_runs(&doc, pages(&doc)[0]);

    let markers: Vec<_> = runs
        .iter()
        .filter(|r| ["1.", "2.", "3."].contains(&r.text.as_str()))
        .collect();
    let labels: Vec<&str> = markers.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(labels, vec!["1.", "2.", "3."]);
    for marker in &markers {
        assert!((marker.x - 70.0).abs() < 0.01, "{marker:?}");
    }
    assert!(markers[0].y > markers[1].y && markers[1].y > markers[2].y);
}

#[test]
fn plain_text_never_overflows_the_content_width() {
    let doc = render(&letter(&long_body(12)));
    let font = Font::standard(StandardFace::Helvetica);
    let right_edge = 595.28 - 50.0;

    for page in pages(&doc) {
        for run in text_runs(&doc, page) {
            if run.font != "F0" || run.size != 12.0 {
                continue;
            }
            let end = run.x + *width_of_text(&run.text, &font, Pt(run.size));
            assert!(end <= right_edge + 0.01, "{run:?} ends at {end}");
        }
    }
}

#[test]
fn watermark_is_identical_on_every_page() {
    let doc = render(&letter(&long_body(60)));
    let pages = pages(&doc);
    assert!(pages.len() >= 3, "only {} pages", pages.len());

    let first = form_placements(&doc, pages[0]);
    assert!(!first.is_empty());
    for page in &pages[1..] {
        assert_eq!(form_placements(&doc, *page), first);
    }
}

#[test]
fn pages_without_watermark_draw_no_forms() {
    let mut config = GeneratorConfig::default();
    config.watermark.enabled = false;
    let doc = render_with(&config, &letter(&long_body(30)));
    for page in pages(&doc) {
        assert!(form_placements(&doc, page).is_empty());
    }
}

#[test]
fn only_approved_roll_numbers_are_printed() {
    let doc = render(&letter("<p>Body</p>"));
    let text = all_text(&doc);
    assert!(text.contains("22R01A0501"));
    assert!(!text.contains("22R01A0502"));
    assert!(!text.contains("24R01A0001"));
}

fn approval_lines(doc: &Document) -> Vec<String> {
    lines(doc)
        .into_iter()
        .filter(|text| {
            ["APPROVED", "PENDING", "REJECTED"]
                .iter()
                .any(|status| text.ends_with(&format!(": {status}")))
        })
        .collect()
}

#[test]
fn approvals_render_in_canonical_order() {
    let decisions = [
        (ReviewerRole::EceHod, ApprovalStatus::Approved),
        (ReviewerRole::Tpo, ApprovalStatus::Pending),
        (ReviewerRole::Director, ApprovalStatus::Approved),
        (ReviewerRole::Dsaa, ApprovalStatus::Rejected),
    ];

    let mut forward = letter("<p>Body</p>");
    forward.approvals = decisions.iter().copied().collect::<HashMap<_, _>>();
    let mut backward = letter("<p>Body</p>");
    backward.approvals = decisions.iter().rev().copied().collect::<HashMap<_, _>>();

    let lines = approval_lines(&render(&forward));
    assert_eq!(lines, approval_lines(&render(&backward)));
    assert_eq!(
        lines,
        vec![
            "DIRECTOR: APPROVED",
            "DSAA: REJECTED",
            "TPO: PENDING",
            "ECE HOD: APPROVED"
        ]
    );
}

#[test]
fn header_carries_club_name_and_qr_code() {
    let doc = render(&letter("<p>Body</p>"));
    let page = pages(&doc)[0];
    let runs = text_runs(&doc, page);
    let club = runs.iter().find(|r| r.text == "Robotics Club").unwrap();
    assert_eq!(club.font, "F1");
    assert_eq!(club.size, 18.0);

    let images = doc
        .objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .filter(|s| {
            s.dict
                .get(b"Subtype")
                .and_then(|v| v.as_name())
                .is_ok_and(|n| n == b"Image")
        })
        .count();
    assert_eq!(images, 1, "the QR code is embedded once");
}
