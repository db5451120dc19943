#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use permit_pdf::{ApprovalStatus, LetterRecord, ReviewerRole};
use std::collections::{BTreeMap, HashMap};

/// One `Tj` as drawn on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub font: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

pub fn letter(body: &str) -> LetterRecord {
    let mut approvals = HashMap::new();
    approvals.insert(ReviewerRole::Director, ApprovalStatus::Approved);
    approvals.insert(ReviewerRole::CseHod, ApprovalStatus::Approved);

    let mut roll_numbers_by_group = BTreeMap::new();
    roll_numbers_by_group.insert("cse".to_string(), "22R01A0501\n22R01A0502".to_string());
    roll_numbers_by_group.insert("frsh".to_string(), "24R01A0001".to_string());

    let mut cse = HashMap::new();
    cse.insert("22R01A0501".to_string(), ApprovalStatus::Approved);
    cse.insert("22R01A0502".to_string(), ApprovalStatus::Rejected);
    let mut roll_number_decisions = HashMap::new();
    roll_number_decisions.insert("cse".to_string(), cse);

    LetterRecord {
        id: "letter-7".into(),
        club_name: "Robotics Club".into(),
        subject: "Permission for Workshop".into(),
        sincerely: "R. Lead".into(),
        body: body.into(),
        date: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
        status: ApprovalStatus::Approved,
        approvals,
        roll_numbers_by_group,
        roll_number_decisions,
        generated: None,
    }
}

pub fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn operations(doc: &Document, page: ObjectId) -> Vec<lopdf::content::Operation> {
    let bytes = doc.get_page_content(page).unwrap();
    Content::decode(&bytes).unwrap().operations
}

fn number(object: &Object) -> f32 {
    object.as_float().unwrap()
}

/// Every text run on a page, in drawing order. Only single-byte fonts are decoded.
pub fn text_runs(doc: &Document, page: ObjectId) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let (mut font, mut size, mut x, mut y) = (String::new(), 0.0, 0.0, 0.0);
    for op in operations(doc, page) {
        match op.operator.as_str() {
            "Tf" => {
                font = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned();
                size = number(&op.operands[1]);
            }
            "Td" => {
                x = number(&op.operands[0]);
                y = number(&op.operands[1]);
            }
            "Tj" => {
                let bytes = op.operands[0].as_str().unwrap();
                runs.push(TextRun {
                    font: font.clone(),
                    size,
                    x,
                    y,
                    text: bytes.iter().map(|b| *b as char).collect(),
                });
            }
            _ => {}
        }
    }
    runs
}

/// All text on all pages, runs separated by spaces
pub fn all_text(doc: &Document) -> String {
    pages(doc)
        .into_iter()
        .flat_map(|page| text_runs(doc, page))
        .map(|run| run.text)
        .collect::<Vec<String>>()
        .join(" ")
}

/// The transform each form XObject is drawn with on a page
pub fn form_placements(doc: &Document, page: ObjectId) -> Vec<(String, Vec<f32>)> {
    let mut placements = Vec::new();
    let mut matrix = Vec::new();
    for op in operations(doc, page) {
        match op.operator.as_str() {
            "cm" => matrix = op.operands.iter().map(number).collect(),
            "Do" => {
                let name = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned();
                if name.starts_with('X') {
                    placements.push((name, matrix.clone()));
                }
            }
            _ => {}
        }
    }
    placements
}

/// Text lines of the whole document: consecutive runs sharing a baseline,
/// joined by single spaces
pub fn lines(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for page in pages(doc) {
        let mut current: Option<(f32, Vec<String>)> = None;
        for run in text_runs(doc, page) {
            match &mut current {
                Some((y, words)) if *y == run.y => words.push(run.text),
                _ => {
                    if let Some((_, words)) = current.take() {
                        lines.push(words.join(" "));
                    }
                    current = Some((run.y, vec![run.text]));
                }
            }
        }
        if let Some((_, words)) = current {
            lines.push(words.join(" "));
        }
    }
    lines
}
