use permit_pdf::layout::{break_lines, position_line, width_of_text, Alignment, Measured};
use permit_pdf::{Font, Pt, StandardFace};

const TEXT: &str = "Students of the coding club request permission to host an \
    overnight hackathon in the main auditorium with faculty supervision and \
    access to the computing laboratories throughout the weekend";

fn measured(font: &Font, size: Pt) -> Vec<Measured<&'static str>> {
    let space = width_of_text(" ", font, size);
    TEXT.split_whitespace()
        .map(|word| Measured {
            item: word,
            width: width_of_text(word, font, size),
            space,
        })
        .collect()
}

#[test]
fn justified_lines_fill_the_width_except_the_last() {
    let font = Font::standard(StandardFace::Helvetica);
    let size = Pt(12.0);
    let width = Pt(250.0);
    let left = Pt(50.0);
    let lines = break_lines(measured(&font, size), width);
    assert!(lines.len() > 2);

    for (i, line) in lines.iter().enumerate() {
        let last = i == lines.len() - 1;
        let xs = position_line(line, Alignment::Justify, last, left, width);
        let end = *xs.last().unwrap() + line.last().unwrap().width;

        if last {
            for (pair, x) in line.windows(2).zip(xs.windows(2)) {
                let gap = x[1] - x[0] - pair[0].width;
                assert!((*gap - *pair[0].space).abs() < 1e-3);
            }
            assert!(end <= left + width);
        } else {
            assert!((*end - *(left + width)).abs() < 1e-3, "line {i} ends at {end}");
        }
    }
}

#[test]
fn lines_never_exceed_the_width() {
    let font = Font::standard(StandardFace::HelveticaBold);
    let size = Pt(10.0);
    for width in [Pt(80.0), Pt(150.0), Pt(400.0)] {
        for line in break_lines(measured(&font, size), width) {
            let xs = position_line(&line, Alignment::Left, false, Pt(0.0), width);
            let end = *xs.last().unwrap() + line.last().unwrap().width;
            assert!(end <= width || line.len() == 1, "{end} > {width}");
        }
    }
}

#[test]
fn centred_and_right_aligned_lines_share_their_slack() {
    let font = Font::standard(StandardFace::Helvetica);
    let size = Pt(12.0);
    let width = Pt(300.0);
    let line = &break_lines(measured(&font, size), width)[0];

    let left = position_line(line, Alignment::Left, false, Pt(0.0), width);
    let centre = position_line(line, Alignment::Center, false, Pt(0.0), width);
    let right = position_line(line, Alignment::Right, false, Pt(0.0), width);
    let end = *left.last().unwrap() + line.last().unwrap().width;

    assert_eq!(left[0], Pt(0.0));
    assert!((*centre[0] - *(width - end) / 2.0).abs() < 1e-3);
    assert!((*right[0] - *(width - end)).abs() < 1e-3);
}
