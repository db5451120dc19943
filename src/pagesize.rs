//! Pre-defined page sizes for the paper formats letters are printed on.
//!
//! All sizes are provided in portrait orientation (width, height) where width ≤ height.

use crate::units::*;
use serde::{Deserialize, Serialize};

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

// north american sizes
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(14.0 * 72.0));

// iso a-series (converted from mm to points)
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));

/// A named paper format, as written in configuration files
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperFormat {
    pub fn size(&self) -> PageSize {
        match self {
            PaperFormat::A4 => A4,
            PaperFormat::A5 => A5,
            PaperFormat::Letter => LETTER,
            PaperFormat::Legal => LEGAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_the_expected_size_in_points() {
        assert!((*A4.0 - 595.28).abs() < 0.01);
        assert!((*A4.1 - 841.89).abs() < 0.01);
    }

    #[test]
    fn formats_map_to_portrait_sizes() {
        for format in [
            PaperFormat::A4,
            PaperFormat::A5,
            PaperFormat::Letter,
            PaperFormat::Legal,
        ] {
            let (w, h) = format.size();
            assert!(w <= h);
        }
    }
}
