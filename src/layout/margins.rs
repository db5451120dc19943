use crate::units::Pt;
use serde::{Deserialize, Serialize};

/// Page margins. The composer keeps body text inside them, while the header
/// and QR code are placed relative to the page edges. A page's `ArtBox` is its
/// media box inset by its margins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create margins where all values are 0.0
    pub fn empty() -> Margins {
        Margins::all(Pt(0.0))
    }

    /// The same margins with the left edge pushed inwards, as when indenting list items
    pub fn indented(&self, indent: Pt) -> Margins {
        Margins {
            left: self.left + indent,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mm;

    #[test]
    fn margins_accept_any_length_unit() {
        let m = Margins::all(Mm(25.4));
        assert!((*m.left - 72.0).abs() < 1e-3);
    }

    #[test]
    fn indenting_only_moves_the_left_edge() {
        let m = Margins::all(Pt(50.0)).indented(Pt(20.0));
        assert_eq!(m, Margins::trbl(Pt(50.0), Pt(50.0), Pt(50.0), Pt(70.0)));
    }
}
