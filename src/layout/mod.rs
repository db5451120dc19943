//! Text measurement and line layout.
//!
//! These are the building blocks the letter composer flows text with:
//!
//! - [`width_of_text`](crate::layout::width_of_text) measures a string, substituting a
//!   placeholder for glyphs the font cannot encode so measuring never fails
//! - [`wrap_text`](crate::layout::wrap_text) greedily splits plain text into lines
//! - [`break_lines`](crate::layout::break_lines) and
//!   [`position_line`](crate::layout::position_line) pack arbitrary measured words into
//!   lines and place them according to an [`Alignment`](crate::layout::Alignment),
//!   stretching inter-word gaps for justified text
//!
//! # Example
//!
//! ```
//! use permit_pdf::{Font, StandardFace, Pt};
//! use permit_pdf::layout::wrap_text;
//!
//! let font = Font::standard(StandardFace::Helvetica);
//! let lines = wrap_text("CSE: 22R01A0501, 22R01A0502", &font, Pt(10.0), Pt(120.0));
//! assert_eq!(lines.len(), 2);
//! ```

mod margins;
mod text;

pub use margins::*;
pub use text::*;
