//! Letter bodies arrive as the HTML produced by the portal's rich-text editor:
//! paragraphs, three heading levels, nested lists, line breaks and inline
//! bold/italic/strikethrough/highlight/link runs, with `text-align` on blocks.

mod parser;
mod style;

pub use parser::*;
pub use style::*;
