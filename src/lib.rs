mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

/// Utility functions and structures to layout objects (most text) on pages
pub mod layout;

mod page;
pub use page::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

mod error;
pub use error::*;

pub(crate) mod content;

mod form_xobject;
pub use form_xobject::*;

mod transform;
pub use transform::*;

pub mod pagesize;

pub mod markup;

pub(crate) mod compose;
pub(crate) mod decorations;
pub(crate) mod qr;

mod render;
pub use render::render_letter;

pub mod config;
pub use config::GeneratorConfig;

pub mod letter;
pub use letter::{ApprovalStatus, ApprovedRollNumbers, LetterRecord, PersistedDocument, ReviewerRole};

pub mod protect;

pub mod integrity;

pub mod store;

pub mod generator;
pub use generator::{GeneratedDocument, GenerationOutcome, GenerationRequest, LetterGenerator};

pub mod verification;
pub use verification::VerificationReport;

/// Re-export PDF-writer functionality, mostly for custom [pdf_writer::Content] generation
pub use pdf_writer;
