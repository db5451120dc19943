use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling or serializing a document
#[derive(Error, Debug)]
pub enum PDFError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error("page is listed in the page order but missing from the document")]
    PageMissing,
}

/// Errors raised while flattening or encrypting a finished document
#[derive(Error, Debug)]
pub enum ProtectionError {
    #[error("failed to process document structure: {0}")]
    Document(#[from] lopdf::Error),

    #[error("scratch file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch `{tool}`: {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` exited with {status}: {stderr}")]
    ToolFailed {
        tool: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`{tool}` did not finish within {timeout:?}")]
    Timeout { tool: PathBuf, timeout: Duration },

    #[error("`{tool}` produced an empty document")]
    EmptyOutput { tool: PathBuf },
}

/// Inputs rejected before any rendering work begins
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("letter {0} not found")]
    NotFound(String),

    #[error("letter {id} is {status}, only approved letters can be generated")]
    NotApproved { id: String, status: String },

    #[error("letter field `{0}` is empty")]
    MissingField(&'static str),

    #[error("roll number `{roll_number}` in group `{group}` was never submitted")]
    UnknownRollNumber { group: String, roll_number: String },

    #[error("invalid verification url `{0}`")]
    VerificationUrl(String),
}

/// Any failure of the generation pipeline. Each is fatal to the current request.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to render document: {0}")]
    Render(#[from] PDFError),

    #[error("failed to encode verification QR code: {0}")]
    QrCode(#[from] qrcode::types::QrError),

    #[error("failed to protect document: {0}")]
    Protection(#[from] ProtectionError),

    #[error("failed to store document: {0}")]
    Store(#[source] std::io::Error),
}
