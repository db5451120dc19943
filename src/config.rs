//! Generator configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock letter layout.

use crate::layout::Margins;
use crate::pagesize::PaperFormat;
use crate::units::Pt;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub document: DocumentConfig,
    pub fonts: FontsConfig,
    pub watermark: WatermarkConfig,
    pub blocks: BlocksConfig,
    pub protection: ProtectionConfig,
    /// Base URL of the public verification page, or a template containing `{id}`
    pub verification_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            document: DocumentConfig::default(),
            fonts: FontsConfig::default(),
            watermark: WatermarkConfig::default(),
            blocks: BlocksConfig::default(),
            protection: ProtectionConfig::default(),
            verification_url: "http://localhost:3000/verify-letter/{id}".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.document;
        if *d.body_font_size <= 0.0 {
            return Err(ConfigError::Validation(
                "document.body_font_size must be positive".to_string(),
            ));
        }
        if d.line_height < 1.0 {
            return Err(ConfigError::Validation(
                "document.line_height must be at least 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err(ConfigError::Validation(
                "watermark.opacity must be between 0 and 1".to_string(),
            ));
        }
        if *self.watermark.column_spacing <= 0.0 || *self.watermark.row_spacing <= 0.0 {
            return Err(ConfigError::Validation(
                "watermark spacing must be positive".to_string(),
            ));
        }
        if StrftimeItems::new(&d.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "document.date_format `{}` is not a valid strftime pattern",
                d.date_format
            )));
        }
        if ![128, 256].contains(&self.protection.key_length) {
            return Err(ConfigError::Validation(format!(
                "protection.key_length must be 128 or 256, not {}",
                self.protection.key_length
            )));
        }
        Ok(())
    }
}

/// Page geometry, fixed wording and metadata of the letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub page: PaperFormat,
    pub margins: Margins,
    /// Baseline of the first recipient line on the first page, measured from the top edge
    pub first_line_offset: Pt,
    pub producer: String,
    pub creator: String,
    pub keywords: String,
    /// Prefix of the watermark text
    pub issuer: String,
    pub recipient: Vec<String>,
    pub salutation: String,
    pub closing: String,
    /// [chrono::format::strftime] pattern for the date under the QR code
    pub date_format: String,
    pub body_font_size: Pt,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub list_indent: Pt,
    pub bullet_gap: Pt,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            page: PaperFormat::A4,
            margins: Margins::all(Pt(50.0)),
            first_line_offset: Pt(150.0),
            producer: "CMRIT Clubs Portal".to_string(),
            creator: "CMRIT Clubs Portal".to_string(),
            keywords: "permission letter, club activity".to_string(),
            issuer: "CMRIT".to_string(),
            recipient: vec![
                "To,".to_string(),
                "The Director,".to_string(),
                "CMR Institute of Technology".to_string(),
                "Medchal".to_string(),
            ],
            salutation: "Respected Sir,".to_string(),
            closing: "Yours Sincerely,".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            body_font_size: Pt(12.0),
            line_height: 1.4,
            list_indent: Pt(20.0),
            bullet_gap: Pt(15.0),
        }
    }
}

/// Optional TrueType faces; the built-in Helvetica family is used for any left unset
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub font_size: Pt,
    /// 0.0 is black, 1.0 is white
    pub grey: f32,
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees
    pub angle: f32,
    pub column_spacing: Pt,
    pub row_spacing: Pt,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        WatermarkConfig {
            enabled: true,
            font_size: Pt(50.0),
            grey: 0.75,
            opacity: 0.3,
            angle: -45.0,
            column_spacing: Pt(220.0),
            row_spacing: Pt(160.0),
        }
    }
}

/// How the approval-status and permitted-students blocks are arranged
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockLayout {
    /// One block after the other, paginating as needed
    #[default]
    Sequential,
    /// Side by side when both fit on the current page, sequential otherwise
    TwoColumn,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksConfig {
    pub layout: BlockLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    pub enabled: bool,
    /// The encryption tool, looked up on `PATH` unless absolute
    pub tool: PathBuf,
    /// Directory of shared libraries bundled with the tool
    pub library_dir: Option<PathBuf>,
    /// AES key length in bits
    pub key_length: u16,
    pub timeout_secs: u64,
    /// Where scratch files are created; the system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        ProtectionConfig {
            enabled: true,
            tool: PathBuf::from("qpdf"),
            library_dir: None,
            key_length: 256,
            timeout_secs: 30,
            scratch_dir: None,
        }
    }
}

impl ProtectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
