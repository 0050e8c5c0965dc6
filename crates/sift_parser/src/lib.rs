//! Loading of validation inputs, run configuration and message catalogs.
//!
//! Documents in JSON, YAML or TOML are decoded into [`Value`]s ready to be
//! validated. The same formats carry run configuration ([`ConfigFile`]) and
//! message catalogs ([`MessageCatalog`]).
//!
//! # Example
//!
//! ```rust
//! use sift_parser::parse_yaml;
//! use sift_core::Value;
//!
//! let yaml = r#"
//! name: user_events
//! owner: analytics-team
//! retention_days: 30
//! "#;
//!
//! let document = parse_yaml(yaml).expect("Failed to parse document");
//! assert_eq!(document.get("retention_days"), Some(&Value::from(30)));
//! ```

mod catalog;
mod config;

pub use catalog::*;
pub use config::*;

use serde::de::DeserializeOwned;
use sift_core::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading documents.
#[derive(Debug, Error)]
pub enum ParserError {
    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Deserializes `content` in the given format.
pub fn from_str<T: DeserializeOwned>(content: &str, format: DocumentFormat) -> Result<T> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        DocumentFormat::Toml => {
            toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
    }
}

/// Parse a document from a JSON string.
pub fn parse_json(content: &str) -> Result<Value> {
    from_str(content, DocumentFormat::Json)
}

/// Parse a document from a YAML string.
pub fn parse_yaml(content: &str) -> Result<Value> {
    from_str(content, DocumentFormat::Yaml)
}

/// Parse a document from a TOML string.
///
/// # Example
///
/// ```rust
/// use sift_parser::parse_toml;
/// use sift_core::Value;
///
/// let toml = r#"
/// name = "my_dataset"
///
/// [limits]
/// max_rows = 1000
/// "#;
///
/// let document = parse_toml(toml).unwrap();
/// let limits = document.get("limits").unwrap();
/// assert_eq!(limits.get("max_rows"), Some(&Value::from(1000)));
/// ```
pub fn parse_toml(content: &str) -> Result<Value> {
    from_str(content, DocumentFormat::Toml)
}

/// Parse a document in the given format.
pub fn parse_str(content: &str, format: DocumentFormat) -> Result<Value> {
    from_str(content, format)
}

/// Detect the document format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.json` → `DocumentFormat::Json`
/// * `.yaml`, `.yml` → `DocumentFormat::Yaml`
/// * `.toml` → `DocumentFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DocumentFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "json" => Ok(DocumentFormat::Json),
        "yaml" | "yml" => Ok(DocumentFormat::Yaml),
        "toml" => Ok(DocumentFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Reads and deserializes a file, detecting its format from the extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!("Loading {:?} document from {}", format, path.display());
    from_str(&content, format)
}

/// Parse a document from a file with automatic format detection.
///
/// ```no_run
/// use sift_parser::parse_file;
/// use std::path::Path;
///
/// let document = parse_file(Path::new("fixtures/signup.json")).unwrap();
/// println!("Loaded document: {document}");
/// ```
pub fn parse_file(path: &Path) -> Result<Value> {
    load_file(path)
}
