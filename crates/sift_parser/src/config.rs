//! Run configuration files.

use crate::{DocumentFormat, Result, from_str, load_file};
use serde::{Deserialize, Serialize};
use sift_core::{Config, Message};
use std::path::Path;
use tracing::debug;

/// Run configuration as written in a config file.
///
/// ```yaml
/// lang: de
/// message: "Ungültige Eingabe: {received}"
/// abort_early: false
/// abort_pipe_early: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Message language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Message template used for every issue of a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Stop the whole run at the first issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_early: Option<bool>,

    /// Stop each pipe at its first issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_pipe_early: Option<bool>,
}

impl ConfigFile {
    /// Converts into a run config. The message is read as a template.
    pub fn into_config(self) -> Config {
        Config {
            lang: self.lang,
            message: self.message.map(Message::template),
            abort_early: self.abort_early,
            abort_pipe_early: self.abort_pipe_early,
            registry: None,
            defer_messages: None,
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        file.into_config()
    }
}

/// Parse a run configuration in the given format.
pub fn parse_config(content: &str, format: DocumentFormat) -> Result<Config> {
    let file: ConfigFile = from_str(content, format)?;
    Ok(file.into_config())
}

/// Load a run configuration from a file with automatic format detection.
pub fn load_config(path: &Path) -> Result<Config> {
    let file: ConfigFile = load_file(path)?;
    debug!("Loaded run configuration from {}", path.display());
    Ok(file.into_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
lang: de
abort_pipe_early: true
"#;
        let config = parse_config(yaml, DocumentFormat::Yaml).expect("Failed to parse config");
        assert_eq!(config.lang.as_deref(), Some("de"));
        assert!(config.is_abort_pipe_early());
        assert!(!config.is_abort_early());
        assert!(config.message.is_none());
    }

    #[test]
    fn test_parse_config_toml_with_message() {
        let toml = r#"
message = "Bad input: {received}"
abort_early = true
"#;
        let config = parse_config(toml, DocumentFormat::Toml).expect("Failed to parse config");
        assert!(config.is_abort_early());
        assert!(config.message.is_some());
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let result = parse_config(r#"{"abort": true}"#, DocumentFormat::Json);
        assert!(matches!(result.unwrap_err(), ParserError::JsonError(_)));
    }

    #[test]
    fn test_config_file_round_trip() {
        let file = ConfigFile {
            lang: Some("en".to_string()),
            abort_early: Some(true),
            ..ConfigFile::default()
        };
        let yaml = serde_yaml_ng::to_string(&file).expect("Failed to serialize");
        let parsed: ConfigFile = from_str(&yaml, DocumentFormat::Yaml).expect("Failed to parse");
        assert_eq!(parsed, file);
    }
}
