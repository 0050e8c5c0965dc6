//! Message catalogs.
//!
//! A catalog holds the message templates of one language. Installing it
//! registers every template on a [`MessageRegistry`]; uninstalling removes
//! them again.

use crate::{DocumentFormat, Result, from_str, load_file};
use serde::{Deserialize, Serialize};
use sift_core::{Message, MessageRegistry};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Message templates of one language.
///
/// ```yaml
/// lang: de
/// schema: "Ungültiger Typ: {expected} erwartet, {received} erhalten"
/// specific:
///   min_length: "Mindestens {requirement} Zeichen"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageCatalog {
    /// Language of the templates; absent for runs without a language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Template used when nothing more specific is registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,

    /// Template for schema issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Templates keyed by issue type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specific: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Registers every template of the catalog.
    pub fn install(&self, registry: &MessageRegistry) {
        let lang = self.lang.as_deref();
        if let Some(global) = &self.global {
            registry.set_global_message(Message::template(global.as_str()), lang);
        }
        if let Some(schema) = &self.schema {
            registry.set_schema_message(Message::template(schema.as_str()), lang);
        }
        for (issue_type, template) in &self.specific {
            registry.set_specific_message(issue_type, Message::template(template.as_str()), lang);
        }
        debug!(
            "Installed message catalog for {} ({} specific messages)",
            lang.unwrap_or("default language"),
            self.specific.len()
        );
    }

    /// Removes every template of the catalog.
    ///
    /// Messages for the same keys registered by someone else are removed too.
    pub fn uninstall(&self, registry: &MessageRegistry) {
        let lang = self.lang.as_deref();
        if self.global.is_some() {
            registry.delete_global_message(lang);
        }
        if self.schema.is_some() {
            registry.delete_schema_message(lang);
        }
        for issue_type in self.specific.keys() {
            registry.delete_specific_message(issue_type, lang);
        }
    }
}

/// Parse a message catalog in the given format.
pub fn parse_catalog(content: &str, format: DocumentFormat) -> Result<MessageCatalog> {
    from_str(content, format)
}

/// Load a message catalog from a file with automatic format detection.
pub fn load_catalog(path: &Path) -> Result<MessageCatalog> {
    let catalog: MessageCatalog = load_file(path)?;
    debug!("Loaded message catalog from {}", path.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"
lang: de
global: "Ungültig"
specific:
  min_length: "Mindestens {requirement} Zeichen"
  email: "Keine E-Mail: {received}"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(CATALOG, DocumentFormat::Yaml).expect("Failed to parse catalog");
        assert_eq!(catalog.lang.as_deref(), Some("de"));
        assert_eq!(catalog.global.as_deref(), Some("Ungültig"));
        assert!(catalog.schema.is_none());
        assert_eq!(
            catalog.specific.keys().collect::<Vec<_>>(),
            vec!["email", "min_length"]
        );
    }

    #[test]
    fn test_install_and_uninstall() {
        let catalog = parse_catalog(CATALOG, DocumentFormat::Yaml).expect("Failed to parse catalog");
        let registry = MessageRegistry::new();

        catalog.install(&registry);
        assert!(registry.global_message(Some("de")).is_some());
        assert!(registry.specific_message("email", Some("de")).is_some());
        assert!(registry.specific_message("email", None).is_none());

        catalog.uninstall(&registry);
        assert!(registry.global_message(Some("de")).is_none());
        assert!(registry.specific_message("min_length", Some("de")).is_none());
    }

    #[test]
    fn test_parse_catalog_toml() {
        let toml = r#"
schema = "Wrong type"

[specific]
max_length = "Too long"
"#;
        let catalog = parse_catalog(toml, DocumentFormat::Toml).expect("Failed to parse catalog");
        assert!(catalog.lang.is_none());
        assert_eq!(catalog.schema.as_deref(), Some("Wrong type"));
        assert_eq!(catalog.specific.len(), 1);
    }
}
