//! Error types for the localization pipeline and the localized store.
//!
//! Provider failures live in `providers` and never escape the fallback
//! orchestrator. Exhausting every provider is not an error at all: it is
//! logged and the source text is kept.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single localization operation.
#[derive(Debug, Error)]
pub enum LocalizeError {
    /// The requested language is not in the registry.
    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),
}

/// Errors raised while loading or publishing a localized store.
///
/// Any of these at load time means the store cannot be trusted and the
/// serving layer must not start.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed document for '{language}' at {path}: {reason}")]
    MalformedDocument {
        language: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Store has no document for default language '{0}'")]
    MissingDefault(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_message() {
        let err = LocalizeError::UnknownLanguage("xx".to_string());
        assert_eq!(err.to_string(), "Unknown language code: 'xx'");
    }

    #[test]
    fn test_malformed_document_message_names_language() {
        let err = StoreError::MalformedDocument {
            language: "fr".to_string(),
            path: PathBuf::from("store/fr.json"),
            reason: "top level is not an object".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("'fr'"));
        assert!(message.contains("store/fr.json"));
    }
}
