//! Error types for itemgraph-translate
//!
//! Fatal errors abort the whole run. Recoverable findings are collected as
//! [`Diagnostic`]s and reported alongside the translated output.

use itemgraph_store::StorageError;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for translation runs
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A field that must hold exactly one resolvable entry holds `observed`
    #[error("Schema invariant violated: item '{item_id}' field '{field}' must resolve to exactly one entry, found {observed}")]
    SchemaInvariantViolation {
        item_id: String,
        field: String,
        observed: usize,
    },

    /// Two traversal routes to the same relationship disagree
    #[error("Inconsistent derivation for item '{item_id}' field '{field}': '{first}' vs '{second}'")]
    InconsistentDerivation {
        item_id: String,
        field: String,
        first: String,
        second: String,
    },

    /// A required reference points at an item that does not exist
    #[error("Item '{item_id}' field '{field}' references missing item '{ref_id}'")]
    MissingRequiredItem {
        item_id: String,
        field: String,
        ref_id: String,
    },

    /// Source lookup or sink failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Class/field mapping error
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Worker pool could not be built
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl TranslateError {
    pub fn singleton(item_id: &str, field: &str, observed: usize) -> Self {
        TranslateError::SchemaInvariantViolation {
            item_id: item_id.to_string(),
            field: field.to_string(),
            observed,
        }
    }

    pub fn inconsistent(
        item_id: &str,
        field: &str,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        TranslateError::InconsistentDerivation {
            item_id: item_id.to_string(),
            field: field.to_string(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn missing_item(item_id: &str, field: &str, ref_id: &str) -> Self {
        TranslateError::MissingRequiredItem {
            item_id: item_id.to_string(),
            field: field.to_string(),
            ref_id: ref_id.to_string(),
        }
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        TranslateError::Mapping(msg.into())
    }

    /// Whether the error describes a defect in the source graph rather than
    /// in storage, configuration or the environment
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            TranslateError::SchemaInvariantViolation { .. }
                | TranslateError::InconsistentDerivation { .. }
                | TranslateError::MissingRequiredItem { .. }
        )
    }

    /// Source identifier the error is about, when there is one
    pub fn item_id(&self) -> Option<&str> {
        match self {
            TranslateError::SchemaInvariantViolation { item_id, .. }
            | TranslateError::InconsistentDerivation { item_id, .. }
            | TranslateError::MissingRequiredItem { item_id, .. } => Some(item_id),
            _ => None,
        }
    }

    /// Field name the error is about, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            TranslateError::SchemaInvariantViolation { field, .. }
            | TranslateError::InconsistentDerivation { field, .. }
            | TranslateError::MissingRequiredItem { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for translation
pub type Result<T> = std::result::Result<T, TranslateError>;

/// Recoverable finding recorded during translation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An optional lookup was absent; the target field was omitted
    MissingOptionalAttribute { item_id: String, field: String },
}

impl Diagnostic {
    pub fn missing(item_id: &str, field: &str) -> Self {
        Diagnostic::MissingOptionalAttribute {
            item_id: item_id.to_string(),
            field: field.to_string(),
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            Diagnostic::MissingOptionalAttribute { item_id, .. } => item_id,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingOptionalAttribute { item_id, field } => {
                write!(f, "item '{}' has no optional '{}'", item_id, field)
            }
        }
    }
}
