//! Layered error definitions
//!
//! Categorized by source: config / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert `validator` derive output, reporting the first failing field
    ///
    /// Nested struct errors are reported by their dotted path.
    pub fn from_validation(section: &str, errors: &validator::ValidationErrors) -> Self {
        let field = match first_failing_path(errors) {
            Some(path) => format!("{section}.{path}"),
            None => section.to_string(),
        };
        Self::config_validation(field, errors.to_string())
    }
}

/// Dotted path to the first failing field, in key order
fn first_failing_path(errors: &validator::ValidationErrors) -> Option<String> {
    use validator::ValidationErrorsKind;

    let mut keys: Vec<_> = errors.errors().keys().collect();
    keys.sort();
    let name = keys.first()?;

    let nested = match errors.errors().get(*name)? {
        ValidationErrorsKind::Field(_) => None,
        ValidationErrorsKind::Struct(inner) => first_failing_path(inner),
        ValidationErrorsKind::List(items) => items
            .iter()
            .next()
            .map(|(index, inner)| match first_failing_path(inner) {
                Some(path) => format!("{index}.{path}"),
                None => index.to_string(),
            }),
    };

    Some(match nested {
        Some(path) => format!("{name}.{path}"),
        None => name.to_string(),
    })
}
