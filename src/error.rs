use thiserror::Error;

/// Failures that can occur while resolving bundles or broadcasting a switch.
///
/// Only [`TranslationError::ConsumerUpdate`] ever leaves the resolver; the
/// other variants are absorbed by the fallback chain and only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// Network failure or non-success response status
    #[error("Failed to fetch translations for '{code}': {reason}")]
    Fetch { code: String, reason: String },

    /// Payload was not a well-formed bundle
    #[error("Malformed translation bundle for '{code}': {reason}")]
    Parse { code: String, reason: String },

    /// No embedded bundle exists for a code
    #[error("No embedded fallback bundle for '{0}'")]
    NoFallback(String),

    /// A registered consumer failed to apply a language change
    #[error("Consumer '{consumer}' failed to update to '{code}': {reason}")]
    ConsumerUpdate {
        consumer: String,
        code: String,
        reason: String,
    },
}

impl TranslationError {
    pub fn fetch(code: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(code: &str, reason: impl ToString) -> Self {
        Self::Parse {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }
}
