use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the MobilityGraph library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only ingestion and request-validation problems surface here. Failures that
/// happen while routing (unknown endpoints, unreachable stops) are returned as
/// [`crate::routing::RouteFailure`] values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the dataset location")]
    ProjectDirsUnavailable,

    /// Raised when the dataset matches neither the tabular nor the triple layout.
    #[error("unsupported dataset schema; expected Stops or Triples tables")]
    UnsupportedSchema,

    /// Raised when a request carries an unknown mode filter or weight metric.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Raised when a stop identifier or name could not be found in the dataset.
    #[error("unknown stop: {name}{}", format_suggestions(.suggestions))]
    UnknownStop {
        name: String,
        suggestions: Vec<String>,
    },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stop_lists_suggestions() {
        let err = Error::UnknownStop {
            name: "Blok N".to_string(),
            suggestions: vec!["Blok M".to_string(), "Blok A".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown stop: Blok N. Did you mean one of: 'Blok M', 'Blok A'?"
        );
    }

    #[test]
    fn unknown_stop_without_suggestions_is_bare() {
        let err = Error::UnknownStop {
            name: "Nowhere".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "unknown stop: Nowhere");
    }
}
