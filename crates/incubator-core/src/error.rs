//! Error types for incubator-core.

use std::path::PathBuf;

use thiserror::Error;

use incubator_types::ValidationError;

use crate::lifecycle::Phase;

/// The species catalog could not be read or parsed.
///
/// Callers usually degrade to an empty catalog, see
/// [`Catalog::load_or_empty`](crate::catalog::Catalog::load_or_empty).
#[derive(Debug, Error)]
#[error("Species catalog unavailable at {}: {reason}", path.display())]
pub struct CatalogUnavailable {
    /// Path that was tried.
    pub path: PathBuf,
    /// What went wrong.
    pub reason: String,
}

/// Errors that can occur while driving an incubation cycle.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The species catalog is missing or unreadable.
    #[error(transparent)]
    Catalog(#[from] CatalogUnavailable),

    /// The persistence layer failed.
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A cycle is already running; only one may be active at a time.
    #[error("An incubation of {species} is already active (started {started_at})")]
    AlreadyActive {
        /// Species of the running cycle.
        species: String,
        /// Start timestamp of the running cycle.
        started_at: String,
    },

    /// The operation needs an active cycle and there is none.
    #[error("No active incubation")]
    NoActiveCycle,

    /// The requested species is not in the catalog.
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    /// The cycle is not in the phase this operation belongs to.
    #[error("Expected {expected}, but the cycle is {phase}")]
    NotAwaiting {
        /// The phase the operation needs.
        expected: &'static str,
        /// The phase the cycle is actually in.
        phase: Phase,
    },

    /// An input or record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The sensor log could not be parsed.
    #[error("Failed to read sensor log {}: {source}", path.display())]
    SensorLog {
        /// Path of the log file.
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a persistence-layer error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Create a wrong-phase error.
    pub fn not_awaiting(expected: &'static str, phase: Phase) -> Self {
        Self::NotAwaiting { expected, phase }
    }
}

/// Result type alias using incubator-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownSpecies("Avestruz".to_string());
        assert_eq!(err.to_string(), "Unknown species: Avestruz");

        let err = Error::NoActiveCycle;
        assert_eq!(err.to_string(), "No active incubation");

        let err = Error::AlreadyActive {
            species: "Galinha".to_string(),
            started_at: "2024-01-01 00:00:00".to_string(),
        };
        assert!(err.to_string().contains("Galinha"));
        assert!(err.to_string().contains("2024-01-01 00:00:00"));
    }

    #[test]
    fn test_not_awaiting_names_both_phases() {
        let err = Error::not_awaiting("awaiting hatch count", Phase::NoActiveCycle);
        let msg = err.to_string();
        assert!(msg.contains("awaiting hatch count"));
        assert!(msg.contains("no active cycle"));
    }

    #[test]
    fn test_catalog_unavailable_display() {
        let err = CatalogUnavailable {
            path: PathBuf::from("aves.json"),
            reason: "file not found".to_string(),
        };
        assert!(err.to_string().contains("aves.json"));

        let err: Error = err.into();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: Error = ValidationError::NoEggs.into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "egg count must be at least 1");
    }

    #[test]
    fn test_storage_keeps_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::storage(io_err);
        assert!(err.to_string().contains("read-only"));
        assert!(err.source().is_some());
    }
}
