//! Error types for the rotation engine.
//!
//! Load-time failures (`Config`, `Catalog`) are fatal and must stop start-up.
//! Everything else is produced at runtime and is contained by the engine:
//! logged, reported to the operator, or answered with a fallback.

use thiserror::Error;

/// Enumeration of possible rotation errors.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Invalid or missing configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing catalog, list or settings file
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A map group with no maps was asked for a map
    #[error("Map group '{0}' has no maps")]
    EmptyGroup(String),

    #[error("Nothing to select from: {0}")]
    EmptySelection(String),

    /// A write to the rotation state was rejected; state is unchanged
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// An operator referenced an unknown map, group, mode or setting
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RotationError::EmptyGroup("mg_active".to_string());
        assert_eq!(err.to_string(), "Map group 'mg_active' has no maps");

        let err = RotationError::NotFound("setting 'ff'".to_string());
        assert_eq!(err.to_string(), "Not found: setting 'ff'");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(RotationError::from(io).to_string(), "IO error: denied");
    }
}
