//! Failures of `TabsConfig` loading, saving and validation.
//!
//! `load`/`save` return `anyhow::Result` with one of these inside; match on
//! it with `err.downcast_ref::<ConfigError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing `config.yaml` failed.
    #[error("chat-tabs config file could not be accessed: {0}")]
    Io(#[from] std::io::Error),

    /// `config.yaml` is not valid YAML for `TabsConfig`.
    #[error("chat-tabs config is not valid YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A setting the persistence layer cannot use (names the field).
    #[error("invalid chat-tabs setting: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_message_names_field() {
        let err = ConfigError::Validation("storage_key must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid chat-tabs setting: storage_key must not be empty"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = ConfigError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.source().is_some());
    }
}
