/// Errors surfaced while reading or validating a [`crate::config::ConfigMap`].
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required config key: {key}")]
    Missing { key: String },

    #[error("config key {key} has the wrong type: expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("config key {key} failed validation: {reason}")]
    Invalid { key: String, reason: String },
}
