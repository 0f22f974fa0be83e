use thiserror::Error;

/// Errors raised while loading process configuration.
///
/// Configuration problems fail fast at startup — nothing downstream should
/// have to cope with a half-configured process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
