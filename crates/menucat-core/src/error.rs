use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid source type: {0}")]
    InvalidSourceType(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
