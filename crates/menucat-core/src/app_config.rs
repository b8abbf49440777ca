use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime configuration for orchestrators built around the pipeline.
///
/// The pipeline stages themselves take everything as explicit arguments;
/// this only configures the surrounding file layout and batch limits.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Directory where import artifacts (staging, products, views, mapping
    /// snapshots, seen-hash ledger) are read and written.
    pub data_dir: PathBuf,
    /// ISO 4217 code stamped on views when a feed carries no currency.
    pub default_currency: String,
    /// Hard cap on raw records accepted per import batch.
    pub max_batch_records: usize,
}
