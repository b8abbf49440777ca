//! Shared domain types for the menucat import pipeline: closed category and
//! source vocabulary, staging/catalog/mapping/view documents, and env-driven
//! orchestrator configuration.

pub mod app_config;
pub mod category;
pub mod config;
pub mod error;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use category::{Category, PotencyUnit, SourceType};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use types::{
    CatalogProduct, MappingMethod, MergeState, ParseDiagnostics, Potency, PotencyValue,
    ProductImage, ProductMapping, PublicProductView, RecordError, StagingProduct,
};
