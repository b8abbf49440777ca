//! Catalog reconciliation for menucat: deterministic identity and content
//! hashing, the staging→catalog merger, and the public-view builder.

pub mod error;
pub mod identity;
pub mod merge;
pub mod views;

pub use error::CatalogError;
pub use identity::{content_hash, content_hash_of, is_duplicate_import, mapping_id, product_id};
pub use merge::{merge, MappingLookup, MergeResult};
pub use views::{build_views, ViewBuildResult};
