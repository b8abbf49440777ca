//! Pipeline document types: staging records, identity mappings, canonical
//! catalog products, and the derived public view.
//!
//! All of these serialize camelCase because they are persisted as JSON
//! documents and consumed by storefront read paths; field names are part of
//! the stored contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, PotencyUnit, SourceType};

/// A potency measurement as parsed from a feed, e.g. `22 percent` or `100 mg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotencyValue {
    pub value: f64,
    pub unit: PotencyUnit,
}

/// THC/CBD measurements for one product. Either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Potency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thc: Option<PotencyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbd: Option<PotencyValue>,
}

impl Potency {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thc.is_none() && self.cbd.is_none()
    }
}

/// A product image. `position` 0 is the primary image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub position: u32,
}

/// Per-record diagnostics attached by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    /// Human-readable notes about missing optional data. Never affects
    /// parse success.
    pub warnings: Vec<String>,
    /// Completeness confidence in `[0, 1]`, rounded to two decimals.
    pub confidence: f64,
}

/// Whether a staging record has been consumed by the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeState {
    Pending,
    Merged,
}

/// A parsed-but-not-yet-reconciled product observation from one import run.
///
/// Staging records are immutable once produced: a new import run writes new
/// records rather than mutating old ones, so they double as an audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingProduct {
    pub tenant_id: String,
    /// Identifier of the concrete feed/location this batch came from.
    pub source_id: String,
    pub source_type: SourceType,
    /// Import batch this record belongs to.
    pub import_id: Uuid,
    /// Source-scoped identifier of the raw record.
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub potency: Potency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub images: Vec<ProductImage>,
    pub effects: Vec<String>,
    pub parse_diagnostics: ParseDiagnostics,
    pub merge_state: MergeState,
    pub created_at: DateTime<Utc>,
}

impl StagingProduct {
    /// Identity-resolution key: `"{source_type}:{external_id}"`.
    #[must_use]
    pub fn mapping_key(&self) -> String {
        format!("{}:{}", self.source_type, self.external_id)
    }
}

/// How an identity mapping was established. Key-based matching is the only
/// implemented method; the enum leaves room for future fuzzy strategies
/// without a stored-document migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMethod {
    Exact,
}

/// The durable link between an external source's record key and the
/// canonical product it represents.
///
/// At most one mapping exists per `(source_type, external_id)` pair per
/// tenant; it is the sole source of truth for "have we seen this external
/// record before". Mappings are created once and never deleted by the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMapping {
    pub id: String,
    pub tenant_id: String,
    pub source_type: SourceType,
    pub external_id: String,
    /// The resolved canonical product id.
    pub product_id: String,
    pub confidence: f64,
    pub method: MappingMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductMapping {
    /// Lookup key this mapping is stored under.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_type, self.external_id)
    }
}

/// The tenant's single, long-lived representation of a product, addressed by
/// a deterministic identity.
///
/// `id` is a pure function of `(tenant_id, external_id)`, so re-importing
/// the same external record always resolves here regardless of data changes.
/// `external_refs` accumulates every `"{source_type}:{external_id}"` that has
/// ever produced this identity and only grows; persistence must merge it
/// map-wise (and keep the oldest `first_imported_at`) when upserting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub potency: Potency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Ordered; first entry is the primary image.
    pub images: Vec<ProductImage>,
    pub effects: Vec<String>,
    /// Set-like, grow-only: `"{source_type}:{external_id}" -> true`.
    pub external_refs: BTreeMap<String, bool>,
    pub is_active: bool,
    pub is_published: bool,
    pub first_imported_at: DateTime<Utc>,
    pub last_imported_at: DateTime<Utc>,
}

impl CatalogProduct {
    /// URL of the primary image, if any.
    #[must_use]
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    /// Whether the given `"{source_type}:{external_id}"` ref has ever fed
    /// this product.
    #[must_use]
    pub fn has_external_ref(&self, key: &str) -> bool {
        self.external_refs.get(key).copied().unwrap_or(false)
    }
}

/// Read-optimized projection of a [`CatalogProduct`] for storefront/query
/// paths. Disposable: rebuildable at any time from its source product and
/// never edited directly.
///
/// Potency is flattened to percent-denominated numbers only; mg-denominated
/// values are intentionally omitted from this shape (storefront cards render
/// percentages, and mixing units in one column misleads sorting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProductView {
    pub product_id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thc_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbd_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// ISO 4217 currency code, stamped by the view builder.
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub image_urls: Vec<String>,
    pub effects: Vec<String>,
    pub is_active: bool,
    pub view_built_at: DateTime<Utc>,
    /// `last_imported_at` of the source product, for staleness checks.
    pub source_product_updated_at: DateTime<Utc>,
}

/// A record-scoped failure from any pipeline stage: the offending record's
/// identifier (external id for parse/merge, product id for view builds) and
/// a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub identifier: String,
    pub error: String,
}

impl RecordError {
    #[must_use]
    pub fn new(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            error: error.into(),
        }
    }
}
