//! The merger: staging records + the tenant's mapping snapshot → canonical
//! catalog products and the dirty set.
//!
//! The merger never touches storage. The caller supplies the current
//! mapping snapshot through [`MappingLookup`] and persists the returned
//! mappings and product bodies, which keeps the read-merge-write transaction
//! boundary (and the serialization of concurrent imports of the same
//! external record) entirely in the orchestrator. Racing creates of the same
//! new key both derive the same deterministic product id, and field-level
//! divergence between two simultaneous writers resolves last-write-wins.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use menucat_core::{
    CatalogProduct, MappingMethod, MergeState, ProductMapping, RecordError, StagingProduct,
};

use crate::identity::{mapping_id, product_id};

/// Read-only view of the tenant's persisted `(source_type, external_id)`
/// mapping table, pre-fetched by the orchestrator.
pub trait MappingLookup {
    fn lookup(&self, key: &str) -> Option<&ProductMapping>;
}

impl MappingLookup for HashMap<String, ProductMapping> {
    fn lookup(&self, key: &str) -> Option<&ProductMapping> {
        self.get(key)
    }
}

/// Outcome of merging one staging batch.
///
/// `mappings` holds only newly created identity mappings; `products` holds
/// exactly one catalog product body per resolved product id — records later
/// in the batch fold into the earlier body field-wise, with `external_refs`
/// unioned. Persisting both is the caller's responsibility. Persistence must
/// treat `external_refs` as a grow-only map and `first_imported_at` as
/// keep-oldest when upserting over an existing product document.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub success: bool,
    pub new_products: usize,
    pub updated_products: usize,
    pub unchanged_products: usize,
    /// Catalog ids whose derived view must be rebuilt.
    pub dirty_product_ids: Vec<String>,
    pub mappings: Vec<ProductMapping>,
    pub products: Vec<CatalogProduct>,
    pub errors: Vec<RecordError>,
}

/// Merge a staging batch into the tenant's canonical catalog.
///
/// Each record resolves through its `"{source_type}:{external_id}"` key:
/// a hit in the snapshot (or in a mapping minted earlier in this same batch)
/// is an update under the existing product id; a miss creates the
/// deterministic id and a new `exact` mapping. Records that arrive already
/// `merged` are skipped and counted unchanged — that is the at-least-once
/// redelivery case. Per-record failures are collected and never abort the
/// batch.
#[must_use]
pub fn merge(
    staging_batch: &[StagingProduct],
    existing_mappings: &impl MappingLookup,
    tenant_id: &str,
) -> MergeResult {
    let now = Utc::now();
    let mut new_products = 0;
    let mut updated_products = 0;
    let mut unchanged_products = 0;
    let mut dirty_product_ids: Vec<String> = Vec::new();
    let mut mappings: Vec<ProductMapping> = Vec::new();
    let mut products: Vec<CatalogProduct> = Vec::new();
    let mut errors: Vec<RecordError> = Vec::new();
    // Mappings minted earlier in this batch, so an in-batch duplicate key
    // classifies as an update instead of a second create.
    let mut batch_mappings: HashMap<String, String> = HashMap::new();
    // Position of each emitted body, so two records resolving to the same
    // product id fold into one body instead of emitting a second one.
    let mut body_index: HashMap<String, usize> = HashMap::new();

    for staging in staging_batch {
        if staging.tenant_id != tenant_id {
            errors.push(RecordError::new(
                staging.external_id.clone(),
                format!(
                    "staging record belongs to tenant {}, not {tenant_id}",
                    staging.tenant_id
                ),
            ));
            continue;
        }
        if staging.name.trim().is_empty() {
            errors.push(RecordError::new(
                staging.external_id.clone(),
                "staging record has an empty name",
            ));
            continue;
        }
        if staging.merge_state == MergeState::Merged {
            unchanged_products += 1;
            continue;
        }

        let key = staging.mapping_key();
        let resolved_product_id = existing_mappings
            .lookup(&key)
            .map(|mapping| mapping.product_id.clone())
            .or_else(|| batch_mappings.get(&key).cloned());

        let pid = match resolved_product_id {
            Some(existing_id) => {
                updated_products += 1;
                existing_id
            }
            None => {
                let pid = product_id(tenant_id, &staging.external_id);
                mappings.push(ProductMapping {
                    id: mapping_id(staging.source_type.as_str(), &staging.external_id),
                    tenant_id: tenant_id.to_string(),
                    source_type: staging.source_type,
                    external_id: staging.external_id.clone(),
                    product_id: pid.clone(),
                    // Key-based matching is exact; staging confidence only
                    // reflects field completeness, so the mapping itself is
                    // fully trusted.
                    confidence: 1.0,
                    method: MappingMethod::Exact,
                    created_at: now,
                    updated_at: now,
                });
                batch_mappings.insert(key, pid.clone());
                new_products += 1;
                pid
            }
        };

        match body_index.get(&pid) {
            Some(&idx) => {
                // Later record wins field-wise, but the refs accumulated so
                // far (e.g. the same external id seen from another source)
                // must survive the overwrite.
                let prior = &mut products[idx];
                let mut external_refs = std::mem::take(&mut prior.external_refs);
                external_refs.insert(staging.mapping_key(), true);
                let first_imported_at = prior.first_imported_at;
                *prior = build_catalog_product(pid.clone(), staging, tenant_id);
                prior.external_refs = external_refs;
                prior.first_imported_at = first_imported_at;
            }
            None => {
                body_index.insert(pid.clone(), products.len());
                products.push(build_catalog_product(pid.clone(), staging, tenant_id));
            }
        }
        if !dirty_product_ids.contains(&pid) {
            dirty_product_ids.push(pid);
        }
    }

    tracing::debug!(
        tenant = %tenant_id,
        total = staging_batch.len(),
        new = new_products,
        updated = updated_products,
        unchanged = unchanged_products,
        failed = errors.len(),
        "merged staging batch"
    );

    MergeResult {
        success: errors.is_empty(),
        new_products,
        updated_products,
        unchanged_products,
        dirty_product_ids,
        mappings,
        products,
        errors,
    }
}

/// Regenerate the canonical product body from a staging record. The same
/// function serves creates and updates; only the id provenance differs.
fn build_catalog_product(
    id: String,
    staging: &StagingProduct,
    tenant_id: &str,
) -> CatalogProduct {
    let now = Utc::now();
    let mut external_refs = BTreeMap::new();
    external_refs.insert(staging.mapping_key(), true);

    CatalogProduct {
        id,
        tenant_id: tenant_id.to_string(),
        name: staging.name.clone(),
        brand_name: staging.brand_name.clone(),
        category: staging.category,
        subcategory: staging.subcategory.clone(),
        strain_type: staging.strain_type.clone(),
        description: staging.description.clone(),
        potency: staging.potency,
        price: staging.price,
        images: staging.images.clone(),
        effects: staging.effects.clone(),
        external_refs,
        is_active: true,
        // Publication is an editorial decision outside the pipeline.
        is_published: false,
        first_imported_at: now,
        last_imported_at: now,
    }
}
