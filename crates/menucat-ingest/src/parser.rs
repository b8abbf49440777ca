//! Batch parser: canonical raw records → staging products with diagnostics.
//!
//! This is the first pipeline stage. It is a pure function over the batch —
//! no I/O, no shared state — so independent batches and tenants can run in
//! parallel without coordination.

use chrono::Utc;
use menucat_core::{
    Category, MergeState, ParseDiagnostics, Potency, ProductImage, RecordError, SourceType,
    StagingProduct,
};
use uuid::Uuid;

use crate::error::IngestError;
use crate::normalize::{normalize_potency, raw_number_value};
use crate::sources::RawProductData;

/// Identifiers for the import run a batch belongs to.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub tenant_id: String,
    pub source_id: String,
    pub source_type: SourceType,
    pub import_id: Uuid,
}

/// Outcome of parsing one raw batch. `success` is exactly "no record
/// failed"; partial batches still carry every staging doc that did parse.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub success: bool,
    pub total_records: usize,
    pub parsed_records: usize,
    pub error_records: usize,
    pub staging_docs: Vec<StagingProduct>,
    pub errors: Vec<RecordError>,
}

/// Completeness-confidence weights. Presence of each field contributes its
/// weight; the weights sum to 1.0.
const WEIGHT_NAME: f64 = 0.20;
const WEIGHT_CATEGORY: f64 = 0.15;
const WEIGHT_PRICE: f64 = 0.15;
const WEIGHT_IMAGES: f64 = 0.10;
const WEIGHT_DESCRIPTION: f64 = 0.10;
const WEIGHT_THC: f64 = 0.10;
const WEIGHT_BRAND: f64 = 0.10;
const WEIGHT_EFFECTS: f64 = 0.10;

/// Guard a batch against the configured record cap before parsing.
///
/// # Errors
///
/// Returns [`IngestError::BatchTooLarge`] when `len > max`.
pub fn ensure_batch_within_limit(len: usize, max: usize) -> Result<(), IngestError> {
    if len > max {
        return Err(IngestError::BatchTooLarge { len, max });
    }
    Ok(())
}

/// Parse a batch of raw feed records into staging products.
///
/// Records missing `external_id` or `name` are rejected into the error list
/// (keyed `"unknown"` when the external id itself is absent); all other
/// data-quality problems degrade confidence or add warnings but never fail
/// the record. One bad record never aborts the rest of the batch.
#[must_use]
pub fn parse_batch(raw_batch: Vec<RawProductData>, ctx: &ImportContext) -> ParseResult {
    let total_records = raw_batch.len();
    let mut staging_docs = Vec::with_capacity(total_records);
    let mut errors = Vec::new();

    for raw in raw_batch {
        match parse_record(raw, ctx) {
            Ok(staging) => staging_docs.push(staging),
            Err(error) => errors.push(error),
        }
    }

    tracing::debug!(
        tenant = %ctx.tenant_id,
        source = %ctx.source_type,
        import_id = %ctx.import_id,
        total = total_records,
        parsed = staging_docs.len(),
        failed = errors.len(),
        "parsed raw batch"
    );

    ParseResult {
        success: errors.is_empty(),
        total_records,
        parsed_records: staging_docs.len(),
        error_records: errors.len(),
        staging_docs,
        errors,
    }
}

fn parse_record(raw: RawProductData, ctx: &ImportContext) -> Result<StagingProduct, RecordError> {
    if raw.external_id.trim().is_empty() {
        return Err(RecordError::new("unknown", "missing required field: externalId"));
    }
    if raw.name.trim().is_empty() {
        return Err(RecordError::new(
            raw.external_id.trim(),
            "missing required field: name",
        ));
    }

    let category = raw
        .category
        .as_deref()
        .and_then(Category::normalize);
    let potency = Potency {
        thc: normalize_potency(raw.thc.as_ref()),
        cbd: normalize_potency(raw.cbd.as_ref()),
    };
    let price = raw.price.as_ref().and_then(raw_number_value);
    let images = collect_images(raw.image_url.as_deref(), &raw.image_urls);

    let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
    let brand_name = non_blank(raw.brand_name);
    let description = non_blank(raw.description);
    let effects: Vec<String> = raw
        .effects
        .into_iter()
        .map(|effect| effect.trim().to_string())
        .filter(|effect| !effect.is_empty())
        .collect();

    let mut warnings = Vec::new();
    if category.is_none() {
        warnings.push("no category provided".to_string());
    }
    if price.is_none() {
        warnings.push("no price provided".to_string());
    }
    if images.is_empty() {
        warnings.push("no images provided".to_string());
    }

    let confidence = completeness_confidence(
        category.is_some(),
        price.is_some(),
        !images.is_empty(),
        description.is_some(),
        potency.thc.is_some(),
        brand_name.is_some(),
        !effects.is_empty(),
    );

    Ok(StagingProduct {
        tenant_id: ctx.tenant_id.clone(),
        source_id: ctx.source_id.clone(),
        source_type: ctx.source_type,
        import_id: ctx.import_id,
        external_id: raw.external_id.trim().to_string(),
        name: raw.name.trim().to_string(),
        brand_name,
        category,
        subcategory: non_blank(raw.subcategory),
        strain_type: non_blank(raw.strain_type),
        description,
        potency,
        price,
        images,
        effects,
        parse_diagnostics: ParseDiagnostics {
            warnings,
            confidence,
        },
        merge_state: MergeState::Pending,
        created_at: Utc::now(),
    })
}

/// Weighted presence sum over optional fields, rounded to two decimals.
/// Name always contributes: a record without one never reaches this point.
fn completeness_confidence(
    has_category: bool,
    has_price: bool,
    has_images: bool,
    has_description: bool,
    has_thc: bool,
    has_brand: bool,
    has_effects: bool,
) -> f64 {
    let mut confidence = WEIGHT_NAME;
    if has_category {
        confidence += WEIGHT_CATEGORY;
    }
    if has_price {
        confidence += WEIGHT_PRICE;
    }
    if has_images {
        confidence += WEIGHT_IMAGES;
    }
    if has_description {
        confidence += WEIGHT_DESCRIPTION;
    }
    if has_thc {
        confidence += WEIGHT_THC;
    }
    if has_brand {
        confidence += WEIGHT_BRAND;
    }
    if has_effects {
        confidence += WEIGHT_EFFECTS;
    }
    (confidence * 100.0).round() / 100.0
}

/// Merge the single-image and list forms into one ordered, deduplicated
/// image list; the first entry becomes the primary image.
fn collect_images(image_url: Option<&str>, image_urls: &[String]) -> Vec<ProductImage> {
    let mut urls: Vec<&str> = Vec::new();
    if let Some(url) = image_url {
        if !url.trim().is_empty() {
            urls.push(url.trim());
        }
    }
    for url in image_urls {
        let url = url.trim();
        if !url.is_empty() && !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls.into_iter()
        .enumerate()
        .map(|(idx, url)| ProductImage {
            url: url.to_string(),
            position: u32::try_from(idx).unwrap_or(u32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use menucat_core::PotencyUnit;

    use super::*;
    use crate::sources::RawNumber;

    fn ctx() -> ImportContext {
        ImportContext {
            tenant_id: "tenant-1".to_string(),
            source_id: "feed-1".to_string(),
            source_type: SourceType::Cannmenus,
            import_id: Uuid::new_v4(),
        }
    }

    fn minimal_raw(external_id: &str, name: &str) -> RawProductData {
        RawProductData {
            external_id: external_id.to_string(),
            name: name.to_string(),
            ..RawProductData::default()
        }
    }

    #[test]
    fn blue_dream_flower_parses_with_percent_thc() {
        let raw = RawProductData {
            category: Some("flowers".to_string()),
            thc: Some(RawNumber::Text("22%".to_string())),
            ..minimal_raw("e1", "Blue Dream")
        };
        let result = parse_batch(vec![raw], &ctx());
        assert!(result.success);
        assert_eq!(result.parsed_records, 1);
        assert_eq!(result.error_records, 0);

        let staging = &result.staging_docs[0];
        assert_eq!(staging.category, Some(Category::Flower));
        let thc = staging.potency.thc.unwrap();
        assert_eq!(thc.value, 22.0);
        assert_eq!(thc.unit, PotencyUnit::Percent);
        assert_eq!(staging.merge_state, MergeState::Pending);
    }

    #[test]
    fn missing_required_fields_reject_both_records() {
        let batch = vec![minimal_raw("", "X"), minimal_raw("e2", "")];
        let result = parse_batch(batch, &ctx());
        assert!(!result.success);
        assert_eq!(result.parsed_records, 0);
        assert_eq!(result.error_records, 2);
        assert_eq!(result.errors[0].identifier, "unknown");
        assert_eq!(result.errors[1].identifier, "e2");
    }

    #[test]
    fn whitespace_only_name_is_rejected() {
        let result = parse_batch(vec![minimal_raw("e1", "   ")], &ctx());
        assert_eq!(result.error_records, 1);
        assert!(result.errors[0].error.contains("name"));
    }

    #[test]
    fn one_bad_record_does_not_abort_the_batch() {
        let batch = vec![minimal_raw("e1", "Good"), minimal_raw("", "Bad")];
        let result = parse_batch(batch, &ctx());
        assert_eq!(result.total_records, 2);
        assert_eq!(result.parsed_records, 1);
        assert_eq!(result.error_records, 1);
        assert!(!result.success);
    }

    #[test]
    fn minimal_record_confidence_is_name_weight_only() {
        let result = parse_batch(vec![minimal_raw("e1", "X")], &ctx());
        let diag = &result.staging_docs[0].parse_diagnostics;
        assert_eq!(diag.confidence, 0.20);
        assert_eq!(
            diag.warnings,
            vec![
                "no category provided".to_string(),
                "no price provided".to_string(),
                "no images provided".to_string(),
            ]
        );
    }

    #[test]
    fn fully_populated_record_confidence_is_one() {
        let raw = RawProductData {
            brand_name: Some("Coastal".to_string()),
            category: Some("flower".to_string()),
            thc: Some(RawNumber::Num(22.0)),
            price: Some(RawNumber::Num(45.0)),
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            description: Some("Classic sativa.".to_string()),
            effects: vec!["happy".to_string()],
            ..minimal_raw("e1", "Blue Dream")
        };
        let result = parse_batch(vec![raw], &ctx());
        let diag = &result.staging_docs[0].parse_diagnostics;
        assert_eq!(diag.confidence, 1.0);
        assert!(diag.warnings.is_empty());
    }

    #[test]
    fn confidence_is_monotone_in_field_presence() {
        let without_brand = minimal_raw("e1", "X");
        let with_brand = RawProductData {
            brand_name: Some("Coastal".to_string()),
            ..minimal_raw("e1", "X")
        };
        let base = parse_batch(vec![without_brand], &ctx()).staging_docs[0]
            .parse_diagnostics
            .confidence;
        let richer = parse_batch(vec![with_brand], &ctx()).staging_docs[0]
            .parse_diagnostics
            .confidence;
        assert!(richer >= base);
    }

    #[test]
    fn unrecognized_category_becomes_other_not_warning() {
        let raw = RawProductData {
            category: Some("seeds".to_string()),
            ..minimal_raw("e1", "X")
        };
        let result = parse_batch(vec![raw], &ctx());
        let staging = &result.staging_docs[0];
        assert_eq!(staging.category, Some(Category::Other));
        assert!(!staging
            .parse_diagnostics
            .warnings
            .iter()
            .any(|w| w.contains("category")));
    }

    #[test]
    fn single_image_and_list_are_merged_without_duplicates() {
        let raw = RawProductData {
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            image_urls: vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
            ],
            ..minimal_raw("e1", "X")
        };
        let result = parse_batch(vec![raw], &ctx());
        let images = &result.staging_docs[0].images;
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://cdn.example.com/a.jpg");
        assert_eq!(images[0].position, 0);
        assert_eq!(images[1].position, 1);
    }

    #[test]
    fn mg_potency_detected_from_text() {
        let raw = RawProductData {
            thc: Some(RawNumber::Text("100mg".to_string())),
            ..minimal_raw("e1", "Gummies")
        };
        let result = parse_batch(vec![raw], &ctx());
        let thc = result.staging_docs[0].potency.thc.unwrap();
        assert_eq!(thc.value, 100.0);
        assert_eq!(thc.unit, PotencyUnit::Mg);
    }

    #[test]
    fn reparsing_the_same_input_is_identical_except_timestamps() {
        let raw = RawProductData {
            category: Some("flowers".to_string()),
            thc: Some(RawNumber::Text("22%".to_string())),
            price: Some(RawNumber::Num(45.0)),
            ..minimal_raw("e1", "Blue Dream")
        };
        let context = ctx();
        let mut first = parse_batch(vec![raw.clone()], &context)
            .staging_docs
            .remove(0);
        let second = parse_batch(vec![raw], &context).staging_docs.remove(0);
        first.created_at = second.created_at;
        assert_eq!(first, second);
    }

    #[test]
    fn batch_limit_guard() {
        assert!(ensure_batch_within_limit(10, 10).is_ok());
        let err = ensure_batch_within_limit(11, 10).unwrap_err();
        assert!(matches!(err, IngestError::BatchTooLarge { len: 11, max: 10 }));
    }

    #[test]
    fn blank_effects_are_dropped_and_never_score() {
        let raw = RawProductData {
            effects: vec![String::new(), "  ".to_string()],
            ..minimal_raw("e1", "X")
        };
        let result = parse_batch(vec![raw], &ctx());
        let staging = &result.staging_docs[0];
        assert!(staging.effects.is_empty());
        // Same confidence as a record that sent no effects at all.
        assert_eq!(staging.parse_diagnostics.confidence, 0.20);
    }

    #[test]
    fn effects_are_trimmed() {
        let raw = RawProductData {
            effects: vec![" happy ".to_string(), "relaxed".to_string()],
            ..minimal_raw("e1", "X")
        };
        let result = parse_batch(vec![raw], &ctx());
        let staging = &result.staging_docs[0];
        assert_eq!(staging.effects, vec!["happy".to_string(), "relaxed".to_string()]);
        assert!(staging.parse_diagnostics.confidence > 0.20);
    }

    #[test]
    fn external_id_and_name_are_trimmed() {
        let result = parse_batch(vec![minimal_raw(" e1 ", " Blue Dream ")], &ctx());
        let staging = &result.staging_docs[0];
        assert_eq!(staging.external_id, "e1");
        assert_eq!(staging.name, "Blue Dream");
    }
}
