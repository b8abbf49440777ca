//! The view builder: canonical catalog products → read-optimized public
//! views consumed by storefront and query paths.

use chrono::Utc;
use menucat_core::{CatalogProduct, PotencyUnit, PotencyValue, PublicProductView, RecordError};

/// Outcome of one view-build pass. Per-product failures are isolated;
/// `success` is exactly "no product failed to project".
#[derive(Debug, Clone)]
pub struct ViewBuildResult {
    pub success: bool,
    pub views_built: usize,
    pub views: Vec<PublicProductView>,
    pub errors: Vec<RecordError>,
}

/// Project catalog products into their public views.
///
/// Potency flattens to `thc_percent`/`cbd_percent` only when denominated in
/// percent; mg values are omitted from the view (see the note on
/// [`PublicProductView`]). The primary image is `images[0]`. Feeds carry no
/// currency, so every view is stamped with the caller's `currency` (an ISO
/// 4217 code, usually from `AppConfig::default_currency`). Side-effect-free:
/// persisting (and overwriting) the returned views is the caller's job.
#[must_use]
pub fn build_views(catalog_products: &[CatalogProduct], currency: &str) -> ViewBuildResult {
    let mut views = Vec::with_capacity(catalog_products.len());
    let mut errors = Vec::new();

    for product in catalog_products {
        match build_view(product, currency) {
            Ok(view) => views.push(view),
            Err(error) => errors.push(error),
        }
    }

    tracing::debug!(
        total = catalog_products.len(),
        built = views.len(),
        failed = errors.len(),
        "built public views"
    );

    ViewBuildResult {
        success: errors.is_empty(),
        views_built: views.len(),
        views,
        errors,
    }
}

fn build_view(product: &CatalogProduct, currency: &str) -> Result<PublicProductView, RecordError> {
    if product.name.trim().is_empty() {
        return Err(RecordError::new(
            product.id.clone(),
            "catalog product has an empty name",
        ));
    }

    Ok(PublicProductView {
        product_id: product.id.clone(),
        tenant_id: product.tenant_id.clone(),
        name: product.name.clone(),
        brand_name: product.brand_name.clone(),
        category: product.category,
        strain_type: product.strain_type.clone(),
        description: product.description.clone(),
        thc_percent: percent_only(product.potency.thc),
        cbd_percent: percent_only(product.potency.cbd),
        price: product.price,
        currency: currency.to_string(),
        image_url: product.primary_image_url().map(ToString::to_string),
        image_urls: product.images.iter().map(|image| image.url.clone()).collect(),
        effects: product.effects.clone(),
        is_active: product.is_active,
        view_built_at: Utc::now(),
        source_product_updated_at: product.last_imported_at,
    })
}

fn percent_only(value: Option<PotencyValue>) -> Option<f64> {
    match value {
        Some(PotencyValue {
            value,
            unit: PotencyUnit::Percent,
        }) => Some(value),
        _ => None,
    }
}
