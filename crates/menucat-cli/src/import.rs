use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use menucat_catalog::{build_views, content_hash, is_duplicate_import, merge};
use menucat_core::{AppConfig, ProductMapping};
use menucat_ingest::{decode_feed, ensure_batch_within_limit, parse_batch, ImportContext};
use uuid::Uuid;

use crate::ImportArgs;

/// Drive one feed file through all three pipeline stages and persist the
/// artifacts: `staging.json`, `products.json`, `views.json`, the updated
/// mapping snapshot, and the seen-hash ledger.
///
/// This function owns everything the pipeline deliberately does not:
/// reading the snapshot before the merge, writing results after it, and
/// refusing byte-duplicate payloads.
pub fn run(args: &ImportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let out_dir = args.out.clone().unwrap_or_else(|| config.data_dir.clone());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let payload = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read feed payload {}", args.input.display()))?;

    // Duplicate-payload guard: identical content (key order ignored) has
    // already been imported, so re-running it is a no-op by definition.
    let payload_value: serde_json::Value =
        serde_json::from_str(&payload).context("feed payload is not valid JSON")?;
    let payload_hash = content_hash(&payload_value);
    let ledger_path = out_dir.join("seen_hashes.json");
    let mut seen_hashes = load_seen_hashes(&ledger_path)?;
    if is_duplicate_import(&payload_hash, &seen_hashes) {
        anyhow::bail!(
            "payload {} was already imported (content hash {payload_hash})",
            args.input.display()
        );
    }

    let raw_batch = decode_feed(args.format, &payload)?;
    ensure_batch_within_limit(raw_batch.len(), config.max_batch_records)?;

    let ctx = ImportContext {
        tenant_id: args.tenant.clone(),
        source_id: args.source_id.clone(),
        source_type: args.format,
        import_id: Uuid::new_v4(),
    };
    tracing::info!(
        tenant = %ctx.tenant_id,
        source = %ctx.source_type,
        import_id = %ctx.import_id,
        records = raw_batch.len(),
        "starting import"
    );

    let parsed = parse_batch(raw_batch, &ctx);
    tracing::info!(
        parsed = parsed.parsed_records,
        failed = parsed.error_records,
        "parse stage complete"
    );

    let mappings_path = args
        .mappings
        .clone()
        .unwrap_or_else(|| config.data_dir.join(format!("mappings-{}.json", args.tenant)));
    let mut mappings = load_mappings(&mappings_path)?;

    let merged = merge(&parsed.staging_docs, &mappings, &args.tenant);
    tracing::info!(
        new = merged.new_products,
        updated = merged.updated_products,
        unchanged = merged.unchanged_products,
        dirty = merged.dirty_product_ids.len(),
        "merge stage complete"
    );

    let views = build_views(&merged.products, &config.default_currency);
    tracing::info!(built = views.views_built, "view stage complete");

    write_json(&out_dir.join("staging.json"), &parsed.staging_docs)?;
    write_json(&out_dir.join("products.json"), &merged.products)?;
    write_json(&out_dir.join("views.json"), &views.views)?;

    for mapping in &merged.mappings {
        mappings.insert(mapping.key(), mapping.clone());
    }
    write_json(&mappings_path, &mappings)?;

    seen_hashes.insert(payload_hash);
    write_json(&ledger_path, &seen_hashes.iter().collect::<Vec<_>>())?;

    let stage_errors =
        parsed.errors.len() + merged.errors.len() + views.errors.len();
    if stage_errors > 0 {
        for error in parsed
            .errors
            .iter()
            .chain(&merged.errors)
            .chain(&views.errors)
        {
            tracing::warn!(identifier = %error.identifier, error = %error.error, "record failed");
        }
        anyhow::bail!("import finished with {stage_errors} record-level failures");
    }

    tracing::info!(
        products = merged.products.len(),
        views = views.views_built,
        "import complete"
    );
    Ok(())
}

fn load_mappings(path: &Path) -> anyhow::Result<HashMap<String, ProductMapping>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read mapping snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("mapping snapshot {} is corrupt", path.display()))
}

fn load_seen_hashes(path: &Path) -> anyhow::Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seen-hash ledger {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("seen-hash ledger {} is corrupt", path.display()))
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
