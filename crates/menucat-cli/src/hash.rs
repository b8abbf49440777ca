use std::fs;

use anyhow::Context;
use menucat_catalog::content_hash;

use crate::HashArgs;

/// Print the canonical content hash of a JSON payload. Key order does not
/// affect the result, so this is safe for comparing re-exported feeds.
pub fn run(args: &HashArgs) -> anyhow::Result<()> {
    let payload = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&payload).context("payload is not valid JSON")?;
    println!("{}", content_hash(&value));
    Ok(())
}
