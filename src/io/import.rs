use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::CorresponsalService;

/// Outcome of the legacy inventory migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyImportOutcome {
    /// Counts merged into the sales store; the source file was consumed.
    Imported { products: usize, units: i64 },
    /// The source was absent or already consumed. Not an error: the
    /// migration is a one-time step and re-running it is a no-op.
    SourceMissing,
}

/// One-time migration from the old inventory tracker, which stored a flat
/// JSON map of product name -> units sold. Merges the counts and removes
/// the source file, so the import is idempotent: a second run finds no
/// source and does nothing.
///
/// Entries whose value is not an integer are skipped rather than failing
/// the whole migration.
pub async fn import_legacy_inventory(
    service: &mut CorresponsalService,
    path: &Path,
) -> Result<LegacyImportOutcome> {
    if !path.exists() {
        return Ok(LegacyImportOutcome::SourceMissing);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read legacy inventory at {}", path.display()))?;
    let parsed: HashMap<String, serde_json::Value> =
        serde_json::from_str(&raw).context("Legacy inventory is not a JSON object")?;

    let counts: HashMap<String, i64> = parsed
        .into_iter()
        .filter_map(|(product, value)| {
            let count = value.as_i64()?;
            (count > 0).then_some((product, count))
        })
        .collect();

    let products = counts.len();
    let units = counts.values().sum();
    service
        .merge_sales(&counts)
        .await
        .context("Failed to merge legacy inventory counts")?;

    // Consume the source so a re-run is a no-op.
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove consumed source {}", path.display()))?;

    Ok(LegacyImportOutcome::Imported { products, units })
}
