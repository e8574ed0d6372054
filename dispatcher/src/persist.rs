use std::path::Path;

use messages::SectionMap;
use serde_json::json;
use tracing::warn;

use crate::config::StorageConfig;

/// Writes `sections.json` (the full map) and `part_16.json` (the
/// specification alone) to the configured data directory, pretty-printed
/// UTF-8, overwriting on each upload.
///
/// Best-effort: any I/O failure is logged and swallowed rather than failing
/// the dispatch (spec.md §4.3 step 2, §9 "best-effort persistence").
pub async fn persist_best_effort(storage: &StorageConfig, parts: &SectionMap) {
    if let Err(err) = persist(storage, parts).await {
        warn!(error = %err, "failed to persist sliced sections (best-effort, ignored)");
    }
}

async fn persist(storage: &StorageConfig, parts: &SectionMap) -> std::io::Result<()> {
    let dir = Path::new(&storage.data_dir);
    tokio::fs::create_dir_all(dir).await?;

    let sections_map: serde_json::Map<String, serde_json::Value> =
        parts.iter().map(|(key, value)| (key, json!(value))).collect();
    let sections_json = serde_json::to_string_pretty(&sections_map)?;
    tokio::fs::write(dir.join(&storage.sections_file_name), sections_json).await?;

    let part_16 = json!({ "part_16": parts.specification() });
    let part_16_json = serde_json::to_string_pretty(&part_16)?;
    tokio::fs::write(dir.join(&storage.part_16_file_name), part_16_json).await?;

    Ok(())
}
