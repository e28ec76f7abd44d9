pub mod cli;
pub mod export;
pub mod extract;
pub mod normalize;
pub mod table;
pub mod types;
pub mod utils;
pub mod xml;

use anyhow::{Context, Result};
use std::fs;
use types::ExtractConfig;

/// Locate the export, extract every workout of the configured activity and
/// write them as CSV. Returns the number of rows written.
///
/// Nothing is written unless extraction succeeds for the whole document.
pub fn run(config: &ExtractConfig) -> Result<usize> {
    let handle = export::open_export(&config.export)?;
    let xml_path = handle.xml_path();

    let bytes = fs::read(xml_path).with_context(|| format!("reading {}", xml_path.display()))?;
    dlog!("read export bytes={}", bytes.len());

    let records = extract::extract_from_xml(&bytes, config.activity)
        .with_context(|| format!("extracting workouts from {}", xml_path.display()))?;

    match utils::start_date_span(&records) {
        Some((first, last)) => tracing::info!(
            activity = %config.activity,
            workouts = records.len(),
            first = %first.date_naive(),
            last = %last.date_naive(),
            "workouts extracted"
        ),
        None => tracing::info!(
            activity = %config.activity,
            workouts = records.len(),
            "workouts extracted"
        ),
    }

    table::write_table_file(&config.output, config.activity, &records)?;
    Ok(records.len())
}
