use crate::types::{Activity, WorkoutRecord};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[cfg(unix)]
const CSV_MODE: u32 = 0o644;

/// Write the header for `activity` followed by one row per record.
///
/// Absent fields are empty cells.
pub fn write_table<W: Write>(out: W, activity: Activity, records: &[WorkoutRecord]) -> Result<()> {
    let columns = activity.columns();
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(&columns).context("writing CSV header")?;
    for (i, r) in records.iter().enumerate() {
        wtr.write_record(columns.iter().map(|c| r.field(c).unwrap_or("")))
            .with_context(|| format!("writing CSV row {}", i + 1))?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Write the table to `path`, replacing it only once every row is written.
///
/// On Unix the file ends up `0644` like a freshly created CSV, not the
/// owner-only mode of the temp file it is staged in.
pub fn write_table_file(path: &Path, activity: Activity, records: &[WorkoutRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    write_table(&mut tmp, activity, records)
        .with_context(|| format!("writing {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(CSV_MODE))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("saving {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = records.len(), "table written");
    Ok(())
}
