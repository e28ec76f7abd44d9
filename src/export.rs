use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

pub const EXPORT_XML: &str = "export.xml";

/// Handle that keeps a tempdir alive if we extracted a ZIP.
pub struct ExportHandle {
    xml: PathBuf,
    _tmp: Option<TempDir>,
}

impl ExportHandle {
    pub fn xml_path(&self) -> &Path {
        &self.xml
    }
}

/// Accepts either:
/// - an `.xml` file (usually `export.xml`)
/// - a directory containing `export.xml` somewhere below it
/// - the `export.zip` produced by the Health app, from which only
///   `export.xml` is extracted to a temp dir
pub fn open_export(path: &Path) -> Result<ExportHandle> {
    if path.is_dir() {
        let xml = find_export_xml(path)?;
        tracing::info!(path = %xml.display(), "using export directory");
        return Ok(ExportHandle { xml, _tmp: None });
    }

    if !path.is_file() {
        bail!("Export path does not exist: {}", path.display());
    }

    if has_extension(path, "xml") {
        tracing::info!(path = %path.display(), "using export file");
        return Ok(ExportHandle {
            xml: path.to_path_buf(),
            _tmp: None,
        });
    }

    if !has_extension(path, "zip") {
        bail!(
            "Export path must be an .xml file, a .zip file or a directory: {}",
            path.display()
        );
    }

    extract_export_xml(path)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case(ext))
}

fn find_export_xml(dir: &Path) -> Result<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|e| e.file_type().is_file() && e.file_name() == OsStr::new(EXPORT_XML))
        .map(walkdir::DirEntry::into_path)
        .with_context(|| format!("no {EXPORT_XML} found under {}", dir.display()))
}

fn extract_export_xml(path: &Path) -> Result<ExportHandle> {
    let zip_file = File::open(path).with_context(|| format!("opening zip: {}", path.display()))?;
    let mut zip =
        ZipArchive::new(zip_file).with_context(|| format!("reading zip: {}", path.display()))?;

    let tmp = tempfile::tempdir().context("creating tempdir for export zip")?;
    tracing::info!(
        zip = %path.display(),
        tmp = %tmp.path().display(),
        entries = zip.len(),
        "extracting export.xml from zip"
    );

    for i in 0..zip.len() {
        let mut f = zip.by_index(i).context("reading zip entry")?;
        if f.is_dir() {
            continue;
        }

        // Prevent Zip Slip / path traversal.
        let Some(rel) = f.enclosed_name() else {
            tracing::warn!(name = %f.name(), "skipping unsafe zip entry path");
            continue;
        };
        if rel.file_name() != Some(OsStr::new(EXPORT_XML)) {
            continue;
        }

        let out_path = tmp.path().join(EXPORT_XML);
        let mut out = File::create(&out_path)
            .with_context(|| format!("creating file: {}", out_path.display()))?;
        io::copy(&mut f, &mut out)
            .with_context(|| format!("extracting {}: {}", rel.display(), out_path.display()))?;

        tracing::info!(entry = %rel.display(), "export ready");
        return Ok(ExportHandle {
            xml: out_path,
            _tmp: Some(tmp),
        });
    }

    bail!("ZIP does not contain {EXPORT_XML}: {}", path.display())
}
