use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use omnivore_core::{ConversionResult, FailureReport};
use serde_json::json;
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::persist::{AtomicFileWriter, PersistError};

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Adds `manifest.json` with checksums and the failure report.
    pub include_manifest: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            include_manifest: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("output path has no file name: {0}")]
    InvalidPath(String),
}

/// Writes the output set as a zip archive, filenames preserved exactly.
pub fn write_archive<W: Write + Seek>(
    writer: W,
    results: &[ConversionResult],
    failures: &FailureReport,
    options: &PackageOptions,
) -> Result<W, PackageError> {
    let mut zip = ZipWriter::new(writer);
    for result in results {
        // Images are already compressed.
        let method = if result.is_binary() {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        zip.start_file(
            result.filename.as_str(),
            FileOptions::default().compression_method(method),
        )?;
        zip.write_all(result.bytes())?;
    }
    if options.include_manifest {
        let manifest = build_manifest(results, failures);
        zip.start_file(
            MANIFEST_FILENAME,
            FileOptions::default().compression_method(CompressionMethod::Deflated),
        )?;
        zip.write_all(manifest.to_string().as_bytes())?;
    }
    Ok(zip.finish()?)
}

/// Builds the archive in memory and moves it into place atomically.
pub fn package_to_path(
    path: &Path,
    results: &[ConversionResult],
    failures: &FailureReport,
    options: &PackageOptions,
) -> Result<PathBuf, PackageError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PackageError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let buffer = write_archive(Cursor::new(Vec::new()), results, failures, options)?;
    let writer = AtomicFileWriter::new(dir);
    Ok(writer.write(filename, &buffer.into_inner())?)
}

pub fn build_manifest(results: &[ConversionResult], failures: &FailureReport) -> serde_json::Value {
    json!({
        "document_count": results.iter().filter(|r| !r.is_binary()).count(),
        "image_count": results.iter().filter(|r| r.is_binary()).count(),
        "files": results.iter().map(|r| {
            json!({
                "filename": r.filename,
                "binary": r.is_binary(),
                "bytes": r.bytes().len(),
                "sha256": sha256_hex(r.bytes()),
            })
        }).collect::<Vec<_>>(),
        "failures": failures.iter().map(|(document, list)| {
            json!({
                "document": document,
                "images": list.iter().map(|f| {
                    json!({ "url": f.url, "filename": f.filename, "error": f.error })
                }).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
