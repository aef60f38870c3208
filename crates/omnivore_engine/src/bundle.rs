use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

use omnivore_core::{parse_metadata_list, ArticleMetadata, MetadataError};
use omnivore_logging::{sink_info, sink_warn, LogSink};

use crate::decode::decode_html;

/// HTML bodies and metadata records unpacked from one export archive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportBundle {
    /// Entry path -> decoded HTML.
    pub html: BTreeMap<String, String>,
    pub metadata: Vec<ArticleMetadata>,
}

/// Problems that leave no usable input; they abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("cannot read export: {0}")]
    Io(#[from] io::Error),
    #[error("export is not a readable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("export contains no metadata*.json file")]
    NoMetadata,
    #[error("invalid metadata in {entry}: {source}")]
    Metadata {
        entry: String,
        #[source]
        source: MetadataError,
    },
}

pub fn open_bundle(path: &Path, log: &dyn LogSink) -> Result<ExportBundle, BundleError> {
    let file = File::open(path)?;
    read_bundle(file, log)
}

/// Reads every `*.html` entry and every `metadata*.json` entry of an export.
///
/// Metadata files are concatenated in entry-name order.
pub fn read_bundle<R: Read + Seek>(reader: R, log: &dyn LogSink) -> Result<ExportBundle, BundleError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut bundle = ExportBundle::default();
    let mut metadata_entries = BTreeMap::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let base = name.rsplit('/').next().unwrap_or(&name).to_ascii_lowercase();

        if base.ends_with(".html") {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            let decoded = decode_html(&bytes);
            if decoded.had_errors {
                sink_warn!(
                    log,
                    "{} is not valid {}, undecodable bytes were replaced",
                    name,
                    decoded.encoding_label
                );
            }
            bundle.html.insert(name, decoded.html);
        } else if base.starts_with("metadata") && base.ends_with(".json") {
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            metadata_entries.insert(name, text);
        }
    }

    if metadata_entries.is_empty() {
        return Err(BundleError::NoMetadata);
    }
    for (entry, text) in metadata_entries {
        let records = parse_metadata_list(&text)
            .map_err(|source| BundleError::Metadata { entry, source })?;
        bundle.metadata.extend(records);
    }

    sink_info!(
        log,
        "Export contains {} HTML document(s) and {} metadata record(s)",
        bundle.html.len(),
        bundle.metadata.len()
    );
    Ok(bundle)
}
