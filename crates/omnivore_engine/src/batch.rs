use std::collections::{BTreeMap, HashMap, HashSet};

use omnivore_core::{
    attachment_path, markdown_filename, slug_from_input_name, ArticleMetadata, ConversionResult,
    FailureReport, ProgressUpdate,
};
use omnivore_logging::{sink_info, sink_warn, LogSink};

use crate::article::ArticleConverter;
use crate::observe::Observers;
use crate::EngineEvent;

/// Everything a run produced, ready for packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    /// Markdown documents first, then `attachments/…` images.
    pub results: Vec<ConversionResult>,
    pub failures: FailureReport,
}

impl BatchOutput {
    pub fn document_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_binary()).count()
    }

    pub fn image_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_binary()).count()
    }
}

/// Runs the article converter over a whole export, one article at a time.
#[derive(Clone)]
pub struct BatchOrchestrator {
    article: ArticleConverter,
}

impl BatchOrchestrator {
    pub fn new(article: ArticleConverter) -> Self {
        Self { article }
    }

    /// Converts every HTML input that has a metadata record with its slug.
    ///
    /// Inputs are processed in key order. Inputs without metadata are skipped
    /// with a warning. Matched records get their `thumbnail` rewritten in
    /// place when the thumbnail download succeeds.
    pub async fn run(
        &self,
        inputs: &BTreeMap<String, String>,
        metadata: &mut [ArticleMetadata],
        observers: Observers<'_>,
    ) -> BatchOutput {
        let index = index_by_slug(metadata, observers.log);
        let mut documents = Vec::new();
        let mut images: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut failures = FailureReport::new();
        let mut written = HashSet::new();

        for (name, html) in inputs {
            let slug = slug_from_input_name(name);
            let Some(&position) = index.get(slug) else {
                sink_warn!(
                    observers.log,
                    "No metadata found for {}, skipping article",
                    name
                );
                observers.progress.emit(EngineEvent::ArticleSkipped {
                    file: name.clone(),
                });
                continue;
            };
            let markdown_name = markdown_filename(slug);
            if !written.insert(markdown_name.clone()) {
                sink_warn!(
                    observers.log,
                    "{} maps to {} which was already converted, skipping article",
                    name,
                    markdown_name
                );
                observers.progress.emit(EngineEvent::ArticleSkipped {
                    file: name.clone(),
                });
                continue;
            }

            observers
                .progress
                .emit(EngineEvent::Progress(ProgressUpdate::article(name.clone())));
            let record = &mut metadata[position];
            let source_url = record.url().to_string();
            let output = self
                .article
                .convert(html, &source_url, Some(record), name, observers)
                .await;

            if output.failures.is_empty() {
                sink_info!(observers.log, "Converted {}", markdown_name);
            } else {
                sink_warn!(
                    observers.log,
                    "Converted {} with {} image failure(s)",
                    markdown_name,
                    output.failures.len()
                );
                failures.insert(markdown_name.clone(), output.failures);
            }
            images.extend(output.images);
            documents.push(ConversionResult::text(markdown_name, output.markdown));
        }

        sink_info!(
            observers.log,
            "Batch finished: {} document(s), {} image(s), {} article(s) with failures",
            documents.len(),
            images.len(),
            failures.len()
        );

        let mut results = documents;
        results.extend(
            images
                .into_iter()
                .map(|(name, bytes)| ConversionResult::binary(attachment_path(&name), bytes)),
        );
        BatchOutput { results, failures }
    }
}

/// Slug -> position of its first record; later duplicates are ignored.
fn index_by_slug(metadata: &[ArticleMetadata], log: &dyn LogSink) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(metadata.len());
    for (position, record) in metadata.iter().enumerate() {
        if index.contains_key(record.slug()) {
            sink_warn!(
                log,
                "Duplicate metadata for slug {}, keeping the first record",
                record.slug()
            );
            continue;
        }
        index.insert(record.slug().to_string(), position);
    }
    index
}
