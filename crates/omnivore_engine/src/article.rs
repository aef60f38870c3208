use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use omnivore_core::{
    body_image_filename, find_image_refs, local_reference, render_front_matter,
    rewrite_image_url, thumbnail_filename, ArticleMetadata, DownloadFailure, ImageProgress,
    ProgressUpdate,
};
use url::Url;

use crate::acquire::ImageAcquirer;
use crate::markdown::Converter;
use crate::observe::Observers;
use crate::EngineEvent;

/// Markdown document and attachments of one converted article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleOutput {
    pub markdown: String,
    /// Downloaded images keyed by attachment filename.
    pub images: BTreeMap<String, Vec<u8>>,
    pub failures: Vec<DownloadFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageRole {
    Body,
    Thumbnail,
}

#[derive(Debug, Clone)]
struct PendingImage {
    role: ImageRole,
    /// URL exactly as referenced; also what gets fetched.
    url: String,
    filename: String,
}

struct SettledImage {
    image: PendingImage,
    result: Result<Vec<u8>, String>,
}

/// Converts one article and localizes its images.
#[derive(Clone)]
pub struct ArticleConverter {
    converter: Arc<dyn Converter>,
    acquirer: ImageAcquirer,
}

impl ArticleConverter {
    pub fn new(converter: Arc<dyn Converter>, acquirer: ImageAcquirer) -> Self {
        Self {
            converter,
            acquirer,
        }
    }

    /// Converts `html` and fetches every image it references concurrently.
    ///
    /// Returns only after all fetches settled. A successful body image has
    /// every reference to its URL pointed at `./attachments/{name}`; a
    /// successful thumbnail is written back into `metadata` and the front
    /// matter. Failed images keep their remote URL and are reported.
    pub async fn convert(
        &self,
        html: &str,
        source_url: &str,
        mut metadata: Option<&mut ArticleMetadata>,
        file: &str,
        observers: Observers<'_>,
    ) -> ArticleOutput {
        let mut body = self.converter.to_markdown(html, source_url);
        let mut front = metadata
            .as_deref()
            .map(render_front_matter)
            .unwrap_or_default();

        let slug = metadata
            .as_deref()
            .map(|m| m.slug().to_string())
            .unwrap_or_default();
        let thumbnail = metadata
            .as_deref()
            .and_then(|m| m.thumbnail().map(|t| resolve_thumbnail(t, m.url())));
        let pending = collect_images(&format!("{front}{body}"), &slug, thumbnail.as_deref());

        let settled = self.fetch_all(pending, file, observers).await;

        let mut output = ArticleOutput::default();
        let mut rewrites = Vec::new();
        for SettledImage { image, result } in settled {
            match result {
                Ok(bytes) => {
                    let local = local_reference(&image.filename);
                    match image.role {
                        ImageRole::Body => rewrites.push((image.url, local)),
                        ImageRole::Thumbnail => {
                            if let Some(metadata) = metadata.as_deref_mut() {
                                metadata.set_thumbnail(local);
                                front = render_front_matter(metadata);
                            }
                        }
                    }
                    output.images.insert(image.filename, bytes);
                }
                Err(error) => output.failures.push(DownloadFailure {
                    url: image.url,
                    filename: image.filename,
                    error,
                }),
            }
        }

        for (url, local) in &rewrites {
            front = rewrite_image_url(&front, url, local).0;
            body = rewrite_image_url(&body, url, local).0;
        }
        output.markdown = format!("{front}{body}");
        output
    }

    async fn fetch_all(
        &self,
        pending: Vec<PendingImage>,
        file: &str,
        observers: Observers<'_>,
    ) -> Vec<SettledImage> {
        let total = pending.len();
        let mut in_flight = pending
            .into_iter()
            .enumerate()
            .map(|(position, image)| async move {
                observers.progress.emit(EngineEvent::Progress(ProgressUpdate::image(
                    file,
                    image.filename.clone(),
                )));
                let fetched = AssertUnwindSafe(self.acquirer.acquire(&image.url, observers.log))
                    .catch_unwind()
                    .await;
                let result = match fetched {
                    Ok(Ok(bytes)) => Ok(bytes),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(panic) => Err(panic_message(panic.as_ref())),
                };
                (position, SettledImage { image, result })
            })
            .collect::<FuturesUnordered<_>>();

        let mut settled = Vec::with_capacity(total);
        let mut completed = 0;
        while let Some(item) = in_flight.next().await {
            completed += 1;
            observers.progress.emit(EngineEvent::ImageSettled {
                file: file.to_string(),
                progress: ImageProgress { completed, total },
            });
            settled.push(item);
        }

        settled.sort_by_key(|(position, _)| *position);
        settled.into_iter().map(|(_, image)| image).collect()
    }
}

/// Distinct body image URLs in first-appearance order, then the thumbnail.
fn collect_images(markdown: &str, slug: &str, thumbnail: Option<&str>) -> Vec<PendingImage> {
    let mut pending: Vec<PendingImage> = Vec::new();
    for reference in find_image_refs(markdown) {
        if pending.iter().any(|p| p.url == reference.url) {
            continue;
        }
        let filename = body_image_filename(slug, pending.len() + 1, &reference.url);
        pending.push(PendingImage {
            role: ImageRole::Body,
            url: reference.url,
            filename,
        });
    }
    if let Some(url) = thumbnail {
        pending.push(PendingImage {
            role: ImageRole::Thumbnail,
            url: url.to_string(),
            filename: thumbnail_filename(slug, url),
        });
    }
    pending
}

/// Absolute thumbnails are kept verbatim; relative ones resolve against the
/// article URL.
fn resolve_thumbnail(thumbnail: &str, page_url: &str) -> String {
    let thumbnail = thumbnail.trim();
    if Url::parse(thumbnail).is_ok() {
        return thumbnail.to_string();
    }
    Url::parse(page_url)
        .and_then(|base| base.join(thumbnail))
        .map(String::from)
        .unwrap_or_else(|_| thumbnail.to_string())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("image fetch panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("image fetch panicked: {message}")
    } else {
        "image fetch panicked".to_string()
    }
}
