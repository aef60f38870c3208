//! Omnivore core: pure data model and text helpers for the Markdown converter.
mod frontmatter;
mod image_refs;
mod metadata;
mod naming;
mod progress;
mod result;

pub use frontmatter::render_front_matter;
pub use image_refs::{find_image_refs, rewrite_image_url, ImageRef};
pub use metadata::{parse_metadata_list, ArticleMetadata, MetadataError};
pub use naming::{
    attachment_path, body_image_filename, image_extension, local_reference, markdown_filename,
    sanitize_slug, slug_from_input_name, strip_query, thumbnail_filename, ATTACHMENTS_DIR,
    DEFAULT_IMAGE_EXTENSION, IMAGE_EXTENSIONS,
};
pub use progress::{ImageProgress, ProgressUpdate};
pub use result::{ConversionResult, DownloadFailure, FailureReport, Payload};
