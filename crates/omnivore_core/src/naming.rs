//! Deterministic output names.
//!
//! Image names are `{slug}-{n}.{ext}` for body images and
//! `{slug}-thumbnail.{ext}` for thumbnails, so two articles with distinct
//! slugs never share an attachment name.

use url::Url;

pub const ATTACHMENTS_DIR: &str = "attachments";
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

const UNTITLED: &str = "untitled";

/// `content/my-post.html` -> `my-post`. Both separators are accepted.
pub fn slug_from_input_name(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.len().checked_sub(".html".len()) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".html") => {
            &base[..cut]
        }
        _ => base,
    }
}

/// Keeps only `[A-Za-z0-9-]`.
pub fn sanitize_slug(slug: &str) -> String {
    slug.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Extension of the final path segment when it names a known image type.
pub fn image_extension(url: &str) -> String {
    let segment = final_segment(url);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

fn final_segment(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(last) = parsed.path_segments().and_then(|mut s| s.next_back()) {
            return last.to_string();
        }
    }
    let stripped = strip_query(url);
    stripped.rsplit('/').next().unwrap_or(stripped).to_string()
}

fn filename_stem(slug: &str) -> String {
    let cleaned = sanitize_slug(slug);
    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned
    }
}

/// Name of the `index`-th (1-based) body image of an article.
pub fn body_image_filename(slug: &str, index: usize, url: &str) -> String {
    format!("{}-{}.{}", filename_stem(slug), index, image_extension(url))
}

pub fn thumbnail_filename(slug: &str, url: &str) -> String {
    format!("{}-thumbnail.{}", filename_stem(slug), image_extension(url))
}

pub fn markdown_filename(slug: &str) -> String {
    format!("{slug}.md")
}

/// Archive path of an attachment: `attachments/{name}`.
pub fn attachment_path(name: &str) -> String {
    format!("{ATTACHMENTS_DIR}/{name}")
}

/// Reference to an attachment from a Markdown document: `./attachments/{name}`.
pub fn local_reference(name: &str) -> String {
    format!("./{ATTACHMENTS_DIR}/{name}")
}
