//! Scanner for Markdown image references.
//!
//! Matches `![alt](url)` where `alt` stays on one line and `url` runs up to
//! whitespace or the first `)` without a matching `(` (an optional title may
//! follow before the closing parenthesis). Only `http://` and `https://` URLs
//! are reported. Escaped brackets (`\[`) never open a reference.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub url: String,
    /// Byte range of `url` inside the scanned text.
    pub url_span: Range<usize>,
}

pub fn find_image_refs(text: &str) -> Vec<ImageRef> {
    let mut refs = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find("![") {
        let alt_start = cursor + found + 2;
        match parse_reference(text, alt_start) {
            Some(image) => {
                cursor = image.url_span.end;
                refs.push(image);
            }
            None => cursor = alt_start,
        }
    }
    refs
}

fn parse_reference(text: &str, alt_start: usize) -> Option<ImageRef> {
    let rest = &text[alt_start..];
    let alt_len = rest.find("](")?;
    let alt = &rest[..alt_len];
    if alt.contains('\n') {
        return None;
    }

    let url_start = alt_start + alt_len + 2;
    let tail = &text[url_start..];
    let url_len = destination_len(tail);
    let after = &tail[url_len..];
    let line = &after[..after.find('\n').unwrap_or(after.len())];
    if !line.contains(')') {
        return None;
    }

    let url = &tail[..url_len];
    if !is_http_url(url) {
        return None;
    }
    Some(ImageRef {
        alt: alt.to_string(),
        url: url.to_string(),
        url_span: url_start..url_start + url_len,
    })
}

/// Length of the destination at the start of `tail`; nested parentheses
/// must balance.
fn destination_len(tail: &str) -> usize {
    let mut depth = 0usize;
    for (at, c) in tail.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return at,
            ')' => depth -= 1,
            c if c.is_whitespace() => return at,
            _ => {}
        }
    }
    tail.len()
}

fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    (lower.starts_with("http://") && url.len() > 7) || (lower.starts_with("https://") && url.len() > 8)
}

/// Points every image reference whose URL equals `from` at `to`.
///
/// Returns the rewritten text and how many references changed. Text outside
/// image references, including links to the same URL, is left alone.
pub fn rewrite_image_url(text: &str, from: &str, to: &str) -> (String, usize) {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for image in find_image_refs(text) {
        if image.url != from {
            continue;
        }
        output.push_str(&text[last..image.url_span.start]);
        output.push_str(to);
        last = image.url_span.end;
        count += 1;
    }
    output.push_str(&text[last..]);
    (output, count)
}
