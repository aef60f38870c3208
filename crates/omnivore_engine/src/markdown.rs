use ego_tree::NodeId;
use scraper::node::Node;
use scraper::Html;
use url::Url;

// Stand-ins for brackets in text nodes while html2md runs; it leaves `[`/`]`
// unescaped, which would let prose read as `![alt](url)`.
const OPEN_BRACKET: char = '\u{E000}';
const CLOSE_BRACKET: char = '\u{E001}';

pub trait Converter: Send + Sync {
    /// Converts one HTML document; relative links resolve against `source_url`.
    fn to_markdown(&self, html: &str, source_url: &str) -> String;
}

/// `html2md` behind a scraper pass that prepares the document.
///
/// Image and link targets are made absolute before conversion, and every
/// image comes out as a native `![alt](url)` reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str, source_url: &str) -> String {
        let prepared = prepare_html(html, Url::parse(source_url).ok().as_ref());
        let markdown = html2md::parse_html(&prepared);
        let markdown = markdown
            .replace(OPEN_BRACKET, "\\[")
            .replace(CLOSE_BRACKET, "\\]");
        if markdown.trim().is_empty() {
            String::new()
        } else {
            format!("{}\n", markdown.trim_end())
        }
    }
}

enum Edit {
    Drop,
    Image,
    Anchor,
    Text,
}

/// Rewrites the parsed document so html2md sees only what should reach the
/// Markdown, then serializes it back to HTML.
fn prepare_html(html: &str, base: Option<&Url>) -> String {
    let mut document = Html::parse_document(html);

    let mut edits: Vec<(NodeId, Edit)> = Vec::new();
    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(element) => {
                let edit = match element.name() {
                    "head" | "script" | "style" | "noscript" | "template" => Edit::Drop,
                    "img" => Edit::Image,
                    "a" => Edit::Anchor,
                    _ => continue,
                };
                edits.push((node.id(), edit));
            }
            Node::Text(_) => {
                let verbatim = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|e| matches!(e.name(), "pre" | "code"))
                });
                if !verbatim {
                    edits.push((node.id(), Edit::Text));
                }
            }
            _ => {}
        }
    }

    for (id, edit) in edits {
        let Some(mut node) = document.tree.get_mut(id) else {
            continue;
        };
        match edit {
            Edit::Drop => node.detach(),
            Edit::Image => {
                if !prepare_image(node.value(), base) {
                    node.detach();
                }
            }
            Edit::Anchor => prepare_anchor(node.value(), base),
            Edit::Text => {
                if let Node::Text(text) = node.value() {
                    if text.contains(['[', ']', OPEN_BRACKET, CLOSE_BRACKET]) {
                        let guarded = guard_brackets(&text.text);
                        text.text = guarded.as_str().into();
                    }
                }
            }
        }
    }

    document.html()
}

/// Leaves a plain `<img src alt title>`; false when there is nothing to fetch.
fn prepare_image(node: &mut Node, base: Option<&Url>) -> bool {
    let Node::Element(element) = node else {
        return false;
    };
    let own_src = element.attr("src").filter(|src| !src.trim().is_empty());
    let lazy = own_src.is_none();
    let Some(url) = own_src
        .or_else(|| element.attr("data-src"))
        .and_then(|src| resolve_url(src, base))
    else {
        return false;
    };
    let url = destination(&url);
    let alt = element
        .attr("alt")
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['[', ']'], "");

    if lazy {
        element.attrs.retain(|(name, _)| &*name.local != "src");
        for (name, _) in element.attrs.iter_mut() {
            if &*name.local == "data-src" {
                name.local = "src".into();
            }
        }
    }
    // Sizing attributes make html2md fall back to inline HTML.
    element
        .attrs
        .retain(|(name, _)| matches!(&*name.local, "src" | "alt" | "title"));
    for (name, value) in element.attrs.iter_mut() {
        match &*name.local {
            "src" => *value = url.as_str().into(),
            "alt" => *value = alt.as_str().into(),
            _ => *value = value.replace(['"', '\n'], "'").as_str().into(),
        }
    }
    true
}

/// Absolute `href`, or a plain span when the target cannot be linked.
fn prepare_anchor(node: &mut Node, base: Option<&Url>) {
    let Node::Element(element) = node else {
        return;
    };
    let target = element
        .attr("href")
        .and_then(|href| resolve_url(href, base))
        .filter(|url| matches!(url.scheme(), "http" | "https" | "mailto"));
    match target {
        Some(url) => {
            let url = destination(&url);
            element
                .attrs
                .retain(|(name, _)| &*name.local == "href");
            if let Some((_, value)) = element.attrs.first_mut() {
                *value = url.as_str().into();
            }
        }
        None => {
            element.name.local = "span".into();
            element.attrs.clear();
        }
    }
}

fn guard_brackets(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, OPEN_BRACKET | CLOSE_BRACKET))
        .map(|c| match c {
            '[' => OPEN_BRACKET,
            ']' => CLOSE_BRACKET,
            other => other,
        })
        .collect()
}

/// Link destination that a Markdown reader parses back to the same URL.
///
/// Balanced parentheses are legal inside a destination; unbalanced ones are
/// percent-encoded.
fn destination(url: &Url) -> String {
    let raw = url.as_str();
    let mut depth = 0usize;
    let mut balanced = true;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => balanced = false,
            ')' => depth -= 1,
            _ => {}
        }
    }
    if balanced && depth == 0 {
        raw.to_string()
    } else {
        raw.replace('(', "%28").replace(')', "%29")
    }
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
