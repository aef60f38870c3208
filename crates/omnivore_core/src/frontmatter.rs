use serde_json::Value;

use crate::ArticleMetadata;

/// Renders the `---`-delimited front matter block, followed by a blank line.
///
/// Strings are double-quoted with JSON escaping, which YAML reads back as the
/// same string. Everything else is written as its compact JSON literal.
pub fn render_front_matter(metadata: &ArticleMetadata) -> String {
    let mut block = String::from("---\n");
    for (key, value) in metadata.fields() {
        block.push_str(key);
        block.push_str(": ");
        block.push_str(&render_value(value));
        block.push('\n');
    }
    block.push_str("---\n\n");
    block
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => Value::String(text.clone()).to_string(),
        other => other.to_string(),
    }
}
