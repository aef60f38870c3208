use omnivore_core::find_image_refs;
use omnivore_engine::{Converter, Html2MdConverter};
use pretty_assertions::assert_eq;

fn convert(html: &str, source: &str) -> String {
    Html2MdConverter.to_markdown(html, source)
}

#[test]
fn headings_and_paragraphs_become_blocks() {
    let md = convert("<h1>Hello</h1><p>first</p><p>second</p>", "https://site.example/");
    assert!(md.starts_with("Hello\n==="));
    assert!(md.ends_with("first\n\nsecond\n"));
}

#[test]
fn images_resolve_against_source_url() {
    let html = r#"<p>Before <img src="/images/pic.jpg" alt="A [nice] pic"> after</p>"#;
    let md = convert(html, "https://news.example.com/base/post");
    assert_eq!(
        md,
        "Before ![A nice pic](https://news.example.com/images/pic.jpg) after\n"
    );
}

#[test]
fn lazy_images_use_data_src() {
    let html = r#"<img src="" data-src="lazy.png">"#;
    let md = convert(html, "https://site.example/a/");
    assert_eq!(md, "![](https://site.example/a/lazy.png)\n");
}

#[test]
fn sized_images_stay_markdown_references() {
    let html = r#"<img src="https://x/a.png" width="10" height="20" align="left">"#;
    assert_eq!(convert(html, ""), "![](https://x/a.png)\n");
}

#[test]
fn images_without_source_are_dropped() {
    assert_eq!(convert(r#"<p>a<img alt="nothing">b</p>"#, ""), "ab\n");
}

#[test]
fn image_title_does_not_hide_the_url() {
    let md = convert(r#"<img src="https://x/y.png" title="Big pic">"#, "");
    let refs = find_image_refs(&md);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].url, "https://x/y.png");
}

#[test]
fn anchors_become_links_and_fragments_stay_text() {
    let html = r##"<p>Read <a href="./next">the next one</a> or <a href="#top">go up</a>.</p>"##;
    let md = convert(html, "https://site.example/docs/");
    assert_eq!(
        md,
        "Read [the next one](https://site.example/docs/next) or go up.\n"
    );
}

#[test]
fn markdown_characters_in_text_are_escaped() {
    let md = convert("<p>Use [brackets] and *stars*</p>", "");
    assert_eq!(md, "Use \\[brackets\\] and \\*stars\\*\n");
}

#[test]
fn image_syntax_written_as_text_is_not_an_image() {
    let md = convert(
        "<p>Write ![alt](https://evil.example/t.png) for images</p>",
        "https://site.example/",
    );
    assert!(find_image_refs(&md).is_empty());
}

#[test]
fn parenthesized_url_survives_conversion() {
    let md = convert(r#"<img src="https://upload.example/File_(1).png">"#, "");
    assert_eq!(md, "![](https://upload.example/File_(1).png)\n");

    let refs = find_image_refs(&md);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].url, "https://upload.example/File_(1).png");
}

#[test]
fn unbalanced_parenthesis_is_encoded() {
    let md = convert(r#"<img src="https://upload.example/smile:).png">"#, "");
    let refs = find_image_refs(&md);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].url, "https://upload.example/smile:%29.png");
}

#[test]
fn code_keeps_brackets_verbatim() {
    let md = convert("<pre><code>let a = b[0];</code></pre>", "");
    assert!(md.contains("let a = b[0];"));
    assert!(!md.contains("\\["));
}

#[test]
fn lists_keep_their_items() {
    let md = convert("<ol><li>one</li><li>two</li></ol><ul><li>three</li></ul>", "");
    assert!(md.contains("one"));
    assert!(md.contains("two"));
    assert!(md.contains("three"));
}

#[test]
fn scripts_and_head_are_dropped() {
    let html = "<html><head><title>T</title><style>p{}</style></head><body><script>x()</script><p>kept</p></body></html>";
    assert_eq!(convert(html, ""), "kept\n");
}

#[test]
fn empty_document_gives_empty_markdown() {
    assert_eq!(convert("<html><body>  </body></html>", ""), "");
}

#[test]
fn malformed_html_degrades_to_text() {
    let md = convert("<p>unclosed <b>bold <div>and <i>mess", "not a url");
    assert!(md.contains("unclosed"));
    assert!(md.contains("mess"));
}

#[test]
fn conversion_is_deterministic() {
    let html = r#"<p><a href="https://det.example/page">Det</a><img src="x.png"></p>"#;
    let first = convert(html, "https://det.example/");
    let second = convert(html, "https://det.example/");
    assert_eq!(first, second);
}
