mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{StaticFetcher, TestSink};
use omnivore_core::{parse_metadata_list, ConversionResult, Payload};
use omnivore_engine::{build_orchestrator, BatchOutput, EngineConfig, EngineEvent, Observers};
use omnivore_logging::{MemoryLogSink, Severity};
use pretty_assertions::assert_eq;

fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, html)| (name.to_string(), html.to_string()))
        .collect()
}

async fn run(
    fetcher: StaticFetcher,
    html: &BTreeMap<String, String>,
    metadata_json: &str,
    log: &MemoryLogSink,
) -> BatchOutput {
    let orchestrator = build_orchestrator(Arc::new(fetcher), &EngineConfig::default());
    let mut metadata = parse_metadata_list(metadata_json).unwrap();
    let sink = TestSink::new();
    orchestrator
        .run(html, &mut metadata, Observers::new(&sink, log))
        .await
}

fn find<'a>(output: &'a BatchOutput, filename: &str) -> Option<&'a ConversionResult> {
    output.results.iter().find(|r| r.filename == filename)
}

#[tokio::test]
async fn happy_path_produces_markdown_and_attachment() {
    let html = inputs(&[("a.html", "<p><img src='https://x/y.png'></p>")]);
    let fetcher = StaticFetcher::new().with("https://x/y.png", &[1, 2, 3]);
    let log = MemoryLogSink::new();

    let output = run(fetcher, &html, r#"[{"slug":"a","url":"https://site/a"}]"#, &log).await;

    assert_eq!(output.results.len(), 2);
    let doc = find(&output, "a.md").expect("markdown result");
    assert!(!doc.is_binary());
    assert!(doc.as_text().unwrap().contains("./attachments/a-1.png"));
    assert_eq!(
        find(&output, "attachments/a-1.png"),
        Some(&ConversionResult::binary("attachments/a-1.png", vec![1, 2, 3]))
    );
    assert!(output.failures.is_empty());
}

#[tokio::test]
async fn article_without_metadata_is_skipped_with_warning() {
    let html = inputs(&[
        ("content/orphan.html", "<p>lost</p>"),
        ("content/kept.html", "<p>kept</p>"),
    ]);
    let log = MemoryLogSink::new();
    let orchestrator = build_orchestrator(Arc::new(StaticFetcher::new()), &EngineConfig::default());
    let mut metadata = parse_metadata_list(r#"[{"slug":"kept","url":"https://site/k"}]"#).unwrap();
    let sink = TestSink::new();

    let output = orchestrator
        .run(&html, &mut metadata, Observers::new(&sink, &log))
        .await;

    let names: Vec<_> = output.results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["kept.md"]);
    assert!(output.failures.is_empty());
    let warnings = log.messages(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("orphan"));
    assert!(sink.take().contains(&EngineEvent::ArticleSkipped {
        file: "content/orphan.html".to_string()
    }));
}

#[tokio::test]
async fn metadata_without_html_produces_nothing() {
    let html = inputs(&[("a.html", "<p>a</p>")]);
    let log = MemoryLogSink::new();
    let output = run(
        StaticFetcher::new(),
        &html,
        r#"[{"slug":"a","url":"https://site/a"},{"slug":"ghost","url":"https://site/g","thumbnail":"https://x/t.png"}]"#,
        &log,
    )
    .await;

    assert!(find(&output, "ghost.md").is_none());
    assert!(!output.failures.contains_key("ghost.md"));
    assert_eq!(output.results.len(), 1);
}

#[tokio::test]
async fn total_image_failure_is_recorded_under_markdown_name() {
    let html = inputs(&[("a.html", r#"<img src="https://x/gone.png">"#)]);
    let log = MemoryLogSink::new();

    let output = run(StaticFetcher::new(), &html, r#"[{"slug":"a","url":"https://site/a"}]"#, &log).await;

    assert_eq!(output.results.len(), 1);
    let doc = find(&output, "a.md").unwrap();
    assert!(doc.as_text().unwrap().contains("![](https://x/gone.png)"));
    let failures = output.failures.get("a.md").expect("failure entry");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, "https://x/gone.png");
    assert_eq!(failures[0].filename, "a-1.png");
    assert_eq!(output.image_count(), 0);
}

#[tokio::test]
async fn every_local_reference_has_a_binary_result() {
    let html = inputs(&[
        ("p1.html", r#"<img src="https://x/1.png"><img src="https://x/bad.png">"#),
        ("p2.html", r#"<img src="https://x/2.gif"><a href="https://x/1.png">raw</a>"#),
    ]);
    let fetcher = StaticFetcher::new()
        .with("https://x/1.png", &[1])
        .with("https://x/2.gif", &[2])
        .with("https://x/t.jpg", &[3]);
    let log = MemoryLogSink::new();
    let json = r#"[{"slug":"p1","url":"https://s/1"},{"slug":"p2","url":"https://s/2","thumbnail":"https://x/t.jpg"}]"#;

    let output = run(fetcher, &html, json, &log).await;

    let mut referenced = Vec::new();
    let mut remote = Vec::new();
    for doc in output.results.iter().filter(|r| !r.is_binary()) {
        let text = doc.as_text().unwrap();
        remote.extend(omnivore_core::find_image_refs(text).into_iter().map(|i| i.url));
        for piece in text.split("./attachments/").skip(1) {
            let name: String = piece
                .chars()
                .take_while(|c| !matches!(c, ')' | '"'))
                .collect();
            referenced.push(format!("attachments/{name}"));
        }
    }
    referenced.sort();
    assert_eq!(remote, vec!["https://x/bad.png"]);
    let binaries: Vec<_> = output
        .results
        .iter()
        .filter(|r| matches!(r.payload, Payload::Binary(_)))
        .map(|r| r.filename.clone())
        .collect();
    assert_eq!(referenced, binaries);
    assert_eq!(
        binaries,
        vec!["attachments/p1-1.png", "attachments/p2-1.gif", "attachments/p2-thumbnail.jpg"]
    );
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures["p1.md"][0].filename, "p1-2.png");
}

#[tokio::test]
async fn result_set_is_independent_of_input_order() {
    let json = r#"[{"slug":"b","url":"https://s/b"},{"slug":"a","url":"https://s/a"}]"#;
    let first_inputs = inputs(&[
        ("a.html", r#"<img src="https://x/a.png">"#),
        ("b.html", r#"<p>b</p><img src="https://x/b.png">"#),
    ]);
    let second_inputs = inputs(&[
        ("b.html", r#"<p>b</p><img src="https://x/b.png">"#),
        ("a.html", r#"<img src="https://x/a.png">"#),
    ]);
    let fetcher = || {
        StaticFetcher::new()
            .with("https://x/a.png", &[1])
            .with("https://x/b.png", &[2])
    };
    let log = MemoryLogSink::new();

    let first = run(fetcher(), &first_inputs, json, &log).await;
    let second = run(fetcher(), &second_inputs, json, &log).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn duplicate_slugs_keep_first_record() {
    let html = inputs(&[("a.html", "<p>a</p>")]);
    let log = MemoryLogSink::new();
    let json = r#"[{"slug":"a","url":"https://s/first"},{"slug":"a","url":"https://s/second"}]"#;

    let output = run(StaticFetcher::new(), &html, json, &log).await;

    let doc = find(&output, "a.md").unwrap().as_text().unwrap();
    assert!(doc.contains("https://s/first"));
    assert!(log
        .messages(Severity::Warning)
        .iter()
        .any(|m| m.contains("Duplicate metadata")));
}

#[tokio::test]
async fn articles_report_start_in_input_order() {
    let html = inputs(&[("b.html", "<p>b</p>"), ("a.html", "<p>a</p>")]);
    let orchestrator = build_orchestrator(Arc::new(StaticFetcher::new()), &EngineConfig::default());
    let mut metadata = parse_metadata_list(
        r#"[{"slug":"a","url":"https://s/a"},{"slug":"b","url":"https://s/b"}]"#,
    )
    .unwrap();
    let sink = TestSink::new();
    let log = MemoryLogSink::new();

    orchestrator
        .run(&html, &mut metadata, Observers::new(&sink, &log))
        .await;

    let files: Vec<_> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(update) if update.current_image.is_none() => {
                Some(update.current_file)
            }
            _ => None,
        })
        .collect();
    assert_eq!(files, vec!["a.html", "b.html"]);
}
