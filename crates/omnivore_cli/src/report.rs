//! Human-readable run output.

use std::fmt::Write as _;

use omnivore_core::{FailureReport, ProgressUpdate};
use omnivore_engine::RunSummary;

pub fn progress_line(update: &ProgressUpdate) -> String {
    match &update.current_image {
        Some(image) => format!("  {} <- {}", update.current_file, image),
        None => format!("Converting {}", update.current_file),
    }
}

pub fn summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "Wrote {} ({} document(s), {} image(s))",
        summary.output_path.display(),
        summary.documents,
        summary.images
    );
    if summary.is_partial() {
        let _ = write!(
            out,
            "\n{} image(s) could not be downloaded and keep their remote URL:\n{}",
            summary.failed_images(),
            failure_report(&summary.failures)
        );
    }
    out
}

/// One block per Markdown file, one indented line per failed image.
pub fn failure_report(failures: &FailureReport) -> String {
    let mut out = String::new();
    for (document, items) in failures {
        let _ = writeln!(out, "{document}");
        for failure in items {
            let _ = writeln!(
                out,
                "  {} ({}): {}",
                failure.url, failure.filename, failure.error
            );
        }
    }
    out
}
