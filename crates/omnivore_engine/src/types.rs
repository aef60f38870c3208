use std::fmt;
use std::path::PathBuf;

use omnivore_core::{FailureReport, ImageProgress, ProgressUpdate};
use omnivore_logging::LogEntry;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An article or one of its images is about to be processed.
    Progress(ProgressUpdate),
    /// One image fetch of `file` settled, successfully or not.
    ImageSettled {
        file: String,
        progress: ImageProgress,
    },
    /// `file` had no matching metadata record.
    ArticleSkipped { file: String },
    Log(LogEntry),
    /// Terminal event of a background run.
    Finished(Result<RunSummary, String>),
}

/// Outcome of a run that produced an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub images: usize,
    pub failures: FailureReport,
    pub output_path: PathBuf,
}

impl RunSummary {
    pub fn failed_images(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// True when the archive was written but some images kept remote URLs.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
