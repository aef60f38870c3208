use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

/// One file of the output set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub filename: String,
    pub payload: Payload,
}

impl ConversionResult {
    pub fn text(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            payload: Payload::Text(content.into()),
        }
    }

    pub fn binary(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            payload: Payload::Binary(content),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.payload, Payload::Binary(_))
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.payload {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }
}

/// An image that could not be acquired; its remote URL stays in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub url: String,
    pub filename: String,
    pub error: String,
}

/// Failures grouped by the Markdown filename of the owning article.
pub type FailureReport = BTreeMap<String, Vec<DownloadFailure>>;
