#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use omnivore_engine::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, ProgressSink,
};

/// Fetcher answering from a fixed URL table; unknown URLs get a 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
    panics: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: &[u8]) -> Self {
        self.responses.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn panicking_on(mut self, url: &str) -> Self {
        self.panics.push(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panics.iter().any(|p| p == url) {
            panic!("fetcher exploded on {url}");
        }
        match self.responses.get(url) {
            Some(bytes) => Ok(FetchOutput {
                bytes: bytes.clone(),
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    content_type: Some("image/png".to_string()),
                    byte_len: bytes.len() as u64,
                },
            }),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "404 Not Found")),
        }
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
