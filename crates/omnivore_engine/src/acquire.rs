use std::fmt;
use std::sync::Arc;

use omnivore_logging::{sink_error, sink_info, sink_warn, LogSink};

use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

pub const DEFAULT_PROXY_HOST: &str = "proxy-prod.omnivore-image-cache.app";

/// Image caching proxies whose URLs embed the original image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Host names, optionally with `:port`, matched right after the scheme.
    pub hosts: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            hosts: vec![DEFAULT_PROXY_HOST.to_string()],
        }
    }
}

impl ProxySettings {
    /// Path behind the proxy host, when `url` points at a configured proxy.
    fn proxy_path<'u>(&self, url: &'u str) -> Option<&'u str> {
        let rest = strip_http_scheme(url)?;
        self.hosts
            .iter()
            .find_map(|host| rest.strip_prefix(host.as_str())?.strip_prefix('/'))
    }

    pub fn is_proxy_url(&self, url: &str) -> bool {
        self.proxy_path(url).is_some()
    }

    /// `https://{proxy}/{options}/{percent-encoded original}` -> original URL.
    pub fn embedded_source_url(&self, url: &str) -> Option<String> {
        let path = self.proxy_path(url)?;
        let (_, encoded) = path.split_once('/')?;
        let decoded = urlencoding::decode(encoded).ok()?;
        strip_http_scheme(&decoded)?;
        Some(decoded.into_owned())
    }

    /// Ordered fetch attempts for `url`.
    pub fn plan(&self, url: &str) -> Vec<Attempt> {
        let mut attempts = Vec::with_capacity(3);
        if self.is_proxy_url(url) {
            attempts.push(Attempt::new(AttemptKind::Proxy, url));
            if let Some(source) = self.embedded_source_url(url) {
                attempts.push(Attempt::new(AttemptKind::Source, source));
            }
        }
        attempts.push(Attempt::new(AttemptKind::Direct, url));
        attempts
    }
}

fn strip_http_scheme(url: &str) -> Option<&str> {
    let scheme_len = if url.get(..8).is_some_and(|s| s.eq_ignore_ascii_case("https://")) {
        8
    } else if url.get(..7).is_some_and(|s| s.eq_ignore_ascii_case("http://")) {
        7
    } else {
        return None;
    };
    Some(&url[scheme_len..])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Proxy,
    Source,
    Direct,
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptKind::Proxy => write!(f, "proxy"),
            AttemptKind::Source => write!(f, "original source"),
            AttemptKind::Direct => write!(f, "direct"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub kind: AttemptKind,
    pub url: String,
}

impl Attempt {
    fn new(kind: AttemptKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// Fetches one image, falling back from proxy to original to direct URL.
#[derive(Clone)]
pub struct ImageAcquirer {
    fetcher: Arc<dyn Fetcher>,
    proxy: ProxySettings,
}

impl ImageAcquirer {
    pub fn new(fetcher: Arc<dyn Fetcher>, proxy: ProxySettings) -> Self {
        Self { fetcher, proxy }
    }

    /// Returns the first successful body, or the error of the last attempt.
    pub async fn acquire(&self, url: &str, log: &dyn LogSink) -> Result<Vec<u8>, FetchError> {
        let attempts = self.proxy.plan(url);
        let last = attempts.len().saturating_sub(1);
        let mut last_error = None;

        for (position, attempt) in attempts.iter().enumerate() {
            match self.fetcher.fetch(&attempt.url).await {
                Ok(output) => {
                    sink_info!(
                        log,
                        "Downloaded image ({} fetch, {} bytes): {}",
                        attempt.kind,
                        output.bytes.len(),
                        attempt.url
                    );
                    return Ok(output.bytes);
                }
                Err(err) if position == last => {
                    sink_error!(
                        log,
                        "Giving up on image {} after {} fetch failed: {}",
                        url,
                        attempt.kind,
                        err
                    );
                    last_error = Some(err);
                }
                Err(err) => {
                    sink_warn!(
                        log,
                        "{} fetch failed for {}: {}",
                        attempt.kind,
                        attempt.url,
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FetchError::new(FailureKind::InvalidUrl, "no fetch attempt for url")))
    }
}
