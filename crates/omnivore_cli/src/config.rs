//! Optional RON settings file for the command line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use omnivore_engine::{EngineConfig, FetchSettings, ProxySettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_image_bytes: u64,
    pub proxy_hosts: Vec<String>,
    pub include_manifest: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            timeout_secs: engine.fetch.request_timeout.as_secs(),
            connect_timeout_secs: engine.fetch.connect_timeout.as_secs(),
            max_image_bytes: engine.fetch.max_bytes,
            proxy_hosts: engine.proxy.hosts,
            include_manifest: engine.include_manifest,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let defaults = FetchSettings::default();
        EngineConfig {
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
                request_timeout: Duration::from_secs(self.timeout_secs.max(1)),
                redirect_limit: defaults.redirect_limit,
                max_bytes: self.max_image_bytes,
            },
            proxy: ProxySettings {
                hosts: self.proxy_hosts.clone(),
            },
            include_manifest: self.include_manifest,
        }
    }
}
