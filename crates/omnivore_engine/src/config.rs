use crate::acquire::ProxySettings;
use crate::fetch::FetchSettings;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub proxy: ProxySettings,
    pub include_manifest: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            proxy: ProxySettings::default(),
            include_manifest: true,
        }
    }
}
