use editor_sync_core::editor::DEFAULT_SELECTOR;
use editor_sync_core::SyncConfig;

/// Where the browser's remote debugging interface listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevToolsEndpoint {
    pub host: String,
    /// i.e. `chromium-browser --remote-debugging-port=9222`
    pub port: u16,
    /// Position of the tab among page targets
    pub tab: usize,
}

impl Default for DevToolsEndpoint {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            tab: 0,
        }
    }
}

impl DevToolsEndpoint {
    /// URL of the target listing.
    pub fn json_url(&self) -> String {
        format!("http://{}:{}/json", self.host, self.port)
    }
}

/// Complete runtime configuration, assembled from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: DevToolsEndpoint,
    /// CSS selector of the editor widgets
    pub selector: String,
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DevToolsEndpoint::default(),
            selector: DEFAULT_SELECTOR.to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selector.trim().is_empty() {
            return Err(ConfigError::EmptySelector);
        }
        if self.endpoint.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        self.sync.validate()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Editor selector must not be empty")]
    EmptySelector,

    #[error("DevTools host must not be empty")]
    EmptyHost,

    #[error(transparent)]
    Sync(#[from] editor_sync_core::ConfigError),
}
