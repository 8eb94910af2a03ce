/*
[INPUT]:  Optional YAML settings file plus command-line/environment overrides
[OUTPUT]: Resolved task settings and the adapter ClientConfig
[POS]:    Configuration layer - task setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use autoglm_adapter::{ClientConfig, DEFAULT_ENDPOINT};

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings file layout (every key optional)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileSettings {
    /// AutoGLM API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// WebSocket endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Directory for JSON audit logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Handshake wait in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl FileSettings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let settings: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parse settings file {}", path.display()))?;
        Ok(settings)
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
}

/// Fully resolved settings for one `task` invocation
#[derive(Clone)]
pub struct TaskSettings {
    pub instruction: String,
    pub conversation_id: String,
    pub api_key: String,
    pub endpoint: String,
    pub log_dir: PathBuf,
    pub audit_log: bool,
    pub connect_timeout: Duration,
}

impl TaskSettings {
    /// Merge overrides over file settings over defaults.
    pub fn resolve(
        instruction: String,
        conversation_id: String,
        audit_log: bool,
        overrides: Overrides,
        file: FileSettings,
    ) -> Result<Self> {
        let api_key = overrides
            .api_key
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!("missing API key: pass --api-key, set AUTOGLM_API_KEY, or add api_key to the settings file");
        };

        let connect_timeout_secs = overrides
            .connect_timeout_secs
            .or(file.connect_timeout_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if connect_timeout_secs == 0 {
            bail!("connect timeout must be at least one second");
        }

        Ok(Self {
            instruction,
            conversation_id,
            api_key,
            endpoint: overrides
                .endpoint
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            log_dir: overrides
                .log_dir
                .or(file.log_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            audit_log,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone())
            .with_endpoint(self.endpoint.clone())
            .with_connect_timeout(self.connect_timeout)
    }
}
