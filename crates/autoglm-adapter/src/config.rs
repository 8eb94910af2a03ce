/*
[INPUT]:  Endpoint, API key and timing knobs supplied by the caller
[OUTPUT]: Validated connection configuration for the WebSocket client
[POS]:    Configuration layer - explicit client settings (no ambient state)
[UPDATE]: When adding connection options or changing defaults
*/

use std::time::Duration;
use url::Url;

use crate::error::{AutoglmError, Result};

/// AutoGLM developer endpoint
pub const DEFAULT_ENDPOINT: &str = "wss://autoglm-api.zhipuai.cn/openapi/v1/autoglm/developer";

/// Connection configuration
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Upper bound on the open handshake
    pub connect_timeout: Duration,
    /// Upper bound on joining the receive task during close
    pub close_timeout: Duration,
    /// Capacity of the inbound event queue
    pub channel_capacity: usize,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Parse the endpoint and check it is a WebSocket URL
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(AutoglmError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(2),
            channel_capacity: 100,
        }
    }
}

// Keep the credential out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("close_timeout", &self.close_timeout)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}
