//! Client configuration.

use crate::client::ClientError;
use std::time::Duration;

/// Fixed Octopart host.
pub const DEFAULT_BASE_URL: &str = "https://octopart.com";

/// Path prefix of the v3 REST API.
pub const API_V3_PATH: &str = "/api/v3/";

/// Octopart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host requests are sent to (e.g., <https://octopart.com>)
    pub base_url: String,
    /// Versioned path prefix, with leading and trailing slash
    pub api_path: String,
    /// Optional whole-request timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_path: API_V3_PATH.to_string(),
            timeout: None,
            user_agent: format!("octopart-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Configuration for the public v3 API.
    #[must_use]
    pub fn v3() -> Self {
        Self::default()
    }

    /// Point the client at another host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom User-Agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Init`] if the base URL does not parse as an
    /// http(s) URL or the API path is not slash-delimited.
    pub fn validate(&self) -> Result<(), ClientError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Init(format!("invalid base_url {}: {e}", self.base_url)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Init(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if !self.api_path.starts_with('/') || !self.api_path.ends_with('/') {
            return Err(ClientError::Init(format!(
                "api_path must start and end with '/', got {}",
                self.api_path
            )));
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    pub(crate) fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
