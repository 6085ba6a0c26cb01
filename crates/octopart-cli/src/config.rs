//! CLI configuration.

use anyhow::{Context, Result};
use octopart_client::ClientConfig;
use std::time::Duration;

/// Placeholder key used by commands that never reach the network.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Octopart API key
    pub api_key: Option<String>,

    /// Client configuration
    pub client: ClientConfig,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OCTOPART_API_KEY`: API key sent as `apikey`
    /// - `OCTOPART_BASE_URL`: Override the API host
    /// - `OCTOPART_TIMEOUT_SECS`: Request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut client = ClientConfig::v3();

        if let Some(url) = lookup("OCTOPART_BASE_URL") {
            client.base_url = url;
        }

        if let Some(secs) = lookup("OCTOPART_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("Invalid OCTOPART_TIMEOUT_SECS")?;
            client.timeout = Some(Duration::from_secs(secs));
        }

        Ok(Self {
            api_key: lookup("OCTOPART_API_KEY").filter(|k| !k.is_empty()),
            client,
        })
    }

    /// API key, failing if none is configured.
    ///
    /// # Errors
    ///
    /// Returns error if `OCTOPART_API_KEY` is not set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("OCTOPART_API_KEY is not set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.client.base_url, "https://octopart.com");
        assert!(config.client.timeout.is_none());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn reads_all_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            ("OCTOPART_API_KEY", "k123"),
            ("OCTOPART_BASE_URL", "http://localhost:9000"),
            ("OCTOPART_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "k123");
        assert_eq!(config.client.base_url, "http://localhost:9000");
        assert_eq!(config.client.timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let config = CliConfig::from_lookup(lookup(&[("OCTOPART_API_KEY", "")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn malformed_timeout_fails() {
        let result = CliConfig::from_lookup(lookup(&[("OCTOPART_TIMEOUT_SECS", "soon")]));
        assert!(result.is_err());
    }
}
