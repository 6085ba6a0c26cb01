//! Request assembly and response classification.
//!
//! Both halves are plain functions over data so the wire contract can be
//! tested without a network.

use crate::client::ClientError;
use crate::config::ClientConfig;
use octopart_query::{escape, QueryParams};
use serde_json::Value;
use std::fmt;

/// A fully assembled GET request.
///
/// Query order is fixed: operation parameters first, then filter
/// parameters, then `apikey` last.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    base_url: String,
    path: String,
    query: QueryParams,
    api_key: String,
}

impl ApiRequest {
    /// Assemble a request for `resource_path` (e.g. `parts/search`).
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        resource_path: &str,
        params: QueryParams,
        api_key: &str,
    ) -> Self {
        Self {
            base_url: config.trimmed_base_url().to_string(),
            path: format!("{}{resource_path}", config.api_path),
            query: params,
            api_key: api_key.to_string(),
        }
    }

    /// Absolute path including the version prefix (e.g. `/api/v3/parts/search`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encoded parameters, without the API key.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.query
    }

    /// Query string including the trailing `apikey`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let key = format!("apikey={}", escape(&self.api_key));
        if self.query.is_empty() {
            key
        } else {
            format!("{}&{key}", self.query.join())
        }
    }

    /// Full URL to GET.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}?{}", self.base_url, self.path, self.query_string())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("api_key", &"***REDACTED***")
            .finish()
    }
}

/// Turn a status code and body into the call's result.
///
/// - `200`: body must be JSON
/// - anything else: body must be JSON; its `message` becomes the error text
///
/// A body that is not JSON surfaces as [`ClientError::Decode`] on either
/// path.
///
/// # Errors
///
/// Returns [`ClientError::Api`] for non-200 statuses and
/// [`ClientError::Decode`] for undecodable bodies.
pub fn classify_response(status: u16, body: &str) -> Result<Value, ClientError> {
    let parsed: Value = serde_json::from_str(body)?;

    if status == 200 {
        return Ok(parsed);
    }

    let message = parsed
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP {status}"), str::to_string);

    Err(ClientError::Api { status, message })
}
