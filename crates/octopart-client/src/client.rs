//! HTTP client for the Octopart v3 API.
//!
//! Every operation is a single stateless GET. Results can be awaited
//! directly ([`OctopartClient::send`]) or delivered to a callback from a
//! spawned task ([`OctopartClient::dispatch`]).

use crate::config::ClientConfig;
use crate::request::{classify_response, ApiRequest};
use crate::resource::{Resource, ResourceKind};
use octopart_query::{
    encode_field_filters, encode_filters, encode_match_args, encode_search_args, EncodeError,
    FilterSpec, MatchArgs, QueryArgs, QueryParams,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value;
use std::fmt;
use tokio::task::JoinHandle;

/// Result of one API call.
pub type ApiResult = Result<Value, ClientError>;

/// Completion handler, invoked exactly once per dispatched call.
pub type Callback = Box<dyn FnOnce(ApiResult) + Send + 'static>;

/// HTTP client for Octopart v3 operations.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct OctopartClient {
    http: Client,
    config: ClientConfig,
    api_key: String,
}

impl OctopartClient {
    /// Create a client bound to `https://octopart.com/api/v3/`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn v3(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(api_key, ClientConfig::v3())
    }

    /// Create a client with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        tracing::debug!(
            base_url = %config.base_url,
            api_path = %config.api_path,
            "Created Octopart client"
        );

        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Operations for one resource kind.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> Resource<'_> {
        Resource::new(self, kind)
    }

    /// Brand operations.
    #[must_use]
    pub fn brands(&self) -> Resource<'_> {
        self.resource(ResourceKind::Brand)
    }

    /// Category operations.
    #[must_use]
    pub fn categories(&self) -> Resource<'_> {
        self.resource(ResourceKind::Category)
    }

    /// Part operations.
    #[must_use]
    pub fn parts(&self) -> Resource<'_> {
        self.resource(ResourceKind::Part)
    }

    /// Seller operations.
    #[must_use]
    pub fn sellers(&self) -> Resource<'_> {
        self.resource(ResourceKind::Seller)
    }

    /// Assemble a request, appending response filters after `params`.
    #[must_use]
    pub fn build_request(
        &self,
        resource_path: &str,
        mut params: QueryParams,
        filters: Option<&FilterSpec>,
    ) -> ApiRequest {
        if let Some(filters) = filters {
            params.append(encode_filters(filters));
        }
        ApiRequest::new(&self.config, resource_path, params, &self.api_key)
    }

    /// Search parts within categories.
    ///
    /// `filters.uids` is renamed to `category_uids`; every other key
    /// (e.g. `include`) is passed through. All keys are sent as
    /// `filter[fields][<key>][]=` fragments.
    ///
    /// # Errors
    ///
    /// Returns error if a filter holds keyed (sub-mapping) values.
    pub fn build_parts_by_category(
        &self,
        filters: &FilterSpec,
        args: &[QueryArgs],
    ) -> Result<ApiRequest, ClientError> {
        let mut filters = filters.clone();
        filters.rename("uids", "category_uids");
        self.build_field_filtered("parts/search", args, &filters)
    }

    /// Search by field filters such as `parent_uid`.
    ///
    /// # Errors
    ///
    /// Returns error if a filter holds keyed (sub-mapping) values.
    pub fn build_categories_by_filter(
        &self,
        args: &[QueryArgs],
        filters: &FilterSpec,
    ) -> Result<ApiRequest, ClientError> {
        self.build_field_filtered("parts/search", args, filters)
    }

    /// Match parts against structured queries.
    ///
    /// # Errors
    ///
    /// Returns error if the match arguments cannot be encoded.
    pub fn build_parts_match(
        &self,
        args: &MatchArgs,
        filters: Option<&FilterSpec>,
    ) -> Result<ApiRequest, ClientError> {
        let params = encode_match_args(args)?;
        Ok(self.build_request("parts/match", params, filters))
    }

    fn build_field_filtered(
        &self,
        resource_path: &str,
        args: &[QueryArgs],
        filters: &FilterSpec,
    ) -> Result<ApiRequest, ClientError> {
        let mut params = encode_search_args(args);
        params.append(encode_field_filters(filters)?);
        Ok(ApiRequest::new(
            &self.config,
            resource_path,
            params,
            &self.api_key,
        ))
    }

    /// Search parts within categories.
    ///
    /// # Errors
    ///
    /// Returns error on encoding, network or API errors.
    pub async fn parts_by_category(&self, filters: &FilterSpec, args: &[QueryArgs]) -> ApiResult {
        let request = self.build_parts_by_category(filters, args)?;
        self.send(&request).await
    }

    /// Callback form of [`Self::parts_by_category`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn parts_by_category_with_callback(
        &self,
        filters: &FilterSpec,
        args: &[QueryArgs],
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        self.dispatch_built(self.build_parts_by_category(filters, args), Box::new(callback))
    }

    /// Search by field filters.
    ///
    /// # Errors
    ///
    /// Returns error on encoding, network or API errors.
    pub async fn categories_by_filter(&self, args: &[QueryArgs], filters: &FilterSpec) -> ApiResult {
        let request = self.build_categories_by_filter(args, filters)?;
        self.send(&request).await
    }

    /// Callback form of [`Self::categories_by_filter`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn categories_by_filter_with_callback(
        &self,
        args: &[QueryArgs],
        filters: &FilterSpec,
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        self.dispatch_built(self.build_categories_by_filter(args, filters), Box::new(callback))
    }

    /// Match parts against structured queries.
    ///
    /// # Errors
    ///
    /// Returns error on encoding, network or API errors.
    pub async fn parts_match(&self, args: &MatchArgs, filters: Option<&FilterSpec>) -> ApiResult {
        let request = self.build_parts_match(args, filters)?;
        self.send(&request).await
    }

    /// Callback form of [`Self::parts_match`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn parts_match_with_callback(
        &self,
        args: &MatchArgs,
        filters: Option<&FilterSpec>,
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        self.dispatch_built(self.build_parts_match(args, filters), Box::new(callback))
    }

    /// Issue a request and wait for its decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on network failure,
    /// [`ClientError::Api`] on a non-200 status and [`ClientError::Decode`]
    /// when the body is not JSON.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult {
        let response = issue(&self.http, request).await?;
        read_response(response).await
    }

    /// Issue a request on a spawned task.
    ///
    /// With a callback, the response is classified and the callback runs
    /// exactly once with the result. Without one, the request is still
    /// issued but nothing reads the response; the raw response is available
    /// from [`RequestHandle::join`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn dispatch(&self, request: ApiRequest, callback: Option<Callback>) -> RequestHandle {
        let http = self.http.clone();
        let task = tokio::spawn(async move {
            let outcome = issue(&http, &request).await;
            match callback {
                Some(callback) => {
                    let result = match outcome {
                        Ok(response) => read_response(response).await,
                        Err(e) => Err(ClientError::from(e)),
                    };
                    callback(result);
                    Ok(None)
                }
                None => outcome.map(Some).map_err(ClientError::from),
            }
        });
        RequestHandle { task }
    }

    /// Dispatch a request that may have failed to build; build errors are
    /// delivered through the callback like any other error.
    pub(crate) fn dispatch_built(
        &self,
        request: Result<ApiRequest, ClientError>,
        callback: Callback,
    ) -> RequestHandle {
        match request {
            Ok(request) => self.dispatch(request, Some(callback)),
            Err(e) => {
                tracing::debug!(error = %e, "Request rejected before dispatch");
                let task = tokio::spawn(async move {
                    callback(Err(e));
                    Ok(None)
                });
                RequestHandle { task }
            }
        }
    }
}

impl fmt::Debug for OctopartClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctopartClient")
            .field("config", &self.config)
            .field("api_key", &"***REDACTED***")
            .finish_non_exhaustive()
    }
}

async fn issue(http: &Client, request: &ApiRequest) -> Result<Response, reqwest::Error> {
    tracing::debug!(
        path = request.path(),
        params = request.params().len(),
        "GET Octopart resource"
    );

    http.get(request.url())
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(reqwest::Error::without_url)
}

async fn read_response(response: Response) -> ApiResult {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(reqwest::Error::without_url)?;

    if status != 200 {
        tracing::warn!(status, "Octopart API returned an error status");
    }

    classify_response(status, &body)
}

/// Handle to a dispatched request.
///
/// Dropping the handle does not cancel the request; call
/// [`RequestHandle::abort`] for that.
#[derive(Debug)]
pub struct RequestHandle {
    task: JoinHandle<Result<Option<Response>, ClientError>>,
}

impl RequestHandle {
    /// Cancel the in-flight request. A pending callback will not run.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Whether the request task has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task.
    ///
    /// Yields `Ok(None)` when a callback consumed the result and
    /// `Ok(Some(response))` for a dispatch without callback.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Aborted`] if the request was cancelled,
    /// [`ClientError::Transport`] if a callback-less request failed, or
    /// [`ClientError::Task`] if the task panicked.
    pub async fn join(self) -> Result<Option<Response>, ClientError> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(ClientError::Aborted),
            Err(e) => Err(ClientError::Task(e.to_string())),
        }
    }
}

/// Errors that can occur with the Octopart client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Arguments cannot form a valid request
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Arguments could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Network, DNS or TLS failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// API returned a non-200 status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `message` field of the error body
        message: String,
    },
    /// Response body was not valid JSON
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// Request was cancelled through its handle
    #[error("request aborted")]
    Aborted,
    /// Request task panicked
    #[error("request task failed: {0}")]
    Task(String),
}

impl ClientError {
    /// HTTP status for API errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
