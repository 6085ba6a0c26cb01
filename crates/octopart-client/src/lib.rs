//! # Octopart Client
//!
//! Async HTTP client for the Octopart v3 electronic-parts search API.
//!
//! ## Request Contract
//!
//! - Every call is `GET https://octopart.com/api/v3/<path>?<query>&apikey=<key>`
//!   with `Accept: application/json`
//! - Query order: operation parameters, then filters, then `apikey`
//! - A 200 body is decoded as JSON; any other status becomes
//!   [`ClientError::Api`] carrying the body's `message`
//!
//! Results are either awaited or handed to a callback from a spawned task
//! whose [`RequestHandle`] can abort the request.
//!
//! ```no_run
//! # async fn demo() -> Result<(), octopart_client::ClientError> {
//! use octopart_client::{FilterSpec, OctopartClient};
//!
//! let client = OctopartClient::v3("my-api-key")?;
//! let filters = FilterSpec::new().show(["mpn", "brand.name"]);
//! let parts = client.parts().by_id(["2239e3330e2df5fe"], Some(&filters)).await?;
//! println!("{parts}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod request;
pub mod resource;

pub use client::{ApiResult, Callback, ClientError, OctopartClient, RequestHandle};
pub use config::{ClientConfig, API_V3_PATH, DEFAULT_BASE_URL};
pub use request::{classify_response, ApiRequest};
pub use resource::{Resource, ResourceKind};

pub use octopart_query::{
    FacetSpec, FilterItem, FilterSpec, Ids, MatchArgs, QueryArgs, QueryParams, Scalar, StatSpec,
    Transform,
};
