//! # Octopart Query
//!
//! Pure query-string encoding for the Octopart v3 REST API.
//!
//! ## Encoding Rules
//!
//! - **Response filters**: `show[]=v`, `hide[]=v`, `slice[field]=start:end`
//! - **Search filters**: `filter[fields][<field>][]=v`
//! - **Facets / stats**: `facet[fields][<field>][<transform>]=v`, `stats[...]`
//! - **Match arguments**: `key=<escaped JSON>`, except `include[]=v`
//!
//! Values are percent-escaped as URI components; field names are used
//! verbatim. Caller order is preserved everywhere and nothing here performs
//! I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregates;
pub mod args;
pub mod encoding;
pub mod filters;
pub mod params;

pub use aggregates::{encode_facets, encode_stats, AggregateSpec, FacetSpec, StatSpec, Transform};
pub use args::{encode_match_args, encode_search_args, encode_uids, Ids, MatchArgs, QueryArgs};
pub use encoding::{escape, unescape, EncodeError};
pub use filters::{encode_field_filters, encode_filters, FilterItem, FilterSpec};
pub use params::{QueryParams, Scalar};
