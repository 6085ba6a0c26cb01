//! Facet and stat directives.
//!
//! Each entry names a field, a [`Transform`] and a value:
//!
//! ```text
//! facet[fields][brand.name][include]=true
//! stats[fields][specs.capacitance.value][limit]=10
//! ```
//!
//! Transform tags are matched leniently: anything outside the known set is
//! treated as `include` rather than rejected.

use crate::encoding::{escape, EncodeError};
use crate::params::{QueryParams, Scalar};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Transform tag applied to a facet or stat field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Include the field in the aggregation
    #[default]
    Include,
    /// Compute the aggregation ignoring the filter on this field
    ExcludeFilter,
    /// Offset into the aggregation buckets
    Start,
    /// Maximum number of aggregation buckets
    Limit,
}

impl Transform {
    /// Wire name of the tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::ExcludeFilter => "exclude_filter",
            Self::Start => "start",
            Self::Limit => "limit",
        }
    }

    /// Parse a tag exactly.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "include" => Some(Self::Include),
            "exclude_filter" => Some(Self::ExcludeFilter),
            "start" => Some(Self::Start),
            "limit" => Some(Self::Limit),
            _ => None,
        }
    }

    /// Parse a tag, falling back to [`Transform::Include`] when it is absent
    /// or unknown.
    ///
    /// ```
    /// use octopart_query::Transform;
    ///
    /// assert_eq!(Transform::parse_or_include(Some("limit")), Transform::Limit);
    /// assert_eq!(Transform::parse_or_include(Some("foo")), Transform::Include);
    /// assert_eq!(Transform::parse_or_include(None), Transform::Include);
    /// ```
    #[must_use]
    pub fn parse_or_include(tag: Option<&str>) -> Self {
        tag.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `field → transform → value` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    /// Field being aggregated
    pub field: String,
    /// Transform tag
    pub transform: Transform,
    /// Value for the tag
    pub value: Scalar,
}

/// Ordered list of aggregation directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSpec {
    entries: Vec<AggregateEntry>,
}

/// Facet directives (`facet[fields]...`).
pub type FacetSpec = AggregateSpec;

/// Stat directives (`stats[fields]...`).
pub type StatSpec = AggregateSpec;

impl AggregateSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field` with the `include` transform.
    #[must_use]
    pub fn include(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.with(field, Transform::Include, value)
    }

    /// Add `field` with an explicit transform.
    #[must_use]
    pub fn with(
        mut self,
        field: impl Into<String>,
        transform: Transform,
        value: impl Into<Scalar>,
    ) -> Self {
        self.entries.push(AggregateEntry {
            field: field.into(),
            transform,
            value: value.into(),
        });
        self
    }

    /// Add `field` with a textual transform tag; unknown tags become `include`.
    #[must_use]
    pub fn tagged(self, field: impl Into<String>, tag: &str, value: impl Into<Scalar>) -> Self {
        self.with(field, Transform::parse_or_include(Some(tag)), value)
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[AggregateEntry] {
        &self.entries
    }

    /// Build a spec from a JSON object.
    ///
    /// `{"brand.name": true}` adds an `include` entry; `{"brand.name":
    /// {"limit": 10, "start": 5}}` adds one entry per tag.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedShape`] when the input is not an
    /// object or a value is neither a scalar nor an object of scalars.
    pub fn from_json(value: &Value) -> Result<Self, EncodeError> {
        let Value::Object(map) = value else {
            return Err(EncodeError::UnsupportedShape {
                field: "<root>".to_string(),
                reason: "aggregations must be a JSON object".to_string(),
            });
        };

        let mut spec = Self::new();
        for (field, raw) in map {
            if let Some(scalar) = Scalar::from_json(raw) {
                spec = spec.include(field.clone(), scalar);
                continue;
            }
            let Value::Object(tags) = raw else {
                return Err(EncodeError::UnsupportedShape {
                    field: field.clone(),
                    reason: "expected a scalar or an object of transform tags".to_string(),
                });
            };
            for (tag, v) in tags {
                let scalar = Scalar::from_json(v).ok_or_else(|| EncodeError::UnsupportedShape {
                    field: field.clone(),
                    reason: format!("transform `{tag}` must hold a scalar"),
                })?;
                spec = spec.tagged(field.clone(), tag, scalar);
            }
        }
        Ok(spec)
    }
}

impl TryFrom<&Value> for AggregateSpec {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

fn encode_with_prefix(prefix: &str, spec: &AggregateSpec) -> QueryParams {
    spec.entries
        .iter()
        .map(|e| {
            format!(
                "{prefix}[fields][{}][{}]={}",
                e.field,
                e.transform,
                escape(&e.value.to_string())
            )
        })
        .collect()
}

/// Encode facet directives.
#[must_use]
pub fn encode_facets(spec: &FacetSpec) -> QueryParams {
    encode_with_prefix("facet", spec)
}

/// Encode stat directives.
#[must_use]
pub fn encode_stats(spec: &StatSpec) -> QueryParams {
    encode_with_prefix("stats", spec)
}
