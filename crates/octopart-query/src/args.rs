//! Operation arguments: search queries, match requests and identifiers.

use crate::encoding::{escape, EncodeError};
use crate::params::{QueryParams, Scalar};
use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

/// One search query object, form-encoded as `key=value&key=value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    params: Vec<(String, Vec<Scalar>)>,
}

impl QueryArgs {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a free-text query (`q=...`).
    #[must_use]
    pub fn q(query: impl Into<String>) -> Self {
        Self::new().param("q", query.into())
    }

    /// Set `key` to a single value.
    #[must_use]
    pub fn param(self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.params_of(key, [value])
    }

    /// Set `key` to several values; the key is repeated once per value.
    #[must_use]
    pub fn params_of<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let key = key.into();
        let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.params.push((key, values)),
        }
        self
    }

    /// Whether the query carries no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Form-encode this query.
    #[must_use]
    pub fn to_form(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.params {
            for value in values {
                serializer.append_pair(key, &value.to_string());
            }
        }
        serializer.finish()
    }

    /// Build a query from a JSON object of scalars or arrays of scalars.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedShape`] for nested objects, nested
    /// arrays or a non-object input.
    pub fn from_json(value: &Value) -> Result<Self, EncodeError> {
        let Value::Object(map) = value else {
            return Err(EncodeError::UnsupportedShape {
                field: "<root>".to_string(),
                reason: "query must be a JSON object".to_string(),
            });
        };

        let mut args = Self::new();
        for (key, raw) in map {
            let values = match raw {
                // querystring semantics: null serializes as an empty value
                Value::Null => vec![Scalar::Str(String::new())],
                Value::Array(elements) => elements
                    .iter()
                    .map(|e| scalar_or_shape_error(key, e))
                    .collect::<Result<_, _>>()?,
                other => vec![scalar_or_shape_error(key, other)?],
            };
            args = args.params_of(key.clone(), values);
        }
        Ok(args)
    }

    /// Build a query from any serializable struct or map.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails or produces an unsupported shape.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, EncodeError> {
        let json = serde_json::to_value(value).map_err(|e| EncodeError::Serialize(e.to_string()))?;
        Self::from_json(&json)
    }
}

impl TryFrom<&Value> for QueryArgs {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

fn scalar_or_shape_error(key: &str, value: &Value) -> Result<Scalar, EncodeError> {
    Scalar::from_json(value).ok_or_else(|| EncodeError::UnsupportedShape {
        field: key.to_string(),
        reason: "search arguments must be scalars or arrays of scalars".to_string(),
    })
}

/// Form-encode each query object into one fragment, skipping empty ones.
#[must_use]
pub fn encode_search_args(args: &[QueryArgs]) -> QueryParams {
    args.iter()
        .filter(|a| !a.is_empty())
        .map(QueryArgs::to_form)
        .collect()
}

/// Arguments for `parts/match`.
///
/// An ordered mapping that always contains `queries`. Every key except
/// `include` is sent as escaped JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArgs {
    entries: Map<String, Value>,
}

impl MatchArgs {
    /// Start from a list of part queries (e.g. `{"mpn": "SN74S74N"}`).
    #[must_use]
    pub fn new<I>(queries: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut entries = Map::new();
        entries.insert("queries".to_string(), Value::Array(queries.into_iter().collect()));
        Self { entries }
    }

    /// Start from a list of serializable part queries.
    ///
    /// # Errors
    ///
    /// Returns error if a query cannot be serialized.
    pub fn from_queries<T: Serialize>(queries: &[T]) -> Result<Self, EncodeError> {
        let values = queries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EncodeError::Serialize(e.to_string()))?;
        Ok(Self::new(values))
    }

    /// Only return exact MPN/SKU matches.
    #[must_use]
    pub fn exact_only(self, exact: bool) -> Self {
        self.arg("exact_only", Value::Bool(exact))
    }

    /// Ask for extra result sections; sent as repeated `include[]=`.
    #[must_use]
    pub fn include<I, S>(self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = sections.into_iter().map(|s| Value::String(s.into())).collect();
        self.arg("include", Value::Array(list))
    }

    /// Set an arbitrary key, replacing any existing value in place.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Build from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::MissingField`] if `queries` is absent, or
    /// [`EncodeError::UnsupportedShape`] if the input is not an object.
    pub fn from_json(value: &Value) -> Result<Self, EncodeError> {
        let Value::Object(map) = value else {
            return Err(EncodeError::UnsupportedShape {
                field: "<root>".to_string(),
                reason: "match arguments must be a JSON object".to_string(),
            });
        };
        if !map.contains_key("queries") {
            return Err(EncodeError::MissingField("queries".to_string()));
        }
        Ok(Self {
            entries: map.clone(),
        })
    }
}

impl TryFrom<&Value> for MatchArgs {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

/// Encode match arguments.
///
/// `include` is sent unquoted (`include[]=datasheets`) because the API
/// rejects JSON-quoted section names; everything else is
/// `key=<escaped JSON>`.
///
/// # Errors
///
/// Returns error if an `include` item is not a scalar or a value cannot be
/// serialized.
pub fn encode_match_args(args: &MatchArgs) -> Result<QueryParams, EncodeError> {
    let mut params = QueryParams::new();
    for (key, value) in &args.entries {
        if key == "include" {
            match value {
                Value::Array(items) => {
                    for item in items {
                        let scalar = Scalar::from_json(item).ok_or_else(|| {
                            EncodeError::UnsupportedShape {
                                field: key.clone(),
                                reason: "include items must be scalars".to_string(),
                            }
                        })?;
                        params.push(format!("{key}[]={}", escape(&scalar.to_string())));
                    }
                }
                other => {
                    let text = Scalar::from_json(other).map_or_else(
                        || other.to_string(),
                        |scalar| scalar.to_string(),
                    );
                    params.push(format!("{key}={}", escape(&text)));
                }
            }
        } else {
            let json =
                serde_json::to_string(value).map_err(|e| EncodeError::Serialize(e.to_string()))?;
            params.push(format!("{key}={}", escape(&json)));
        }
    }
    Ok(params)
}

/// Identifiers for a by-id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ids {
    /// A single identifier, fetched directly
    One(String),
    /// An ordered list, fetched through `get_multi`
    Many(Vec<String>),
}

impl From<&str> for Ids {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for Ids {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Ids {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for Ids {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Ids {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Ids {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Encode identifiers as repeated `uid[]=` fragments, in input order.
#[must_use]
pub fn encode_uids(ids: &[String]) -> QueryParams {
    ids.iter().map(|id| format!("uid[]={}", escape(id))).collect()
}
