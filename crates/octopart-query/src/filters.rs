//! Response filters and their bracket-notation encodings.
//!
//! A [`FilterSpec`] is an ordered mapping from field name to a list of
//! items. Each item is either a plain scalar or a keyed pair used for
//! range-style filters:
//!
//! ```text
//! show  -> ["mpn", "brand"]          show[]=mpn&show[]=brand
//! slice -> [{offers: "1:5"}]         slice[offers]=1%3A5
//! ```
//!
//! Two encodings exist. [`encode_filters`] produces the response-shaping
//! form above. [`encode_field_filters`] produces the
//! `filter[fields][<k>][]=<v>` form used by search endpoints; it accepts
//! plain scalars only.

use crate::encoding::{escape, EncodeError};
use crate::params::{QueryParams, Scalar};
use serde_json::Value;

/// One value under a filter field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterItem {
    /// Plain value, encoded as `field[]=value`
    Value(Scalar),
    /// Keyed value, encoded as `field[key]=value`
    Keyed {
        /// Sub-key placed inside the brackets
        key: String,
        /// Value after `=`
        value: Scalar,
    },
}

impl From<Scalar> for FilterItem {
    fn from(value: Scalar) -> Self {
        Self::Value(value)
    }
}

/// Ordered filter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    fields: Vec<(String, Vec<FilterItem>)>,
}

impl FilterSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to the given values, replacing any previous entry in place.
    #[must_use]
    pub fn field<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let items = values.into_iter().map(|v| FilterItem::Value(v.into()));
        self.set(name, items.collect());
        self
    }

    /// Set `name` to a single value.
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.field(name, [value])
    }

    /// Fields to include in the response (`show[]=`).
    #[must_use]
    pub fn show<I, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.field("show", fields)
    }

    /// Fields to omit from the response (`hide[]=`).
    #[must_use]
    pub fn hide<I, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.field("hide", fields)
    }

    /// Restrict an array field to a `start:end` range (`slice[field]=`).
    ///
    /// Repeated calls accumulate under the same `slice` entry.
    #[must_use]
    pub fn slice(mut self, field: impl Into<String>, range: impl Into<String>) -> Self {
        self.push(
            "slice",
            FilterItem::Keyed {
                key: field.into(),
                value: Scalar::Str(range.into()),
            },
        );
        self
    }

    /// Append an item to `name`, creating the field at the end if absent.
    pub fn push(&mut self, name: impl Into<String>, item: FilterItem) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, items)) => items.push(item),
            None => self.fields.push((name, vec![item])),
        }
    }

    /// Replace the items of `name`, keeping its position if it already exists.
    pub fn set(&mut self, name: impl Into<String>, items: Vec<FilterItem>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = items,
            None => self.fields.push((name, items)),
        }
    }

    /// Items of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[FilterItem]> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, items)| items.as_slice())
    }

    /// Remove `name` and return its items.
    pub fn remove(&mut self, name: &str) -> Option<Vec<FilterItem>> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Move the items of `from` to a new field `to` at the end of the spec.
    ///
    /// Returns `false` when `from` is absent.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> bool {
        let Some(items) = self.remove(from) else {
            return false;
        };
        let to = to.into();
        self.fields.retain(|(k, _)| *k != to);
        self.fields.push((to, items));
        true
    }

    /// Whether the spec has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field, items)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FilterItem])> {
        self.fields
            .iter()
            .map(|(k, items)| (k.as_str(), items.as_slice()))
    }

    /// Build a spec from a JSON object.
    ///
    /// Accepted field values:
    ///
    /// - a scalar
    /// - an object of scalars (each key becomes a keyed item)
    /// - an array whose elements are scalars or objects of scalars
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedShape`] for anything else: `null`,
    /// nested arrays, or objects holding non-scalar values. A non-object
    /// top-level value is reported against the field name `<root>`.
    pub fn from_json(value: &Value) -> Result<Self, EncodeError> {
        let Value::Object(map) = value else {
            return Err(EncodeError::UnsupportedShape {
                field: "<root>".to_string(),
                reason: "filters must be a JSON object".to_string(),
            });
        };

        let mut spec = Self::new();
        for (field, raw) in map {
            let mut items = Vec::new();
            match raw {
                Value::Array(elements) => {
                    for element in elements {
                        collect_item(field, element, &mut items)?;
                    }
                }
                other => collect_item(field, other, &mut items)?,
            }
            spec.set(field.clone(), items);
        }
        Ok(spec)
    }
}

impl TryFrom<&Value> for FilterSpec {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

fn collect_item(field: &str, value: &Value, out: &mut Vec<FilterItem>) -> Result<(), EncodeError> {
    if let Some(scalar) = Scalar::from_json(value) {
        out.push(FilterItem::Value(scalar));
        return Ok(());
    }

    match value {
        Value::Object(sub) => {
            for (key, v) in sub {
                let scalar = Scalar::from_json(v).ok_or_else(|| EncodeError::UnsupportedShape {
                    field: field.to_string(),
                    reason: format!("sub-key `{key}` must hold a scalar"),
                })?;
                out.push(FilterItem::Keyed {
                    key: key.clone(),
                    value: scalar,
                });
            }
            Ok(())
        }
        Value::Array(_) => Err(EncodeError::UnsupportedShape {
            field: field.to_string(),
            reason: "nested arrays are not allowed".to_string(),
        }),
        _ => Err(EncodeError::UnsupportedShape {
            field: field.to_string(),
            reason: "null is not a filter value".to_string(),
        }),
    }
}

/// Encode response filters as `field[]=value` / `field[key]=value`.
#[must_use]
pub fn encode_filters(spec: &FilterSpec) -> QueryParams {
    spec.iter()
        .flat_map(|(field, items)| {
            items.iter().map(move |item| match item {
                FilterItem::Value(v) => format!("{field}[]={}", escape(&v.to_string())),
                FilterItem::Keyed { key, value } => {
                    format!("{field}[{key}]={}", escape(&value.to_string()))
                }
            })
        })
        .collect()
}

/// Encode search filters as `filter[fields][field][]=value`.
///
/// # Errors
///
/// Returns [`EncodeError::NestedFilterUnsupported`] if any field holds a
/// keyed item.
pub fn encode_field_filters(spec: &FilterSpec) -> Result<QueryParams, EncodeError> {
    let mut params = QueryParams::new();
    for (field, items) in spec.iter() {
        for item in items {
            match item {
                FilterItem::Value(v) => {
                    params.push(format!(
                        "filter[fields][{field}][]={}",
                        escape(&v.to_string())
                    ));
                }
                FilterItem::Keyed { .. } => {
                    return Err(EncodeError::NestedFilterUnsupported {
                        field: field.to_string(),
                    });
                }
            }
        }
    }
    Ok(params)
}
