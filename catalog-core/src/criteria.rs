//! Caller-supplied search criteria.
//!
//! Every field is optional and is deserialized leniently: a value of the
//! wrong JSON type is treated exactly like an absent one, so a malformed
//! criterion narrows nothing instead of rejecting the request.

use serde::{Deserialize, Serialize};

/// Filter criteria for a catalog search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    /// Content category tag. Accepted and carried, not used for filtering.
    #[serde(
        rename = "type",
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,

    /// Case-insensitive substring matched against every title translation.
    #[serde(
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    #[serde(
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub kinds: Option<Vec<String>>,

    #[serde(
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub genres: Option<Vec<String>>,

    #[serde(
        deserialize_with = "lenient::date_range",
        skip_serializing_if = "Option::is_none"
    )]
    pub production_dates: Option<DateRange>,

    /// Channel identifiers.
    #[serde(
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub sources: Option<Vec<String>>,

    #[serde(
        deserialize_with = "lenient::date_range",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_dates: Option<DateRange>,
}

/// Unparsed `from`/`to` pair. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_owned),
            to: to.map(str::to_owned),
        }
    }

    /// A range counts as present when at least one bound is a string.
    pub fn has_bound(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::DateRange;

    pub(super) fn string<'de, D>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub(super) fn string_list<'de, D>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    pub(super) fn date_range<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateRange>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => {
                let bound = |key: &str| {
                    map.get(key).and_then(Value::as_str).map(str::to_owned)
                };
                Some(DateRange {
                    from: bound("from"),
                    to: bound("to"),
                })
            }
            _ => None,
        })
    }
}
