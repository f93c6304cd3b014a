use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::dates::{DATE_FORMAT, TIMESTAMP_FORMAT};

/// Value bound to a `:name` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Unset criterion. Its clause is absent from the query text, so the
    /// value is never actually bound.
    Null,
    Text(String),
    /// Expanded into a membership list wherever it is bound.
    TextList(Vec<String>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::TextList(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        ParamValue::Date(value)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(value: NaiveDateTime) -> Self {
        ParamValue::Timestamp(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("NULL"),
            ParamValue::Text(text) => write!(f, "{text:?}"),
            ParamValue::TextList(items) => write!(f, "{items:?}"),
            ParamValue::Date(date) => {
                write!(f, "{}", date.format(DATE_FORMAT))
            }
            ParamValue::Timestamp(ts) => {
                write!(f, "{}", ts.format(TIMESTAMP_FORMAT))
            }
        }
    }
}

/// Named parameters, keyed by placeholder name (without the colon).
pub type Params = BTreeMap<&'static str, ParamValue>;

/// Query text with `:name` placeholders plus the values to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Params,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, params: Params) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}
