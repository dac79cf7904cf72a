use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{AppError, AppResult, params_parse_error};

/// Canonical text form for date/time values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value bound to a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    DateTime(NaiveDateTime),
    List(Vec<ParamValue>),
    Object(IndexMap<CompactString, ParamValue>)
}

impl ParamValue {
    /// Convert to JSON with date/time values in canonical text form
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::UInt(u) => Value::Number((*u).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Str(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect::<Map<_, _>>()
            )
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (CompactString::from(k), Self::from(v)))
                    .collect()
            )
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Placeholder syntax a parameter set binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Positional,
    /// `:name`
    Named
}

/// Escape rules inside quoted string literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringEscapes {
    /// Only a doubled quote escapes a quote
    #[default]
    Standard,
    /// A backslash also escapes the next character
    Backslash
}

/// Bound parameters of one statement.
///
/// The variant is chosen by whoever built the statement, so a named set
/// whose keys look numeric is still matched by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSet {
    Positional(Vec<ParamValue>),
    Named(IndexMap<CompactString, ParamValue>)
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl ParameterSet {
    /// Build a named set from `(name, value)` pairs
    pub fn named<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<CompactString>,
        V: Into<ParamValue>
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        )
    }

    /// Build a positional set
    pub fn positional<V: Into<ParamValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Parse from a JSON array (positional) or object (named)
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Array(items) => Ok(Self::Positional(
                items.into_iter().map(ParamValue::from).collect()
            )),
            Value::Object(fields) => Ok(Self::Named(
                fields
                    .into_iter()
                    .map(|(k, v)| (CompactString::from(k), ParamValue::from(v)))
                    .collect()
            )),
            other => Err(params_parse_error(format!(
                "expected a JSON array or object, got {}",
                other
            )))
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        match self {
            Self::Positional(_) => PlaceholderStyle::Positional,
            Self::Named(_) => PlaceholderStyle::Named
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(values) => values.len(),
            Self::Named(values) => values.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the value a placeholder token refers to
    pub fn get(&self, token: &PlaceholderToken) -> Option<&ParamValue> {
        match (self, token) {
            (Self::Positional(values), PlaceholderToken::Positional(index)) => values.get(*index),
            (Self::Named(values), PlaceholderToken::Named(name)) => values.get(name.as_str()),
            _ => None
        }
    }
}

/// Declared database type of a bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Integer,
    Float,
    String,
    Boolean,
    DateTime,
    Date,
    Time,
    Json,
    Binary,
    IntegerArray,
    StringArray
}

impl ParamType {
    /// Element type of list kinds
    pub fn element_type(self) -> Option<ParamType> {
        match self {
            Self::IntegerArray => Some(Self::Integer),
            Self::StringArray => Some(Self::String),
            _ => None
        }
    }

    pub fn is_list(self) -> bool {
        self.element_type().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Json => "json",
            Self::Binary => "binary",
            Self::IntegerArray => "integer[]",
            Self::StringArray => "string[]"
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "bigint" | "smallint" => Ok(Self::Integer),
            "float" | "decimal" | "double" => Ok(Self::Float),
            "string" | "str" | "text" => Ok(Self::String),
            "boolean" | "bool" => Ok(Self::Boolean),
            "datetime" | "timestamp" => Ok(Self::DateTime),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "json" | "array" | "object" => Ok(Self::Json),
            "binary" | "blob" => Ok(Self::Binary),
            "integer[]" | "int[]" | "int_array" => Ok(Self::IntegerArray),
            "string[]" | "str[]" | "str_array" => Ok(Self::StringArray),
            other => Err(params_parse_error(format!("unknown parameter type '{}'", other)))
        }
    }
}

/// Declared types, parallel in shape to [`ParameterSet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHints {
    Positional(Vec<Option<ParamType>>),
    Named(IndexMap<CompactString, ParamType>)
}

impl Default for TypeHints {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl TypeHints {
    pub fn positional(types: impl IntoIterator<Item = Option<ParamType>>) -> Self {
        Self::Positional(types.into_iter().collect())
    }

    pub fn named<K: Into<CompactString>>(pairs: impl IntoIterator<Item = (K, ParamType)>) -> Self {
        Self::Named(pairs.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    /// Parse from a JSON array of type names (or nulls) or an object of
    /// name to type name
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    Value::String(name) => name.parse::<ParamType>().map(Some),
                    other => Err(params_parse_error(format!(
                        "type name must be a string, got {}",
                        other
                    )))
                })
                .collect::<AppResult<Vec<_>>>()
                .map(Self::Positional),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(key, item)| match item {
                    Value::String(name) => Ok((CompactString::from(key), name.parse::<ParamType>()?)),
                    other => Err(params_parse_error(format!(
                        "type of '{}' must be a string, got {}",
                        key, other
                    )))
                })
                .collect::<AppResult<IndexMap<_, _>>>()
                .map(Self::Named),
            other => Err(params_parse_error(format!(
                "expected a JSON array or object of types, got {}",
                other
            )))
        }
    }

    /// Declared type for a placeholder token
    pub fn get(&self, token: &PlaceholderToken) -> Option<ParamType> {
        match (self, token) {
            (Self::Positional(types), PlaceholderToken::Positional(index)) => {
                types.get(*index).copied().flatten()
            }
            (Self::Named(types), PlaceholderToken::Named(name)) => {
                types.get(name.as_str()).copied()
            }
            _ => None
        }
    }
}

/// Placeholder reference found in SQL text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderToken {
    /// Zero-based ordinal of a `?`
    Positional(usize),
    /// Identifier after `:`
    Named(CompactString)
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional(index) => write!(f, "?#{}", index),
            Self::Named(name) => write!(f, ":{}", name)
        }
    }
}

/// Placeholder location within SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderOccurrence {
    /// Byte offset of the `?` or `:`
    pub offset: usize,
    /// Byte length of the whole token
    pub len:    usize,
    pub token:  PlaceholderToken
}

impl PlaceholderOccurrence {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}
