//! Dynamically typed option values for the name-based `set`/`get` API.

use serde::{Deserialize, Serialize};

use crate::enums::OptionEnum;
use crate::error::{ConfigError, Result};

/// A scalar option value crossing the name-based boundary.
///
/// Enumerated options accept either their name (`Str`) or their wire code (`Int`);
/// reads always report the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Str(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

fn invalid(option: &str, value: &OptionValue, expected: impl Into<String>) -> ConfigError {
    ConfigError::InvalidOption {
        option: option.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
}

/// Decode an enumerated option from its name or wire code.
pub(crate) fn decode_enum<T: OptionEnum>(option: &str, value: &OptionValue) -> Result<T> {
    let decoded = match value {
        OptionValue::Str(name) => T::from_name(name),
        OptionValue::Int(code) => u8::try_from(*code).ok().and_then(T::from_code),
        OptionValue::Bool(_) => None,
    };
    decoded.ok_or_else(|| invalid(option, value, format!("one of: {}", T::expected())))
}

pub(crate) fn decode_bool(option: &str, value: &OptionValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid(option, value, "a boolean"))
}

pub(crate) fn decode_u32(option: &str, value: &OptionValue) -> Result<u32> {
    value
        .as_int()
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| invalid(option, value, "a non-negative integer"))
}

pub(crate) fn decode_string(option: &str, value: &OptionValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(option, value, "a string"))
}

/// Assign `decoded` into `slot` only once decoding succeeded.
pub(crate) fn store<T>(slot: &mut Option<T>, decoded: Result<T>) -> Result<()> {
    *slot = Some(decoded?);
    Ok(())
}

/// Current value of a slot: the explicit value (if any) and the documented default.
pub(crate) fn read<T: Clone + Into<OptionValue>>(
    slot: &Option<T>,
    default: T,
) -> (Option<OptionValue>, OptionValue) {
    (slot.clone().map(Into::into), default.into())
}
