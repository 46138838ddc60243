//! Default value inference for action input arguments.
//!
//! When the caller does not provide a value for an input argument, a usable one
//! is guessed from the related state variable, explicit signals first:
//!
//! 1. an allowed-value list holding a single value
//! 2. a declared default, coerced to an integer for integer datatypes
//! 3. zero for unsigned integer datatypes
//! 4. the lower bound of an allowed-value range
//!
//! Anything else stays unresolved and must be supplied by the caller.

use std::fmt;

use tracing::trace;

use crate::actions::StateVariableDescriptor;

const INTEGER_TYPES: [&str; 4] = ["ui2", "ui4", "i2", "i4"];
const UNSIGNED_TYPES: [&str; 2] = ["ui2", "ui4"];

/// Value of a SOAP input argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(value) => write!(f, "{}", value),
            ArgValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Int(i64::from(value))
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

/// Picks a value for an argument bound to `descriptor`, or `None`.
pub fn infer_default(descriptor: &StateVariableDescriptor) -> Option<ArgValue> {
    if let Some(value) = single_allowed_value(descriptor) {
        trace!(variable = descriptor.name(), "default taken from allowed value list");
        return Some(ArgValue::Text(value.to_string()));
    }

    if let Some(value) = declared_default(descriptor) {
        trace!(variable = descriptor.name(), "default taken from declared default");
        return Some(value);
    }

    if descriptor
        .entries()
        .any(|(tag, value)| is_datatype(tag) && UNSIGNED_TYPES.contains(&value.trim()))
    {
        return Some(ArgValue::Int(0));
    }

    descriptor
        .entries()
        .filter(|(tag, _)| tag.to_lowercase().contains("range"))
        .find_map(|(_, value)| range_lower_bound(value))
        .map(ArgValue::Int)
}

fn single_allowed_value(descriptor: &StateVariableDescriptor) -> Option<&str> {
    descriptor
        .entries()
        .filter(|(tag, _)| tag.to_lowercase().contains("list"))
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty() && !value.contains(','))
}

/// Coerces the first declared default against the datatype seen before it.
fn declared_default(descriptor: &StateVariableDescriptor) -> Option<ArgValue> {
    let mut datatype = "";
    for (tag, value) in descriptor.entries() {
        if is_datatype(tag) {
            datatype = value.trim();
        } else if tag.to_lowercase().contains("default") {
            let value = value.trim();
            if INTEGER_TYPES.contains(&datatype) {
                if let Ok(number) = value.parse::<i64>() {
                    return Some(ArgValue::Int(number));
                }
            }
            return Some(ArgValue::Text(value.to_string()));
        }
    }
    None
}

fn range_lower_bound(value: &str) -> Option<i64> {
    let mut parts = value.split(',');
    let first = parts.next()?;
    parts.next()?;
    first.trim().parse().ok()
}

fn is_datatype(tag: &str) -> bool {
    tag.to_lowercase().contains("datatype")
}
