//! Typed message values
//!
//! Bundles are authored as JSON, but every leaf is one of three shapes:
//! a string, a list of strings, or a list of records. Loading converts the
//! JSON tree into [`MessageValue`] once so call sites ask for the shape they
//! expect instead of probing untyped JSON.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A mapping of keys to message values (a nested group or one list item)
pub type Record = BTreeMap<String, MessageValue>;

/// One node of a message bundle
#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    Text(String),
    List(Vec<String>),
    Records(Vec<Record>),
    Group(Record),
}

/// The shape of a [`MessageValue`], for mismatch reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Text,
    List,
    Records,
    Group,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Text => write!(f, "string"),
            Shape::List => write!(f, "string list"),
            Shape::Records => write!(f, "record list"),
            Shape::Group => write!(f, "group"),
        }
    }
}

impl MessageValue {
    pub fn shape(&self) -> Shape {
        match self {
            MessageValue::Text(_) => Shape::Text,
            MessageValue::List(_) => Shape::List,
            MessageValue::Records(_) => Shape::Records,
            MessageValue::Group(_) => Shape::Group,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Record> {
        match self {
            MessageValue::Group(record) => Some(record),
            _ => None,
        }
    }

    /// Convert back to JSON for display or export
    pub fn to_json(&self) -> Value {
        match self {
            MessageValue::Text(s) => Value::String(s.clone()),
            MessageValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            MessageValue::Records(records) => {
                Value::Array(records.iter().map(record_to_json).collect())
            }
            MessageValue::Group(record) => record_to_json(record),
        }
    }

    /// Convert a JSON node found at `path` into a message value.
    ///
    /// Numbers, booleans, `null` and arrays mixing strings with objects are
    /// rejected with a message naming the offending path.
    pub fn from_json(value: Value, path: &str) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(MessageValue::Text(s)),
            Value::Object(map) => Ok(MessageValue::Group(record_from_json(map, path)?)),
            Value::Array(items) => array_from_json(items, path),
            other => Err(format!(
                "unsupported value at '{}': {} (expected string, array or object)",
                display_path(path),
                other
            )),
        }
    }
}

/// Walk `path` (dot separated) from `root`.
///
/// Any missing segment, or an intermediate segment that is not a group,
/// yields `None`.
pub fn walk<'a>(root: &'a Record, path: &str) -> Option<&'a MessageValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = current.as_group()?.get(segment)?;
    }
    Some(current)
}

fn record_to_json(record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

fn record_from_json(map: serde_json::Map<String, Value>, path: &str) -> Result<Record, String> {
    let mut record = Record::new();
    for (key, value) in map {
        if key.contains('.') {
            return Err(format!(
                "key '{}' under '{}' contains '.', which cannot be addressed by a dotted path",
                key,
                display_path(path)
            ));
        }
        let child_path = join_path(path, &key);
        let child = MessageValue::from_json(value, &child_path)?;
        record.insert(key, child);
    }
    Ok(record)
}

fn array_from_json(items: Vec<Value>, path: &str) -> Result<MessageValue, String> {
    if items.iter().all(Value::is_string) {
        let strings = items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        return Ok(MessageValue::List(strings));
    }

    if items.iter().all(Value::is_object) {
        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if let Value::Object(map) = item {
                records.push(record_from_json(map, &format!("{}[{}]", path, i))?);
            }
        }
        return Ok(MessageValue::Records(records));
    }

    Err(format!(
        "array at '{}' must contain only strings or only objects",
        display_path(path)
    ))
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
