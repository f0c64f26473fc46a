use super::repr::{render_sequence, render_value};
use super::{FlatRecord, Scalar};
use crate::error::HarvestError;
use serde_json::Value;

/// Separator used for listing and record flattening unless a caller overrides it.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Flatten a nested JSON value into a single-level record.
///
/// Object keys are joined onto `prefix` with `separator`. An array whose first
/// element is an object is treated as a sequence of records and expanded by
/// index; any other array is stored as one rendered value. Scalars are stored
/// unchanged.
///
/// Only the first element decides how an array is treated, so an array such
/// as `[{"x": 1}, 5]` is expanded and its second element lands under the
/// `<prefix><sep>1` key.
///
/// # Errors
///
/// Fails with [`HarvestError::TypeKind`] when `prefix` is empty and `value`
/// would have to be stored as a single value, since there is no key for it.
pub fn flatten(value: &Value, prefix: &str, separator: &str) -> Result<FlatRecord, HarvestError> {
    if prefix.is_empty() && !expands(value) {
        return Err(HarvestError::TypeKind { kind: kind_name(value) });
    }

    let mut record = FlatRecord::new();
    flatten_into(value, prefix, separator, &mut record);
    Ok(record)
}

/// Flatten the objects of a record while keeping every array as one value.
///
/// Only object keys contribute to column names, so records whose arrays differ
/// in length still share the same columns. This is the shape used for the
/// metadata and listing tables written during a harvest.
///
/// # Errors
///
/// Fails with [`HarvestError::TypeKind`] when `value` is not an object.
pub fn normalize(value: &Value, separator: &str) -> Result<FlatRecord, HarvestError> {
    let Value::Object(map) = value else {
        return Err(HarvestError::TypeKind { kind: kind_name(value) });
    };

    let mut record = FlatRecord::new();
    for (key, item) in map {
        normalize_into(item, key, separator, &mut record);
    }
    Ok(record)
}

fn normalize_into(value: &Value, prefix: &str, separator: &str, out: &mut FlatRecord) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                normalize_into(item, &join(prefix, separator, key), separator, out);
            }
        }
        Value::Array(_) => out.insert(prefix, Scalar::String(render_value(value).into())),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            if let Some(scalar) = Scalar::from_json(value) {
                out.insert(prefix, scalar);
            }
        }
    }
}

fn flatten_into(value: &Value, prefix: &str, separator: &str, out: &mut FlatRecord) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(item, &join(prefix, separator, key), separator, out);
            }
        }
        Value::Array(items) if is_record_sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, &join(prefix, separator, &i.to_string()), separator, out);
            }
        }
        Value::Array(items) => out.insert(prefix, Scalar::String(render_sequence(items).into())),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            if let Some(scalar) = Scalar::from_json(value) {
                out.insert(prefix, scalar);
            }
        }
    }
}

fn is_record_sequence(items: &[Value]) -> bool {
    items.first().is_some_and(Value::is_object)
}

fn expands(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => is_record_sequence(items),
        _ => false,
    }
}

fn join(prefix: &str, separator: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{separator}{key}")
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
