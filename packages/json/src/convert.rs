//! Conversions between `serde_json::Value` and graph values.

use fieldpath_core::{Addressable, Shared, Type, Value};

use crate::Error;

/// Convert a JSON document into an unstructured graph value.
///
/// Objects become `map[string]any` and arrays `[]any`, with every element
/// boxed in the interface. `null` becomes a nil interface.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Interface(None),
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::slice_of(Type::Interface, arr.into_iter().map(from_json))
        }
        serde_json::Value::Object(map) => Value::map_of(
            Type::String,
            Type::Interface,
            map.into_iter().map(|(k, v)| (k, from_json(v))),
        ),
    }
}

/// Load a JSON document as the root of a new unstructured graph.
pub fn unstructured(json: serde_json::Value) -> Shared {
    let root = from_json(json);
    log::debug!("loaded unstructured {} graph", root.type_of());
    root.into_shared()
}

/// Print any graph value as JSON. Structs print as objects keyed by field
/// name, nil values as `null`.
pub fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    Ok(serde_json::to_value(value)?)
}

/// Print the value a handle addresses as JSON.
pub fn read_json(handle: &Addressable) -> Result<serde_json::Value, Error> {
    to_json(&handle.try_as_interface()?)
}

/// Write a JSON value through a handle.
///
/// `null` writes the zero value of the addressed type, and integral
/// numbers are accepted by float slots; otherwise the converted value must
/// be assignable to the location.
pub fn write_json(handle: Addressable, json: serde_json::Value) -> Result<Addressable, Error> {
    let ty = handle.try_ty()?;
    let value = match (from_json(json), &ty) {
        (Value::Interface(None), _) => ty.zero_value(),
        (Value::Int(i), Type::Float) => Value::Float(i as f64),
        (value, _) => value,
    };
    log::trace!("writing JSON value of type {} into {}", value.type_of(), ty);
    Ok(handle.try_set(value)?)
}
