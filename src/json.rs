//! JSON helpers.

use serde_json::{Map as JsonMap, Value};

pub(crate) use self::nullable::Nullable;

mod nullable;

/// Returns a map with single key-value entry.
pub(crate) fn single_entry_map(
    id: impl Into<String>,
    value: impl Into<Value>,
) -> JsonMap<String, Value> {
    let mut map = JsonMap::new();
    map.insert(id.into(), value.into());
    map
}

/// Views a JSON value as a slice of values: an array as itself, anything
/// else (including `@context`'s many non-array shapes) as a single-item
/// slice-like vector.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#context-processing-algorithm>,
/// step 4 ("If local context is not an array, set it to an array
/// containing only local context").
pub(crate) fn to_ref_array(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(arr) => arr.iter().collect(),
        v => vec![v],
    }
}

/// Views a JSON value as an owned vector of values, flattening one level
/// of array nesting. Used by expansion, where an array element that is
/// itself an array is spliced into the parent rather than nested.
pub(crate) fn as_array(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(arr) => arr.clone(),
        Value::Null => Vec::new(),
        v => vec![v.clone()],
    }
}
