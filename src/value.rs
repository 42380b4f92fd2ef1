//! Predicates over the generic JSON tree used throughout expansion,
//! compaction, flattening and framing.
//!
//! These mirror the "is a value/list/set/subject object" definitions from
//! the JSON-LD API spec, operating directly on expanded-form
//! `serde_json::Value` objects.

use serde_json::{Map as JsonMap, Value};

use crate::syntax::has_form_of_keyword;

/// Checks whether a string has the syntactic form of a keyword (`@` plus
/// one or more ASCII letters).
pub(crate) fn is_keyword(s: &str) -> bool {
    has_form_of_keyword(s)
}

/// Checks whether an object is a value object (has a `@value` entry).
pub(crate) fn is_value(obj: &JsonMap<String, Value>) -> bool {
    obj.contains_key("@value")
}

/// Checks whether an object is a list object (has a `@list` entry).
pub(crate) fn is_list(obj: &JsonMap<String, Value>) -> bool {
    obj.contains_key("@list")
}

/// Checks whether an object is a set object (has a `@set` entry).
pub(crate) fn is_set(obj: &JsonMap<String, Value>) -> bool {
    obj.contains_key("@set")
}

/// Checks whether an object is a subject: an object which is not a value
/// or list object and which has either a non-keyword key or an `@id`.
pub(crate) fn is_subject(obj: &JsonMap<String, Value>) -> bool {
    if is_value(obj) || is_list(obj) {
        return false;
    }
    obj.contains_key("@id") || obj.keys().any(|k| !is_keyword(k))
}

/// Checks whether an object is a subject reference: an object whose only
/// entry is `@id`.
pub(crate) fn is_subject_reference(obj: &JsonMap<String, Value>) -> bool {
    obj.len() == 1 && obj.contains_key("@id")
}

/// Checks whether the given string is a blank node identifier (`_:`
/// prefix).
pub(crate) fn is_blank_node_id(s: &str) -> bool {
    s.starts_with("_:")
}

/// Checks whether an expanded-form object is a blank node: a subject or
/// subject reference whose `@id` begins with `_:`.
pub(crate) fn is_blank_node_object(obj: &JsonMap<String, Value>) -> bool {
    obj.get("@id")
        .and_then(Value::as_str)
        .map(is_blank_node_id)
        .unwrap_or(false)
}

/// Checks whether a value is `null` or an empty array, i.e. carries no
/// information for the purposes of `addValue`/default-filling.
pub(crate) fn is_empty(v: &Value) -> bool {
    matches!(v, Value::Null) || matches!(v, Value::Array(arr) if arr.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn value_object() {
        let obj = json!({"@value": "x", "@language": "en"});
        assert!(is_value(obj.as_object().unwrap()));
        assert!(!is_list(obj.as_object().unwrap()));
    }

    #[test]
    fn subject_vs_reference() {
        let reference = json!({"@id": "http://example/a"});
        let subject = json!({"@id": "http://example/a", "http://example/p": []});
        assert!(is_subject_reference(reference.as_object().unwrap()));
        assert!(!is_subject_reference(subject.as_object().unwrap()));
        assert!(is_subject(subject.as_object().unwrap()));
    }

    #[test]
    fn blank_node_detection() {
        assert!(is_blank_node_id("_:b0"));
        assert!(!is_blank_node_id("http://example/a"));
    }
}
