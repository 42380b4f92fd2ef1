//! Framing: reorders and embeds a flattened node set according to a
//! frame document.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-framing-20191018/#framing-algorithm>.

use std::collections::{HashMap, HashSet};

use serde_json::{Map as JsonMap, Value};

use crate::{
    error::Result,
    flatten,
    json,
    processor::{FlattenOptions, FrameOptions},
};

/// `@embed` mode for a (sub-)frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Embed {
    /// Embed the most recently referenced matching subject (default).
    Last,
    /// Never embed; emit a subject reference instead.
    Never,
    /// Embed every matching subject, even if already embedded elsewhere.
    Always,
}

impl Embed {
    /// Parses an `@embed` frame keyword value.
    fn parse(v: Option<&Value>) -> Self {
        match v.and_then(Value::as_str) {
            Some("@never") => Embed::Never,
            Some("@always") => Embed::Always,
            _ => Embed::Last,
        }
    }
}

/// Frames `input` (already in expanded form) against `frame_doc`.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-framing-20191018/#framing-algorithm>.
pub(crate) fn frame_document(input: &[Value], frame_doc: &Value, options: &FrameOptions) -> Result<Value> {
    let flattened = flatten::flatten_document(input, &FlattenOptions::default())?;
    let mut node_map: HashMap<String, Value> = HashMap::new();
    for node in &flattened {
        if let Some(id) = node.get("@id").and_then(Value::as_str) {
            node_map.insert(id.to_owned(), node.clone());
        }
    }

    let frame_array = json::as_array(frame_doc);
    let frame_obj = frame_array
        .first()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut embedded: HashSet<String> = HashSet::new();
    let subject_ids: Vec<String> = {
        let mut ids: Vec<String> = node_map.keys().cloned().collect();
        ids.sort();
        ids
    };

    let mut results = Vec::new();
    for id in &subject_ids {
        let subject = &node_map[id];
        if filter_subject(subject, &frame_obj) {
            results.push(frame_subject(subject, &frame_obj, &node_map, &mut embedded, options)?);
        }
    }

    Ok(Value::Object(json::single_entry_map("@graph", Value::Array(results))))
}

/// Checks whether `subject` matches `frame`'s `@type` constraint (or
/// passes by duck-typing if the frame has no `@type`).
fn filter_subject(subject: &Value, frame: &JsonMap<String, Value>) -> bool {
    let type_matches = match frame.get("@type") {
        None => true,
        Some(wanted) => {
            let wanted_owned: Vec<String> = json::as_array(wanted)
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
            let subject_types: Vec<String> = subject
                .get("@type")
                .map(json::as_array)
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
            wanted_owned.iter().any(|t| subject_types.contains(t))
        }
    };
    if !type_matches {
        return false;
    }

    frame
        .keys()
        .filter(|k| !k.starts_with('@'))
        .all(|k| subject.get(k).is_some())
}

/// Builds the framed representation of one subject, recursing into its
/// properties per their sub-frames and honoring `@explicit`/`@embed`.
fn frame_subject(
    subject: &Value,
    frame: &JsonMap<String, Value>,
    node_map: &HashMap<String, Value>,
    embedded: &mut HashSet<String>,
    options: &FrameOptions,
) -> Result<Value> {
    let subject_obj = subject.as_object().cloned().unwrap_or_default();
    let id = subject_obj.get("@id").and_then(Value::as_str).unwrap_or_default().to_owned();

    let embed = Embed::parse(frame.get("@embed"));
    if embed == Embed::Never || (embed == Embed::Last && embedded.contains(&id)) {
        return Ok(Value::Object(json::single_entry_map("@id", id)));
    }
    embedded.insert(id.clone());

    let explicit = frame.get("@explicit").and_then(Value::as_bool).unwrap_or(false);

    let mut result = JsonMap::new();
    result.insert("@id".to_owned(), Value::String(id));
    if let Some(types) = subject_obj.get("@type") {
        result.insert("@type".to_owned(), types.clone());
    }

    let mut keys: Vec<&String> = subject_obj.keys().filter(|k| !matches!(k.as_str(), "@id" | "@type")).collect();
    keys.sort();

    for key in keys {
        if explicit && !frame.contains_key(key) {
            continue;
        }
        let raw_value = &subject_obj[key];
        let sub_frame = frame.get(key).and_then(Value::as_array).and_then(|a| a.first()).and_then(Value::as_object);

        let items = json::as_array(raw_value);
        let mut framed_items = Vec::new();
        for item in &items {
            if let Some(ref_id) = item.get("@id").and_then(Value::as_str) {
                if let Some(referenced) = node_map.get(ref_id) {
                    let item_frame = sub_frame.cloned().unwrap_or_default();
                    framed_items.push(frame_subject(referenced, &item_frame, node_map, embedded, options)?);
                    continue;
                }
            }
            framed_items.push(item.clone());
        }
        result.insert(key.clone(), Value::Array(framed_items));
    }

    if !explicit {
        for key in frame.keys() {
            if key.starts_with('@') || result.contains_key(key) {
                continue;
            }
            let default_frame = frame.get(key).and_then(Value::as_array).and_then(|a| a.first());
            if let Some(default_obj) = default_frame.and_then(Value::as_object) {
                if let Some(default_value) = default_obj.get("@default") {
                    result.insert(key.clone(), default_value.clone());
                }
            }
        }
    }

    Ok(Value::Object(result))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn frames_by_type() {
        let input = vec![
            json!({"@id": "http://ex/a", "@type": ["http://ex/Person"], "http://ex/name": [{"@value": "Alice"}]}),
            json!({"@id": "http://ex/b", "@type": ["http://ex/Place"]}),
        ];
        let frame_doc = json!({"@type": "http://ex/Person"});
        let result = frame_document(&input, &frame_doc, &FrameOptions::default()).unwrap();
        let graph = result["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[0]["@id"], "http://ex/a");
    }

    #[test]
    fn embeds_referenced_subject() {
        let input = vec![
            json!({"@id": "http://ex/a", "@type": ["http://ex/Person"], "http://ex/knows": [{"@id": "http://ex/b"}]}),
            json!({"@id": "http://ex/b", "@type": ["http://ex/Person"], "http://ex/name": [{"@value": "Bob"}]}),
        ];
        let frame_doc = json!({"@type": "http://ex/Person"});
        let result = frame_document(&input, &frame_doc, &FrameOptions::default()).unwrap();
        let graph = result["@graph"].as_array().unwrap();
        let a = graph.iter().find(|n| n["@id"] == "http://ex/a").unwrap();
        assert_eq!(a["http://ex/knows"][0]["http://ex/name"][0]["@value"], "Bob");
    }

    #[test]
    fn empty_frame_returns_every_subject_once() {
        let input = vec![
            json!({"@id": "http://ex/a", "http://ex/p": [{"@value": "1"}]}),
            json!({"@id": "http://ex/b", "http://ex/p": [{"@value": "2"}]}),
        ];
        let result = frame_document(&input, &json!({}), &FrameOptions::default()).unwrap();
        let graph = result["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn explicit_frame_drops_unframed_properties() {
        let input = vec![json!({
            "@id": "http://ex/a", "@type": ["http://ex/Person"],
            "http://ex/name": [{"@value": "Alice"}], "http://ex/age": [{"@value": 30}]
        })];
        let frame_doc = json!({"@type": "http://ex/Person", "@explicit": true, "http://ex/name": {}});
        let result = frame_document(&input, &frame_doc, &FrameOptions::default()).unwrap();
        let a = &result["@graph"][0];
        assert!(a.get("http://ex/name").is_some());
        assert!(a.get("http://ex/age").is_none());
    }
}
