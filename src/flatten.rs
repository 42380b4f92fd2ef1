//! Flattening: collects every node into a single flat array, replacing
//! embedded node objects with references.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#flattening-algorithms>.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value};

use crate::{
    error::Result,
    json,
    namer::UniqueNamer,
    processor::FlattenOptions,
    value,
};

/// Name of the default graph in the internal graph map.
const DEFAULT_GRAPH: &str = "@default";

/// Flattens `input` (already in expanded form) into a single array of
/// node objects, ordered by subject id.
pub(crate) fn flatten_document(input: &[Value], options: &FlattenOptions) -> Result<Vec<Value>> {
    let prefix = options.blank_node_prefix.clone().unwrap_or_else(|| "_:b".to_owned());
    let mut namer = UniqueNamer::new(prefix);
    let mut graph_map: HashMap<String, JsonMap<String, Value>> = HashMap::new();
    graph_map.insert(DEFAULT_GRAPH.to_owned(), JsonMap::new());

    for item in input {
        node_map(item, &mut graph_map, DEFAULT_GRAPH, &mut namer, None)?;
    }

    // Attach named graphs to their subject node's `@graph` entry in the
    // default graph, creating a reference-only node if none exists yet.
    let mut graph_names: Vec<String> = graph_map.keys().filter(|k| *k != DEFAULT_GRAPH).cloned().collect();
    graph_names.sort();
    for graph_name in graph_names {
        let nodes = graph_map.get(&graph_name).cloned().unwrap_or_default();
        let mut entries: Vec<Value> = nodes.into_values().collect();
        entries.sort_by_key(|v| v.get("@id").and_then(Value::as_str).unwrap_or_default().to_owned());

        let default_graph = graph_map.get_mut(DEFAULT_GRAPH).expect("default graph always present");
        let node = default_graph
            .entry(graph_name.clone())
            .or_insert_with(|| Value::Object(json::single_entry_map("@id", graph_name.clone())));
        if let Some(obj) = node.as_object_mut() {
            obj.insert("@graph".to_owned(), Value::Array(entries));
        }
    }

    let mut default_nodes: Vec<Value> = graph_map.remove(DEFAULT_GRAPH).unwrap_or_default().into_values().collect();
    default_nodes.sort_by_key(|v| v.get("@id").and_then(Value::as_str).unwrap_or_default().to_owned());

    Ok(default_nodes)
}

/// Recursively walks `element`, inserting every subject it finds into
/// `graph_map[active_graph]`, replacing embedded subjects with `@id`
/// references and relabelling blank nodes through `namer`.
fn node_map(
    element: &Value,
    graph_map: &mut HashMap<String, JsonMap<String, Value>>,
    active_graph: &str,
    namer: &mut UniqueNamer,
    active_subject_property: Option<(&str, &str)>,
) -> Result<()> {
    match element {
        Value::Array(items) => {
            for item in items {
                node_map(item, graph_map, active_graph, namer, active_subject_property)?;
            }
            Ok(())
        }
        Value::Object(obj) if value::is_value(obj) => {
            if let Some((subject, property)) = active_subject_property {
                add_value(graph_map, active_graph, subject, property, Value::Object(obj.clone()));
            }
            Ok(())
        }
        Value::Object(obj) if value::is_list(obj) => {
            let items = obj.get("@list").map(json::as_array).unwrap_or_default();
            let mut flattened_items = Vec::new();
            for item in &items {
                flattened_items.push(flatten_list_item(item, graph_map, active_graph, namer)?);
            }
            if let Some((subject, property)) = active_subject_property {
                let list_obj = json::single_entry_map("@list", Value::Array(flattened_items));
                add_value(graph_map, active_graph, subject, property, Value::Object(list_obj));
            }
            Ok(())
        }
        Value::Object(obj) => node_object(obj, graph_map, active_graph, namer, active_subject_property),
        _ => Ok(()),
    }
}

/// Flattens one `@list` item: node objects are recursively node-mapped
/// and replaced by a reference; everything else passes through as-is.
fn flatten_list_item(
    item: &Value,
    graph_map: &mut HashMap<String, JsonMap<String, Value>>,
    active_graph: &str,
    namer: &mut UniqueNamer,
) -> Result<Value> {
    match item {
        Value::Object(obj) if value::is_subject(obj) => {
            let id = subject_id(obj, namer);
            node_map(item, graph_map, active_graph, namer, None)?;
            Ok(Value::Object(json::single_entry_map("@id", id)))
        }
        other => Ok(other.clone()),
    }
}

/// Node-maps a single subject object, recursing into its property values.
fn node_object(
    obj: &JsonMap<String, Value>,
    graph_map: &mut HashMap<String, JsonMap<String, Value>>,
    active_graph: &str,
    namer: &mut UniqueNamer,
    active_subject_property: Option<(&str, &str)>,
) -> Result<()> {
    let id = subject_id(obj, namer);

    {
        let graph = graph_map.entry(active_graph.to_owned()).or_default();
        graph
            .entry(id.clone())
            .or_insert_with(|| Value::Object(json::single_entry_map("@id", id.clone())));
    }

    if let Some((subject, property)) = active_subject_property {
        add_value(
            graph_map,
            active_graph,
            subject,
            property,
            Value::Object(json::single_entry_map("@id", id.clone())),
        );
    }

    let mut keys: Vec<&String> = obj.keys().filter(|k| k.as_str() != "@id").collect();
    keys.sort();

    for key in keys {
        let raw_value = &obj[key];
        match key.as_str() {
            "@type" => {
                let types = json::as_array(raw_value);
                let graph = graph_map.entry(active_graph.to_owned()).or_default();
                let node = graph.entry(id.clone()).or_insert_with(|| Value::Object(JsonMap::new()));
                if let Some(node_obj) = node.as_object_mut() {
                    let entry = node_obj.entry("@type".to_owned()).or_insert_with(|| Value::Array(Vec::new()));
                    if let Value::Array(arr) = entry {
                        for ty in types {
                            if !arr.contains(&ty) {
                                arr.push(ty);
                            }
                        }
                    }
                }
            }
            "@graph" => {
                if !graph_map.contains_key(&id) {
                    graph_map.insert(id.clone(), JsonMap::new());
                }
                node_map(raw_value, graph_map, &id, namer, None)?;
            }
            "@reverse" => {
                if let Some(reverse_obj) = raw_value.as_object() {
                    for (rkey, rvalue) in reverse_obj {
                        let items = json::as_array(rvalue);
                        for item in items {
                            if let Value::Object(item_obj) = &item {
                                let referent_id = subject_id(item_obj, namer);
                                node_map(&item, graph_map, active_graph, namer, None)?;
                                add_value(
                                    graph_map,
                                    active_graph,
                                    &referent_id,
                                    rkey,
                                    Value::Object(json::single_entry_map("@id", id.clone())),
                                );
                            }
                        }
                    }
                }
            }
            "@index" => {
                let graph = graph_map.entry(active_graph.to_owned()).or_default();
                let node = graph.entry(id.clone()).or_insert_with(|| Value::Object(JsonMap::new()));
                if let Some(node_obj) = node.as_object_mut() {
                    node_obj.insert("@index".to_owned(), raw_value.clone());
                }
            }
            _ => {
                node_map(raw_value, graph_map, active_graph, namer, Some((&id, key)))?;
            }
        }
    }

    Ok(())
}

/// Returns the canonical subject id for `obj`, assigning a fresh blank
/// node label via `namer` if it has none.
fn subject_id(obj: &JsonMap<String, Value>, namer: &mut UniqueNamer) -> String {
    match obj.get("@id").and_then(Value::as_str) {
        Some(id) if value::is_blank_node_id(id) => namer.name(id),
        Some(id) => id.to_owned(),
        None => namer.name(&format!("_:unlabeled-{:p}", obj)),
    }
}

/// Adds `value` to `graph_map[graph][subject][property]`, merging with
/// an existing array rather than overwriting it, and skipping duplicate
/// subject references.
fn add_value(
    graph_map: &mut HashMap<String, JsonMap<String, Value>>,
    graph: &str,
    subject: &str,
    property: &str,
    value: Value,
) {
    let graph_obj = graph_map.entry(graph.to_owned()).or_default();
    let node = graph_obj
        .entry(subject.to_owned())
        .or_insert_with(|| Value::Object(json::single_entry_map("@id", subject.to_owned())));
    let node_obj = node.as_object_mut().expect("node is always an object");
    let entry = node_obj.entry(property.to_owned()).or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(arr) = entry {
        if !arr.contains(&value) {
            arr.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_embedded_node() {
        let input = vec![json!({
            "@id": "http://ex/a",
            "http://ex/knows": [{"@id": "http://ex/b", "http://ex/name": [{"@value": "Bob"}]}]
        })];
        let flattened = flatten_document(&input, &FlattenOptions::default()).unwrap();
        assert_eq!(flattened.len(), 2);
        let a = flattened.iter().find(|n| n["@id"] == "http://ex/a").unwrap();
        assert_eq!(a["http://ex/knows"], json!([{"@id": "http://ex/b"}]));
        let b = flattened.iter().find(|n| n["@id"] == "http://ex/b").unwrap();
        assert_eq!(b["http://ex/name"], json!([{"@value": "Bob"}]));
    }

    #[test]
    fn relabels_blank_nodes() {
        let input = vec![json!({"@id": "_:x", "http://ex/p": [{"@value": "v"}]})];
        let flattened = flatten_document(&input, &FlattenOptions::default()).unwrap();
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0]["@id"], "_:b0");
    }

    #[test]
    fn flattens_list_items() {
        let input = vec![json!({
            "@id": "http://ex/a",
            "http://ex/list": [{"@list": [{"@id": "http://ex/b"}, {"@value": "x"}]}]
        })];
        let flattened = flatten_document(&input, &FlattenOptions::default()).unwrap();
        let a = flattened.iter().find(|n| n["@id"] == "http://ex/a").unwrap();
        assert_eq!(
            a["http://ex/list"],
            json!([{"@list": [{"@id": "http://ex/b"}, {"@value": "x"}]}])
        );
        assert!(flattened.iter().any(|n| n["@id"] == "http://ex/b"));
    }

    #[test]
    fn named_graph_attaches_to_subject() {
        let input = vec![json!({
            "@id": "http://ex/g",
            "@graph": [{"@id": "http://ex/a", "http://ex/p": [{"@value": "v"}]}]
        })];
        let flattened = flatten_document(&input, &FlattenOptions::default()).unwrap();
        let g = flattened.iter().find(|n| n["@id"] == "http://ex/g").unwrap();
        assert_eq!(g["@graph"][0]["@id"], "http://ex/a");
    }
}
