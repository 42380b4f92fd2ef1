//! Compaction: the inverse of expansion with respect to a chosen context.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#compaction-algorithms>.

use serde_json::{Map as JsonMap, Value};

use crate::{
    context::{self, compact_iri, Context, Position},
    error::{Error, ErrorCode, Result},
    json,
    processor::{CompactOptions, ProcessorOptions},
    value,
};

/// Compacts a sequence of expanded top-level elements against `context`.
pub(crate) fn compact_document(
    processor: &ProcessorOptions,
    input: &[Value],
    context_value: &Value,
    options: &CompactOptions,
) -> Result<Value> {
    let active = context::process_context(&Context::new(), context_value)?;
    let input_value = Value::Array(input.to_vec());
    let compacted = compact_element(processor, &active, None, &input_value)?;

    let mut result = match compacted {
        Value::Array(items) if items.is_empty() => Value::Object(JsonMap::new()),
        Value::Array(items) if items.len() == 1 && options.compact_arrays => items.into_iter().next().unwrap(),
        other => other,
    };

    if !context_value.is_null() && !(context_value.is_object() && context_value.as_object().unwrap().is_empty()) {
        if let Value::Object(obj) = &mut result {
            let mut with_context = JsonMap::new();
            with_context.insert("@context".to_owned(), context_value.clone());
            with_context.extend(obj.clone());
            return Ok(Value::Object(with_context));
        }
    }

    Ok(result)
}

/// Compacts one expanded element (array, value object, or node object).
fn compact_element(
    processor: &ProcessorOptions,
    active: &Context,
    active_property: Option<&str>,
    element: &Value,
) -> Result<Value> {
    match element {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                let compacted = compact_element(processor, active, active_property, item)?;
                if !compacted.is_null() {
                    out.push(compacted);
                }
            }
            let uses_array_container = active_property
                .and_then(|p| active.term_definition(p))
                .and_then(|d| d.container())
                .map_or(false, |c| {
                    matches!(c, context::ContainerItem::Set | context::ContainerItem::List)
                });
            if out.len() == 1 && !uses_array_container {
                Ok(out.into_iter().next().unwrap())
            } else {
                Ok(Value::Array(out))
            }
        }
        Value::Object(obj) if value::is_value(obj) => compact_value(active, active_property, obj),
        Value::Object(obj) if value::is_list(obj) => compact_list(processor, active, active_property, obj),
        Value::Object(obj) => compact_node(processor, active, active_property, obj),
        scalar => Ok(scalar.clone()),
    }
}

/// Compacts a `@value` object, collapsing it to a bare scalar when the
/// term definition's type/language already matches.
fn compact_value(active: &Context, active_property: Option<&str>, obj: &JsonMap<String, Value>) -> Result<Value> {
    let def = active_property.and_then(|p| active.term_definition(p));
    let val = obj.get("@value").cloned().unwrap_or(Value::Null);
    let ty = obj.get("@type").and_then(Value::as_str);
    let lang = obj.get("@language").and_then(Value::as_str);
    let has_index = obj.contains_key("@index");

    if !has_index {
        if let Some(ty) = ty {
            if def.and_then(|d| d.ty()) == Some(ty) {
                return Ok(val);
            }
        } else if let Some(lang) = lang {
            match def.and_then(|d| d.language()) {
                Some(json::Nullable::Value(l)) if l == lang => return Ok(val),
                None if active.default_language() == Some(lang) => return Ok(val),
                _ => {}
            }
        } else if def.and_then(|d| d.ty()).is_none() && def.and_then(|d| d.language()).is_none() && !val.is_string() {
            return Ok(val);
        } else if val.is_string() && def.is_none() && active.default_language().is_none() {
            return Ok(val);
        }
    }

    let mut result = JsonMap::new();
    result.insert(active.shortest_alias("@value").to_owned(), val);
    if let Some(ty) = obj.get("@type") {
        result.insert(active.shortest_alias("@type").to_owned(), ty.clone());
    }
    if let Some(lang) = obj.get("@language") {
        result.insert(active.shortest_alias("@language").to_owned(), lang.clone());
    }
    if let Some(index) = obj.get("@index") {
        result.insert(active.shortest_alias("@index").to_owned(), index.clone());
    }
    Ok(Value::Object(result))
}

/// Compacts a `@list` object.
fn compact_list(
    processor: &ProcessorOptions,
    active: &Context,
    active_property: Option<&str>,
    obj: &JsonMap<String, Value>,
) -> Result<Value> {
    let items = obj.get("@list").map(json::as_array).unwrap_or_default();
    let mut compacted_items = Vec::new();
    for item in items {
        compacted_items.push(compact_element(processor, active, active_property, &item)?);
    }

    let is_list_container = active_property
        .and_then(|p| active.term_definition(p))
        .and_then(|d| d.container())
        == Some(context::ContainerItem::List);

    if is_list_container {
        Ok(Value::Array(compacted_items))
    } else {
        let mut result = JsonMap::new();
        result.insert(active.shortest_alias("@list").to_owned(), Value::Array(compacted_items));
        Ok(Value::Object(result))
    }
}

/// Compacts a node object, choosing a property term for each key
/// independently of the others.
fn compact_node(
    processor: &ProcessorOptions,
    active: &Context,
    _active_property: Option<&str>,
    obj: &JsonMap<String, Value>,
) -> Result<Value> {
    let mut result = JsonMap::new();

    let mut keys: Vec<&String> = obj.keys().collect();
    keys.sort();

    for key in keys {
        let raw_value = &obj[key];
        if key == "@id" {
            let id = raw_value.as_str().unwrap_or_default();
            let compacted_id = compact_iri(active, id, None, Position::KeyOrType);
            result.insert(active.shortest_alias("@id").to_owned(), Value::String(compacted_id));
            continue;
        }
        if key == "@type" {
            let types = json::as_array(raw_value);
            let mut out = Vec::new();
            for ty in types {
                if let Some(ty) = ty.as_str() {
                    out.push(Value::String(compact_iri(active, ty, None, Position::KeyOrType)));
                }
            }
            let value = if out.len() == 1 { out.into_iter().next().unwrap() } else { Value::Array(out) };
            result.insert(active.shortest_alias("@type").to_owned(), value);
            continue;
        }
        if key == "@graph" {
            let compacted = compact_element(processor, active, Some("@graph"), raw_value)?;
            result.insert(active.shortest_alias("@graph").to_owned(), compacted);
            continue;
        }
        if key == "@index" {
            result.insert(active.shortest_alias("@index").to_owned(), raw_value.clone());
            continue;
        }
        if key == "@reverse" {
            let inner = raw_value.as_object().ok_or_else(|| {
                Error::from(ErrorCode::InvalidReversePropertyMap).context("@reverse value must be an object")
            })?;
            let mut reverse_keys: Vec<&String> = inner.keys().collect();
            reverse_keys.sort();
            for rkey in reverse_keys {
                let term = compact_iri(active, rkey, None, Position::KeyOrType);
                let compacted = compact_element(processor, active, Some(&term), &inner[rkey])?;
                merge_into(&mut result, &term, compacted);
            }
            continue;
        }

        let term = compact_iri(active, key, Some(raw_value), Position::Value);
        let container = active.term_definition(&term).and_then(|d| d.container());
        let compacted = compact_property_values(processor, active, &term, container, raw_value)?;
        merge_into(&mut result, &term, compacted);
    }

    Ok(Value::Object(result))
}

/// Compacts all values for one property, re-introducing `@list` wrapping
/// and array form as the term's container mapping requires.
fn compact_property_values(
    processor: &ProcessorOptions,
    active: &Context,
    term: &str,
    container: Option<context::ContainerItem>,
    raw_value: &Value,
) -> Result<Value> {
    use context::ContainerItem;

    let items = json::as_array(raw_value);

    if container == Some(ContainerItem::Language) {
        let mut map = JsonMap::new();
        for item in &items {
            if let Some(obj) = item.as_object() {
                if let (Some(v), Some(lang)) = (obj.get("@value"), obj.get("@language").and_then(Value::as_str)) {
                    map.insert(lang.to_owned(), v.clone());
                }
            }
        }
        return Ok(Value::Object(map));
    }

    if container == Some(ContainerItem::Index) {
        let mut map = JsonMap::new();
        for item in &items {
            if let Some(obj) = item.as_object() {
                if let Some(index) = obj.get("@index").and_then(Value::as_str) {
                    let mut stripped = obj.clone();
                    stripped.remove("@index");
                    let compacted = compact_element(processor, active, Some(term), &Value::Object(stripped))?;
                    map.insert(index.to_owned(), compacted);
                }
            }
        }
        return Ok(Value::Object(map));
    }

    let mut compacted_items = Vec::new();
    for item in &items {
        compacted_items.push(compact_element(processor, active, Some(term), item)?);
    }

    match container {
        Some(ContainerItem::List) => {
            // Items were wrapped in a single `@list` object; unwrap it.
            if items.len() == 1 {
                if let Some(list_obj) = items[0].as_object() {
                    if let Some(inner) = list_obj.get("@list") {
                        let inner_items = json::as_array(inner);
                        let mut out = Vec::new();
                        for i in inner_items {
                            out.push(compact_element(processor, active, Some(term), &i)?);
                        }
                        return Ok(Value::Array(out));
                    }
                }
            }
            Ok(Value::Array(compacted_items))
        }
        Some(ContainerItem::Set) => Ok(Value::Array(compacted_items)),
        None => {
            if compacted_items.len() == 1 {
                Ok(compacted_items.into_iter().next().unwrap())
            } else {
                Ok(Value::Array(compacted_items))
            }
        }
        _ => Ok(Value::Array(compacted_items)),
    }
}

/// Merges `value` into `result[key]`, combining with an existing entry
/// into an array rather than overwriting it.
fn merge_into(result: &mut JsonMap<String, Value>, key: &str, value: Value) {
    match result.get_mut(key) {
        Some(Value::Array(arr)) => arr.push(value),
        Some(existing) => {
            let prev = existing.clone();
            result.insert(key.to_owned(), Value::Array(vec![prev, value]));
        }
        None => {
            result.insert(key.to_owned(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn processor() -> ProcessorOptions {
        ProcessorOptions::new("http://example.org/")
    }

    #[test]
    fn compacts_simple_value() {
        let input = vec![json!({"http://schema.org/name": [{"@value": "Alice"}]})];
        let ctx = json!({"name": "http://schema.org/name"});
        let result = compact_document(&processor(), &input, &ctx, &CompactOptions::default()).unwrap();
        assert_eq!(result["name"], json!("Alice"));
    }

    #[test]
    fn compacts_typed_value_using_term_type() {
        let input = vec![json!({
            "http://ex/born": [{"@value": "1999-01-01", "@type": "http://www.w3.org/2001/XMLSchema#date"}]
        })];
        let ctx = json!({"born": {"@id": "http://ex/born", "@type": "http://www.w3.org/2001/XMLSchema#date"}});
        let result = compact_document(&processor(), &input, &ctx, &CompactOptions::default()).unwrap();
        assert_eq!(result["born"], json!("1999-01-01"));
    }

    #[test]
    fn compacts_list_container() {
        let input = vec![json!({
            "http://ex/f": [{"@list": [{"@value": "a"}, {"@value": "b"}]}]
        })];
        let ctx = json!({"friends": {"@id": "http://ex/f", "@container": "@list"}});
        let result = compact_document(&processor(), &input, &ctx, &CompactOptions::default()).unwrap();
        assert_eq!(result["friends"], json!(["a", "b"]));
    }

    #[test]
    fn empty_context_is_identity_modulo_key_order() {
        let input = vec![json!({"@id": "http://example.org/a", "http://ex/p": [{"@value": "v"}]})];
        let result = compact_document(&processor(), &input, &json!({}), &CompactOptions::default()).unwrap();
        assert_eq!(result["@id"], json!("http://example.org/a"));
        assert_eq!(result["http://ex/p"], json!("v"));
    }
}
