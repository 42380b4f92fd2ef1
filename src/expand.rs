//! Document expansion.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#expansion-algorithm>.

use serde_json::{Map as JsonMap, Value};

use crate::{
    context::{self, Context},
    error::{Error, ErrorCode, Result},
    json,
    processor::{ExpandOptions, ProcessorOptions},
    syntax::Keyword,
    value,
};

pub(crate) mod iri;

use self::iri::ExpandIriOptions;

/// Expands a top-level document: establishes the empty active context
/// (applying any top-level `@context`), expands every element, and
/// drops top-level free-floating nodes unless configured to keep them.
pub(crate) fn expand_document(
    processor: &ProcessorOptions,
    input: &Value,
    options: &ExpandOptions,
) -> Result<Vec<Value>> {
    let active = Context::new();
    let expanded = expand_element(processor, &active, None, input)?;

    let items = json::as_array(&expanded);
    let filtered = items
        .into_iter()
        .filter(|item| options.keep_free_floating_nodes || yields_information(item))
        .collect();
    Ok(filtered)
}

/// A top-level item is worth keeping if it is a scalar, or an object
/// with more than just `@value`-less keyword noise (i.e. would produce
/// at least one triple, or be an input to from-RDF-adjacent machinery).
fn yields_information(item: &Value) -> bool {
    match item {
        Value::Object(obj) => {
            obj.contains_key("@value")
                || obj.contains_key("@list")
                || obj.contains_key("@graph")
                || obj.keys().any(|k| !Keyword::is_keyword(k))
                || obj.len() > 1
        }
        _ => true,
    }
}

/// Recursively expands one element (object, array, or scalar).
fn expand_element(
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
                let expanded = expand_element(processor, active, active_property, item)?;
                match expanded {
                    Value::Null => continue,
                    Value::Array(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            Ok(Value::Array(out))
        }
        Value::Object(obj) => expand_object(processor, active, active_property, obj),
        scalar => {
            if active_property.is_none() {
                Ok(Value::Null)
            } else {
                expand_value(processor, active, active_property, scalar)
            }
        }
    }
}

/// Expands an object-shaped element.
fn expand_object(
    processor: &ProcessorOptions,
    active: &Context,
    active_property: Option<&str>,
    obj: &JsonMap<String, Value>,
) -> Result<Value> {
    let active = if let Some(local_context) = obj.get("@context") {
        context::process_context(active, local_context)?
    } else {
        active.clone()
    };

    let mut keys: Vec<&String> = obj.keys().filter(|k| k.as_str() != "@context").collect();
    keys.sort();

    let mut result = JsonMap::new();

    for key in keys {
        let raw_value = &obj[key];

        if key.as_str() == "@context" {
            continue;
        }

        let expanded_key = if Keyword::is_keyword(key) {
            key.clone()
        } else {
            match ExpandIriOptions::constant(&active)
                .vocab(true)
                .expand_str(processor, key)?
            {
                Some(k) => k.into_owned(),
                None => continue,
            }
        };

        if !Keyword::is_keyword(&expanded_key) && !crate::iri::is_absolute_or_blank_node_ident(&expanded_key) {
            continue;
        }

        let def = active.term_definition(key);
        let is_reverse = def.map_or(false, |d| d.is_reverse());

        if let Some(kw) = Keyword::from_str(&expanded_key) {
            expand_keyword_entry(processor, &active, kw, raw_value, &mut result)?;
            continue;
        }

        let container = def.and_then(|d| d.container());
        let expanded_values = expand_property_values(processor, &active, key, container, raw_value)?;

        if expanded_values.is_empty() {
            continue;
        }

        let target_key = if is_reverse {
            "@reverse"
        } else {
            expanded_key.as_str()
        };

        if is_reverse {
            for v in &expanded_values {
                if v.get("@value").is_some() || v.get("@list").is_some() {
                    return Err(Error::from(ErrorCode::InvalidReversePropertyValue)
                        .context(format!("reverse property {:?} cannot take a value or list object", key)));
                }
            }
            let reverse_map = result
                .entry("@reverse")
                .or_insert_with(|| Value::Object(JsonMap::new()));
            let reverse_map = reverse_map
                .as_object_mut()
                .expect("@reverse entry is always an object");
            add_values(reverse_map, &expanded_key, expanded_values);
        } else {
            let entry = result.entry(target_key.to_owned()).or_insert(Value::Array(Vec::new()));
            if let Value::Array(arr) = entry {
                arr.extend(expanded_values);
            }
        }
    }

    post_process(&mut result, active_property)
}

/// Expands keyword-valued entries (`@id`, `@type`, `@value`, `@language`,
/// `@graph`, `@list`, `@set`, `@index`).
fn expand_keyword_entry(
    processor: &ProcessorOptions,
    active: &Context,
    kw: Keyword,
    raw_value: &Value,
    result: &mut JsonMap<String, Value>,
) -> Result<()> {
    match kw {
        Keyword::Id => {
            let id = raw_value.as_str().ok_or_else(|| {
                Error::from(ErrorCode::InvalidIdValue).context("@id value must be a string")
            })?;
            let expanded = ExpandIriOptions::constant(active)
                .document_relative(true)
                .expand_str(processor, id)?
                .map(|s| Value::String(s.into_owned()))
                .unwrap_or(Value::Null);
            result.insert("@id".to_owned(), expanded);
        }
        Keyword::Type => {
            let types = json::as_array(raw_value);
            let mut out = Vec::new();
            for ty in types {
                let ty_str = ty.as_str().ok_or_else(|| {
                    Error::from(ErrorCode::InvalidTypeValue).context("@type value must be a string")
                })?;
                if let Some(expanded) = ExpandIriOptions::constant(active)
                    .vocab(true)
                    .document_relative(true)
                    .expand_str(processor, ty_str)?
                {
                    out.push(Value::String(expanded.into_owned()));
                }
            }
            result.insert("@type".to_owned(), Value::Array(out));
        }
        Keyword::Value => {
            result.insert("@value".to_owned(), raw_value.clone());
        }
        Keyword::Language => {
            if let Value::String(s) = raw_value {
                result.insert("@language".to_owned(), Value::String(s.to_lowercase()));
            } else if raw_value.is_null() {
                // dropped below during post-processing.
            } else {
                return Err(Error::from(ErrorCode::InvalidLanguageTaggedString)
                    .context("@language value must be a string"));
            }
        }
        Keyword::Index => {
            result.insert("@index".to_owned(), raw_value.clone());
        }
        Keyword::Graph => {
            let expanded = expand_element(processor, active, Some("@graph"), raw_value)?;
            result.insert("@graph".to_owned(), Value::Array(json::as_array(&expanded)));
        }
        Keyword::List => {
            reject_list_of_lists(raw_value)?;
            let expanded = expand_element(processor, active, Some("@list"), raw_value)?;
            result.insert("@list".to_owned(), Value::Array(json::as_array(&expanded)));
        }
        Keyword::Set => {
            let expanded = expand_element(processor, active, Some("@set"), raw_value)?;
            result.insert("@set".to_owned(), expanded);
        }
        _ => {
            // Other recognised keywords are carried through verbatim;
            // they are not part of SPEC_FULL's expansion surface.
            result.insert(kw.as_str().to_owned(), raw_value.clone());
        }
    }
    Ok(())
}

/// Expands the values for a single non-keyword property, applying
/// container-based rules (`@language`, `@index`, `@list`/`@set`).
fn expand_property_values(
    processor: &ProcessorOptions,
    active: &Context,
    key: &str,
    container: Option<context::ContainerItem>,
    raw_value: &Value,
) -> Result<Vec<Value>> {
    use context::ContainerItem;

    match container {
        Some(ContainerItem::Language) => {
            let obj = raw_value.as_object().ok_or_else(|| {
                Error::from(ErrorCode::InvalidLanguageMapValue)
                    .context(format!("value of language-container property {:?} must be an object", key))
            })?;
            let mut langs: Vec<&String> = obj.keys().collect();
            langs.sort();
            let mut out = Vec::new();
            for lang in langs {
                for item in json::as_array(&obj[lang]) {
                    let s = item.as_str().ok_or_else(|| {
                        Error::from(ErrorCode::InvalidLanguageMapValue)
                            .context("language map values must be strings")
                    })?;
                    let mut value_obj = JsonMap::new();
                    value_obj.insert("@value".to_owned(), Value::String(s.to_owned()));
                    value_obj.insert("@language".to_owned(), Value::String(lang.to_lowercase()));
                    out.push(Value::Object(value_obj));
                }
            }
            Ok(out)
        }
        Some(ContainerItem::Index) => {
            let obj = raw_value.as_object().ok_or_else(|| {
                Error::from(ErrorCode::InvalidIndexValue)
                    .context(format!("value of index-container property {:?} must be an object", key))
            })?;
            let mut indices: Vec<&String> = obj.keys().collect();
            indices.sort();
            let mut out = Vec::new();
            for index in indices {
                for item in json::as_array(&obj[index]) {
                    let expanded = expand_element(processor, active, Some(key), &item)?;
                    for mut v in json::as_array(&expanded) {
                        if let Value::Object(vo) = &mut v {
                            vo.entry("@index").or_insert_with(|| Value::String(index.clone()));
                        }
                        out.push(v);
                    }
                }
            }
            Ok(out)
        }
        Some(ContainerItem::List) => {
            reject_list_of_lists(raw_value)?;
            let expanded = expand_element(processor, active, Some(key), raw_value)?;
            let items = json::as_array(&expanded);
            let mut list = JsonMap::new();
            list.insert("@list".to_owned(), Value::Array(items));
            Ok(vec![Value::Object(list)])
        }
        Some(ContainerItem::Set) | None => {
            let expanded = expand_element(processor, active, Some(key), raw_value)?;
            Ok(json::as_array(&expanded))
        }
    }
}

/// Rejects a list whose content directly contains another list: a bare
/// nested JSON array, or an explicit `@list` object. JSON-LD 1.0 (which
/// this core follows) treats "list of lists" as a grammar violation
/// rather than silently flattening it.
fn reject_list_of_lists(raw_value: &Value) -> Result<()> {
    if let Value::Array(items) = raw_value {
        for item in items {
            let is_nested_list = match item {
                Value::Array(_) => true,
                Value::Object(obj) => obj.contains_key("@list"),
                _ => false,
            };
            if is_nested_list {
                return Err(Error::from(ErrorCode::InvalidSetOrListObject)
                    .context("a list may not contain another list"));
            }
        }
    }
    Ok(())
}

/// Expands a scalar value in value position (not an object/array), using
/// the active property's type coercion.
fn expand_value(
    processor: &ProcessorOptions,
    active: &Context,
    active_property: Option<&str>,
    scalar: &Value,
) -> Result<Value> {
    let def = active_property.and_then(|p| active.term_definition(p));
    let mut value_obj = JsonMap::new();

    match def.and_then(|d| d.ty()) {
        Some("@id") => {
            let s = scalar.as_str().ok_or_else(|| {
                Error::from(ErrorCode::InvalidIdValue).context("@type: @id coerced value must be a string")
            })?;
            let expanded = ExpandIriOptions::constant(active)
                .document_relative(true)
                .expand_str(processor, s)?
                .map(|s| Value::String(s.into_owned()))
                .unwrap_or(Value::Null);
            let mut id_obj = JsonMap::new();
            id_obj.insert("@id".to_owned(), expanded);
            return Ok(Value::Object(id_obj));
        }
        Some("@vocab") => {
            let s = scalar.as_str().ok_or_else(|| {
                Error::from(ErrorCode::InvalidIdValue).context("@type: @vocab coerced value must be a string")
            })?;
            let expanded = ExpandIriOptions::constant(active)
                .vocab(true)
                .document_relative(true)
                .expand_str(processor, s)?
                .map(|s| Value::String(s.into_owned()))
                .unwrap_or(Value::Null);
            let mut id_obj = JsonMap::new();
            id_obj.insert("@id".to_owned(), expanded);
            return Ok(Value::Object(id_obj));
        }
        Some(ty) => {
            value_obj.insert("@value".to_owned(), scalar.clone());
            value_obj.insert("@type".to_owned(), Value::String(ty.to_owned()));
            return Ok(Value::Object(value_obj));
        }
        None => {}
    }

    value_obj.insert("@value".to_owned(), scalar.clone());

    if let Value::String(_) = scalar {
        if let Some(lang) = def.and_then(|d| d.language()) {
            match lang {
                json::Nullable::Value(l) => {
                    value_obj.insert("@language".to_owned(), Value::String(l.to_owned()));
                }
                json::Nullable::Null => {}
            }
        } else if let Some(default_lang) = active.default_language() {
            value_obj.insert("@language".to_owned(), Value::String(default_lang.to_owned()));
        }
    }

    Ok(Value::Object(value_obj))
}

/// Adds (possibly merging) a key/value group into an object under
/// `addValue`-like semantics: appends to an existing array, or starts one.
fn add_values(obj: &mut JsonMap<String, Value>, key: &str, values: Vec<Value>) {
    let entry = obj.entry(key.to_owned()).or_insert(Value::Array(Vec::new()));
    if let Value::Array(arr) = entry {
        arr.extend(values);
    }
}

/// Applies the expansion post-processing invariants to a freshly built
/// node/value object.
fn post_process(obj: &mut JsonMap<String, Value>, active_property: Option<&str>) -> Result<Value> {
    if obj.contains_key("@value") {
        if obj.len() > 3
            || (obj.contains_key("@type") && obj.contains_key("@language"))
            || !obj
                .keys()
                .all(|k| matches!(k.as_str(), "@value" | "@type" | "@language" | "@index"))
        {
            return Err(Error::from(ErrorCode::InvalidValueObject)
                .context("@value object carries disallowed keys"));
        }
        if let Some(Value::String(_)) = obj.get("@language") {
            if !matches!(obj.get("@value"), Some(Value::String(_))) {
                obj.remove("@language");
            }
        }
        if matches!(obj.get("@value"), Some(Value::Null)) {
            return Ok(Value::Null);
        }
        return Ok(Value::Object(obj.clone()));
    }

    if let Some(types) = obj.get_mut("@type") {
        if !types.is_array() {
            *types = Value::Array(vec![types.clone()]);
        }
    }

    if let Some(set_value) = obj.remove("@set") {
        return Ok(set_value);
    }

    if obj.len() == 1 && obj.contains_key("@language") {
        return Ok(Value::Null);
    }

    if obj.is_empty() {
        return Ok(Value::Object(obj.clone()));
    }

    let is_free_floating = active_property.is_none()
        && !value::is_value(obj)
        && !value::is_list(obj)
        && !obj.contains_key("@graph");

    if is_free_floating && !value::is_subject_reference(obj) && obj.get("@id").is_none() && obj.len() <= 1 {
        return Ok(Value::Null);
    }

    Ok(Value::Object(obj.clone()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn processor() -> ProcessorOptions {
        ProcessorOptions::new("http://example.org/")
    }

    #[test]
    fn context_alias_scenario() {
        let input = json!({"@context": {"name": "http://schema.org/name"}, "name": "Alice"});
        let result = expand_document(&processor(), &input, &ExpandOptions::default()).unwrap();
        assert_eq!(
            result,
            vec![json!({"http://schema.org/name": [{"@value": "Alice"}]})]
        );
    }

    #[test]
    fn type_coercion_scenario() {
        let input = json!({
            "@context": {"born": {"@id": "http://ex/born", "@type": "http://www.w3.org/2001/XMLSchema#date"}},
            "born": "1999-01-01"
        });
        let result = expand_document(&processor(), &input, &ExpandOptions::default()).unwrap();
        assert_eq!(
            result,
            vec![json!({
                "http://ex/born": [{"@value": "1999-01-01", "@type": "http://www.w3.org/2001/XMLSchema#date"}]
            })]
        );
    }

    #[test]
    fn list_container_scenario() {
        let input = json!({
            "@context": {"friends": {"@id": "http://ex/f", "@container": "@list"}},
            "friends": ["a", "b"]
        });
        let result = expand_document(&processor(), &input, &ExpandOptions::default()).unwrap();
        assert_eq!(
            result,
            vec![json!({
                "http://ex/f": [{"@list": [{"@value": "a"}, {"@value": "b"}]}]
            })]
        );
    }

    #[test]
    fn null_context_resets_scope() {
        let input = json!({
            "@context": {"name": "http://schema.org/name"},
            "name": "Alice",
            "nested": {"@context": null, "name": "dropped"}
        });
        let result = expand_document(&processor(), &input, &ExpandOptions::default()).unwrap();
        let obj = result[0].as_object().unwrap();
        assert!(obj.contains_key("http://schema.org/name"));
    }
}
