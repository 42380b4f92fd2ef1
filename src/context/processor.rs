//! Context processing algorithm.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#context-processing-algorithm>
//! and <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#create-term-definition>.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value};

use super::{Context, ContainerItem, DefinitionBuilder};
use crate::{
    error::{Error, ErrorCode, Result},
    iri,
    json::Nullable,
    syntax::Keyword,
};

/// Applies a local context value to an active context, producing a new
/// active context.
///
/// `local_context` is the value associated with a `@context` key: `null`,
/// an object, or an array of such values (string entries naming a remote
/// context are not supported by this processor; see `DESIGN.md`).
pub(crate) fn process_context(active: &Context, local_context: &Value) -> Result<Context> {
    let mut result = active.clone();
    for entry in crate::json::to_ref_array(local_context) {
        apply_one(&mut result, entry)?;
    }
    Ok(result)
}

/// Applies a single local context entry (one element of the array form).
fn apply_one(result: &mut Context, entry: &Value) -> Result<()> {
    match entry {
        Value::Null => {
            *result = Context::new();
            Ok(())
        }
        Value::Object(obj) => apply_object(result, obj),
        Value::String(_) => Err(Error::from(ErrorCode::InvalidLocalContext)
            .context("string (remote) context references require a loader, which this processor does not inject here")),
        other => Err(Error::from(ErrorCode::InvalidLocalContext)
            .context(format!("local context entry must be null, an object or a string, got {:?}", other))),
    }
}

/// Applies one object-shaped local context entry.
fn apply_object(result: &mut Context, obj: &JsonMap<String, Value>) -> Result<()> {
    if let Some(base) = obj.get("@base") {
        apply_base(result, base)?;
    }
    if let Some(vocab) = obj.get("@vocab") {
        apply_vocab(result, vocab)?;
    }
    if let Some(lang) = obj.get("@language") {
        apply_language(result, lang)?;
    }

    let mut defined: HashMap<String, bool> = HashMap::new();
    for key in obj.keys() {
        if matches!(key.as_str(), "@base" | "@vocab" | "@language") {
            continue;
        }
        create_term_definition(result, obj, key, &mut defined)?;
    }

    Ok(())
}

/// Validates and applies `@base`.
fn apply_base(result: &mut Context, base: &Value) -> Result<()> {
    match base {
        Value::Null => {
            result.set_base(None);
            Ok(())
        }
        Value::String(s) => {
            let resolved = match result.base() {
                Some(current) => iri::resolve_against(s, Some(current)),
                None => s.clone(),
            };
            result.set_base(Some(resolved));
            Ok(())
        }
        other => Err(Error::from(ErrorCode::InvalidBaseIri)
            .context(format!("@base must be a string or null, got {:?}", other))),
    }
}

/// Validates and applies `@vocab`.
fn apply_vocab(result: &mut Context, vocab: &Value) -> Result<()> {
    match vocab {
        Value::Null => {
            result.set_vocab(None);
            Ok(())
        }
        Value::String(s) => {
            if s.is_empty() || iri::is_absolute_or_blank_node_ident(s) {
                result.set_vocab(Some(s.clone()));
                Ok(())
            } else {
                Err(Error::from(ErrorCode::InvalidVocabMapping)
                    .context(format!("@vocab must be an absolute IRI or blank node identifier, got {:?}", s)))
            }
        }
        other => Err(Error::from(ErrorCode::InvalidVocabMapping)
            .context(format!("@vocab must be a string or null, got {:?}", other))),
    }
}

/// Validates and applies `@language`.
fn apply_language(result: &mut Context, lang: &Value) -> Result<()> {
    match lang {
        Value::Null => {
            result.set_default_language(None);
            Ok(())
        }
        Value::String(s) => {
            result.set_default_language(Some(s.to_lowercase()));
            Ok(())
        }
        other => Err(Error::from(ErrorCode::InvalidDefaultLanguage)
            .context(format!("@language must be a string or null, got {:?}", other))),
    }
}

/// Runs the create term definition algorithm for a single key.
///
/// `defined` is the tri-state cycle-detection map shared across every
/// term created while processing the same local context object:
/// absent = not yet visited, `false` = currently being defined,
/// `true` = fully defined.
pub(crate) fn create_term_definition(
    active: &mut Context,
    local_context: &JsonMap<String, Value>,
    term: &str,
    defined: &mut HashMap<String, bool>,
) -> Result<()> {
    if let Some(&done) = defined.get(term) {
        if done {
            return Ok(());
        }
        return Err(Error::from(ErrorCode::CyclicIriMapping)
            .context(format!("cyclic IRI mapping detected for term {:?}", term)));
    }

    if Keyword::is_keyword(term) {
        return Err(Error::from(ErrorCode::KeywordRedefinition)
            .context(format!("term {:?} is a keyword and cannot be redefined", term)));
    }

    defined.insert(term.to_owned(), false);

    let raw_value = local_context.get(term).cloned().unwrap_or(Value::Null);

    // Tombstone forms: `null`, or `{"@id": null}`.
    let is_tombstone = match &raw_value {
        Value::Null => true,
        Value::Object(obj) if obj.get("@id") == Some(&Value::Null) => true,
        _ => false,
    };
    if is_tombstone {
        active.set_term_definition(term, Nullable::Null);
        defined.insert(term.to_owned(), true);
        return Ok(());
    }

    // Short-hand string form: rewrite to `{"@id": value}`.
    let value_obj: JsonMap<String, Value> = match raw_value {
        Value::String(s) => {
            let mut obj = JsonMap::new();
            obj.insert("@id".to_owned(), Value::String(s));
            obj
        }
        Value::Object(obj) => obj,
        other => {
            return Err(Error::from(ErrorCode::InvalidTermDefinition)
                .context(format!("term definition for {:?} must be a string, object or null, got {:?}", term, other)))
        }
    };

    let mut builder = DefinitionBuilder::new();

    let has_reverse = value_obj.contains_key("@reverse");
    let has_id = value_obj.contains_key("@id");
    let has_type = value_obj.contains_key("@type");
    let has_language = value_obj.contains_key("@language");

    if has_reverse {
        if has_id || has_type || has_language {
            return Err(Error::from(ErrorCode::InvalidReverseProperty)
                .context(format!("@reverse term {:?} cannot also carry @id, @type or @language", term)));
        }
        let reverse_value = value_obj.get("@reverse").expect("checked above");
        let reverse_str = reverse_value.as_str().ok_or_else(|| {
            Error::from(ErrorCode::InvalidIriMapping)
                .context(format!("@reverse value for term {:?} must be a string", term))
        })?;
        let iri = expand_term_iri(active, local_context, reverse_str, defined)?;
        if !crate::iri::is_absolute_or_blank_node_ident(&iri) {
            return Err(Error::from(ErrorCode::InvalidIriMapping)
                .context(format!("@reverse value for term {:?} did not expand to an absolute IRI: {:?}", term, iri)));
        }
        builder.set_iri(iri);
        builder.set_ty("@id");
        builder.set_reverse(true);
    } else if has_id {
        let id_value = value_obj.get("@id").expect("checked above");
        let id_str = id_value.as_str().ok_or_else(|| {
            Error::from(ErrorCode::InvalidIriMapping)
                .context(format!("@id value for term {:?} must be a string", term))
        })?;
        if id_str == term {
            // self-referential; fall through to vocab/prefix handling below.
            let iri = resolve_id_like_term(active, local_context, term, defined)?;
            builder.set_iri(iri);
        } else {
            let iri = expand_term_iri(active, local_context, id_str, defined)?;
            if !crate::iri::is_absolute_or_blank_node_ident(&iri) && Keyword::from_str(&iri).is_none() {
                return Err(Error::from(ErrorCode::InvalidIriMapping).context(format!(
                    "@id value for term {:?} did not expand to an absolute IRI or keyword: {:?}",
                    term, iri
                )));
            }
            builder.set_iri(iri);
        }
    } else {
        let iri = resolve_id_like_term(active, local_context, term, defined)?;
        builder.set_iri(iri);
    }

    if let Some(ty) = value_obj.get("@type") {
        let ty_str = ty
            .as_str()
            .ok_or_else(|| Error::from(ErrorCode::InvalidTypeMapping).context(format!("@type for term {:?} must be a string", term)))?;
        let expanded = expand_term_iri(active, local_context, ty_str, defined)?;
        if expanded != "@id" && expanded != "@vocab" && !crate::iri::is_absolute_iri(&expanded) {
            return Err(Error::from(ErrorCode::InvalidTypeMapping).context(format!(
                "@type for term {:?} must be an absolute IRI, @id or @vocab, got {:?}",
                term, expanded
            )));
        }
        builder.set_ty(expanded);
    }

    let mut container: Option<ContainerItem> = None;
    if let Some(c) = value_obj.get("@container") {
        container = crate::context::ContainerItem::from_json(c)
            .map_err(|e| Error::from(ErrorCode::InvalidContainerMapping).context(e))?;
        if let Some(c) = container {
            builder.set_container(Nullable::Value(c));
            if builder.ty().is_none() && has_reverse && c != ContainerItem::Index {
                return Err(Error::from(ErrorCode::InvalidReversePropertyMap)
                    .context(format!("reverse term {:?} must use @container: @index", term)));
            }
        }
    }
    if has_reverse && container.is_some() && container != Some(ContainerItem::Index) {
        return Err(Error::from(ErrorCode::InvalidReversePropertyMap)
            .context(format!("reverse term {:?} must use @container: @index", term)));
    }

    if let Some(lang) = value_obj.get("@language") {
        match lang {
            Value::Null => builder.set_language(Nullable::Null),
            Value::String(s) => builder.set_language(Nullable::Value(s.to_lowercase())),
            other => {
                return Err(Error::from(ErrorCode::InvalidLanguageMapping)
                    .context(format!("@language for term {:?} must be a string or null, got {:?}", term, other)))
            }
        }
    }

    if let Some(iri) = builder.iri() {
        if Keyword::is_keyword(iri) {
            let kw = Keyword::from_str(iri).expect("checked is_keyword");
            if kw.is_unaliasable() {
                return Err(Error::from(ErrorCode::InvalidKeywordAlias)
                    .context(format!("term {:?} cannot alias unaliasable keyword {:?}", term, iri)));
            }
            active.register_keyword_alias(kw.as_str(), term.to_owned());
        }
    }

    if let Some((prefix, _)) = crate::iri::to_prefix_and_suffix(term) {
        if local_context.contains_key(prefix) {
            builder.set_prefix(true);
        }
    }

    active.set_term_definition(term, Nullable::Value(builder.build()));
    defined.insert(term.to_owned(), true);
    Ok(())
}

/// Resolves a term's IRI mapping when no explicit `@id` is given: tries a
/// prefix split against another key defined in the same local context,
/// then falls back to `@vocab + term`.
fn resolve_id_like_term(
    active: &mut Context,
    local_context: &JsonMap<String, Value>,
    term: &str,
    defined: &mut HashMap<String, bool>,
) -> Result<String> {
    if let Some((prefix, suffix)) = crate::iri::to_prefix_and_suffix(term) {
        if prefix != "_" && !suffix.starts_with("//") && local_context.contains_key(prefix) {
            create_term_definition(active, local_context, prefix, defined)?;
            if let Some(def) = active.term_definition(prefix) {
                return Ok(format!("{}{}", def.iri(), suffix));
            }
        }
    }
    if crate::iri::is_absolute_or_blank_node_ident(term) {
        return Ok(term.to_owned());
    }
    match active.vocab() {
        Some(vocab) => Ok(format!("{}{}", vocab, term)),
        None => Err(Error::from(ErrorCode::InvalidIriMapping)
            .context(format!("cannot determine IRI mapping for term {:?}: no @vocab in scope", term))),
    }
}

/// Expands a string that names an IRI inside a term definition (a
/// `@reverse`, `@id` or `@type` value), recursively creating the term
/// definition for a prefix or bare term found along the way.
fn expand_term_iri(
    active: &mut Context,
    local_context: &JsonMap<String, Value>,
    value: &str,
    defined: &mut HashMap<String, bool>,
) -> Result<String> {
    if Keyword::is_keyword(value) {
        return Ok(value.to_owned());
    }

    if local_context.contains_key(value) {
        create_term_definition(active, local_context, value, defined)?;
    }
    if let Some(def) = active.term_definition(value) {
        return Ok(def.iri().to_owned());
    }

    if let Some((prefix, suffix)) = crate::iri::to_prefix_and_suffix(value) {
        if prefix == "_" {
            return Ok(value.to_owned());
        }
        if suffix.starts_with("//") {
            return Ok(value.to_owned());
        }
        if local_context.contains_key(prefix) {
            create_term_definition(active, local_context, prefix, defined)?;
        }
        if let Some(def) = active.term_definition(prefix) {
            return Ok(format!("{}{}", def.iri(), suffix));
        }
        return Ok(value.to_owned());
    }

    if let Some(vocab) = active.vocab() {
        return Ok(format!("{}{}", vocab, value));
    }

    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn simple_term_definition() {
        let active = Context::new();
        let local = json!({"@vocab": "http://example.org/", "name": "http://example.org/name"});
        let result = process_context(&active, &local).unwrap();
        assert_eq!(result.term_definition("name").unwrap().iri(), "http://example.org/name");
        assert_eq!(result.vocab(), Some("http://example.org/"));
    }

    #[test]
    fn shorthand_string_becomes_id() {
        let active = Context::new();
        let local = json!({"name": "http://example.org/name"});
        let result = process_context(&active, &local).unwrap();
        assert_eq!(result.term_definition("name").unwrap().iri(), "http://example.org/name");
    }

    #[test]
    fn null_context_resets() {
        let active = Context::with_base("http://example.org/".to_owned());
        let active = process_context(&active, &json!({"name": "http://example.org/name"})).unwrap();
        let reset = process_context(&active, &Value::Null).unwrap();
        assert!(reset.term_definition("name").is_none());
        assert_eq!(reset.base(), None);
    }

    #[test]
    fn tombstone_clears_term() {
        let active = Context::new();
        let local = json!({"name": "http://example.org/name"});
        let active = process_context(&active, &local).unwrap();
        let local2 = json!({"name": null});
        let result = process_context(&active, &local2).unwrap();
        assert_eq!(result.raw_term_definition("name"), Some(Nullable::Null));
        assert!(result.term_definition("name").is_none());
    }

    #[test]
    fn reverse_term_implies_type_id() {
        let active = Context::new();
        let local = json!({"children": {"@reverse": "http://example.org/parent", "@container": "@index"}});
        let result = process_context(&active, &local).unwrap();
        let def = result.term_definition("children").unwrap();
        assert!(def.is_reverse());
        assert_eq!(def.ty(), Some("@id"));
    }

    #[test]
    fn cyclic_prefix_is_rejected() {
        let active = Context::new();
        let local = json!({"a:x": "a:y", "a": "a:x"});
        let err = process_context(&active, &local).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CyclicIriMapping);
    }

    #[test]
    fn keyword_alias_registered() {
        let active = Context::new();
        let local = json!({"id": "@id"});
        let result = process_context(&active, &local).unwrap();
        assert_eq!(result.shortest_alias("@id"), "id");
    }

    #[test]
    fn cannot_alias_context_keyword() {
        let active = Context::new();
        let local = json!({"ctx": "@context"});
        let err = process_context(&active, &local).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidKeywordAlias);
    }

    #[test]
    fn prefix_term_resolution() {
        let active = Context::new();
        let local = json!({"ex": "http://example.org/", "ex:name": "ex:name"});
        let result = process_context(&active, &local).unwrap();
        assert_eq!(result.term_definition("ex:name").unwrap().iri(), "http://example.org/name");
    }
}
