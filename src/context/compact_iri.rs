//! Compact-IRI-to-term selection.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-compaction>.

use serde_json::Value;

use super::{Context, Definition};
use crate::syntax::Keyword;

/// Whether the IRI being compacted sits in key/type position (prefers
/// `@vocab` before a CURIE search) or value position (prefers a CURIE
/// before falling back to `@vocab`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// A map key or a `@type` value: `@vocab` is tried before CURIEs.
    KeyOrType,
    /// An ordinary value: CURIEs are tried before `@vocab`.
    Value,
}

/// Compacts an absolute IRI to a term, compact IRI, or the IRI itself.
///
/// `value` is the JSON value the IRI labels, used to rank candidate
/// terms by container/type/language compatibility; pass `None` when
/// there is no associated value (e.g. compacting a bare `@type` IRI).
pub(crate) fn compact_iri(
    active: &Context,
    iri_value: &str,
    value: Option<&Value>,
    position: Position,
) -> String {
    if let Some(kw) = Keyword::from_str(iri_value) {
        return active.shortest_alias(kw.as_str()).to_owned();
    }

    let is_list_value = value.map_or(false, |v| v.get("@list").is_some());

    let mut candidates: Vec<(&str, &Definition)> = active
        .defined_terms()
        .filter(|(_, def)| def.iri() == iri_value)
        .filter(|(_, def)| match def.container() {
            Some(crate::context::ContainerItem::Set) => !is_list_value,
            Some(crate::context::ContainerItem::List) => true,
            _ => true,
        })
        .collect();

    let best = select_best_rank(&mut candidates, value, is_list_value);

    if let Some(term) = best {
        return term.to_owned();
    }

    match position {
        Position::KeyOrType => vocab_suffix(active, iri_value)
            .or_else(|| find_curie(active, iri_value))
            .unwrap_or_else(|| iri_value.to_owned()),
        Position::Value => find_curie(active, iri_value)
            .or_else(|| vocab_suffix(active, iri_value))
            .unwrap_or_else(|| iri_value.to_owned()),
    }
}

/// Returns the bare suffix of `iri_value` relative to `@vocab`, provided
/// the suffix itself is not already a defined term (which would make it
/// ambiguous with a term reference).
fn vocab_suffix(active: &Context, iri_value: &str) -> Option<String> {
    let vocab = active.vocab()?;
    let suffix = iri_value.strip_prefix(vocab)?;
    if suffix.is_empty() || active.term_definition(suffix).is_some() {
        return None;
    }
    Some(suffix.to_owned())
}

/// Searches for a CURIE `prefix:suffix` where `prefix`'s IRI mapping
/// ends in `/` or `#` and is a strict prefix of `iri_value`, and the
/// resulting CURIE string is not itself a defined term.
fn find_curie(active: &Context, iri_value: &str) -> Option<String> {
    let mut best: Option<String> = None;
    for (term, def) in active.defined_terms() {
        let prefix_iri = def.iri();
        if !(prefix_iri.ends_with('/') || prefix_iri.ends_with('#')) {
            continue;
        }
        if prefix_iri.is_empty() || prefix_iri.len() >= iri_value.len() {
            continue;
        }
        if let Some(suffix) = iri_value.strip_prefix(prefix_iri) {
            if suffix.is_empty() {
                continue;
            }
            let candidate = format!("{}:{}", term, suffix);
            if active.term_definition(&candidate).is_some() {
                continue;
            }
            match &best {
                Some(cur) if shorter_or_earlier(cur, &candidate) => {}
                _ => best = Some(candidate),
            }
        }
    }
    best
}

/// Tie-break: shortest first, then lexicographic.
fn shorter_or_earlier(a: &str, b: &str) -> bool {
    (a.len(), a) <= (b.len(), b)
}

/// Picks the term with the highest compatibility rank, applying the
/// `@set`/`@list` tie-break rules, and returns its name.
fn select_best_rank<'a>(
    candidates: &mut Vec<(&'a str, &'a Definition)>,
    value: Option<&Value>,
    is_list_value: bool,
) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }

    let mut best_term: Option<&str> = None;
    let mut best_rank: i32 = i32::MIN;

    for (term, def) in candidates.iter() {
        let mut rank = rank_term(def, value, is_list_value);
        if rank <= 0 {
            continue;
        }
        if def.container() == Some(crate::context::ContainerItem::Set) {
            rank += 1;
        }
        if is_list_value && def.container() == Some(crate::context::ContainerItem::List) {
            best_term = Some(term);
            best_rank = i32::MAX;
            break;
        }
        match rank.cmp(&best_rank) {
            std::cmp::Ordering::Greater => {
                best_rank = rank;
                best_term = Some(term);
            }
            std::cmp::Ordering::Equal => {
                if let Some(current) = best_term {
                    if shorter_or_earlier(term, current) {
                        best_term = Some(term);
                    }
                }
            }
            std::cmp::Ordering::Less => {}
        }
    }

    best_term
}

/// Implements the ranking table.
fn rank_term(def: &Definition, value: Option<&Value>, is_list_value: bool) -> i32 {
    let value = match value {
        None => return 3,
        Some(v) => v,
    };

    if value.is_null() {
        return 3;
    }

    if is_list_value {
        let items = value.get("@list").and_then(Value::as_array);
        return match items {
            None => 0,
            Some(items) if items.is_empty() => {
                if def.container() == Some(crate::context::ContainerItem::List) {
                    1
                } else {
                    0
                }
            }
            Some(items) => items
                .iter()
                .map(|item| rank_term(def, Some(item), false))
                .sum(),
        };
    }

    if let Some(obj) = value.as_object() {
        if let Some(inner) = obj.get("@value") {
            let has_type = obj.contains_key("@type");
            let has_lang = obj.contains_key("@language");

            if has_type {
                let ty = obj.get("@type").and_then(Value::as_str);
                return if ty == def.ty() {
                    3
                } else if def.ty().is_none() && def.language().is_none() {
                    1
                } else {
                    0
                };
            }

            if !has_lang && !inner.is_string() {
                return if def.ty().is_none() && def.language().is_none() {
                    2
                } else {
                    1
                };
            }

            if !has_lang {
                return match def.language() {
                    Some(crate::json::Nullable::Null) => 3,
                    None => 3,
                    Some(crate::json::Nullable::Value(_)) => 0,
                };
            }

            let lang = obj.get("@language").and_then(Value::as_str);
            return match def.language() {
                Some(crate::json::Nullable::Value(l)) if Some(l) == lang => 3,
                None => 3,
                _ => 1,
            };
        }

        if obj.contains_key("@id") && obj.len() == 1 {
            return if def.ty() == Some("@id") {
                3
            } else if def.ty().is_none() && def.language().is_none() {
                1
            } else {
                0
            };
        }

        if crate::value::is_subject(obj) {
            return if def.ty() == Some("@id") {
                3
            } else if def.ty().is_none() && def.language().is_none() {
                1
            } else {
                0
            };
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{context::DefinitionBuilder, json::Nullable};

    fn with_term(iri: &str, ty: Option<&str>) -> Context {
        let mut ctx = Context::new();
        let mut builder = DefinitionBuilder::new();
        builder.set_iri(iri);
        if let Some(ty) = ty {
            builder.set_ty(ty);
        }
        ctx.set_term_definition("name", Nullable::Value(builder.build()));
        ctx
    }

    #[test]
    fn keyword_uses_alias() {
        let mut ctx = Context::new();
        ctx.register_keyword_alias("@id", "id".to_owned());
        assert_eq!(compact_iri(&ctx, "@id", None, Position::KeyOrType), "id");
    }

    #[test]
    fn plain_string_value_prefers_untyped_term() {
        let ctx = with_term("http://example.org/name", None);
        let value = json!({"@value": "Alice"});
        assert_eq!(
            compact_iri(&ctx, "http://example.org/name", Some(&value), Position::Value),
            "name"
        );
    }

    #[test]
    fn falls_back_to_vocab_suffix() {
        let mut ctx = Context::new();
        ctx.set_vocab(Some("http://example.org/".to_owned()));
        assert_eq!(
            compact_iri(&ctx, "http://example.org/Person", None, Position::KeyOrType),
            "Person"
        );
    }

    #[test]
    fn falls_back_to_curie() {
        let mut ctx = Context::new();
        let mut builder = DefinitionBuilder::new();
        builder.set_iri("http://example.org/");
        ctx.set_term_definition("ex", Nullable::Value(builder.build()));
        assert_eq!(
            compact_iri(&ctx, "http://example.org/Person", None, Position::Value),
            "ex:Person"
        );
    }

    #[test]
    fn no_match_returns_iri_unchanged() {
        let ctx = Context::new();
        assert_eq!(
            compact_iri(&ctx, "http://example.org/Foo", None, Position::Value),
            "http://example.org/Foo"
        );
    }
}
