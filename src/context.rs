//! JSON-LD active context.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#the-context>.

use std::collections::HashMap;

pub(crate) use self::{
    compact_iri::{compact_iri, Position},
    definition::{ContainerItem, Definition, DefinitionBuilder},
    processor::{create_term_definition, process_context},
};
use crate::json::Nullable;

mod compact_iri;
mod definition;
mod processor;

/// JSON-LD active context.
///
/// Carries the term definitions, `@base`, `@vocab` and `@language`
/// mappings accumulated by the context processing algorithm, plus the
/// keyword-alias table used when compacting.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#the-context>.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    /// Term definitions.
    term_definitions: HashMap<String, Nullable<Definition>>,
    /// Base IRI.
    base: Option<String>,
    /// Default language (optional).
    default_language: Option<String>,
    /// Vocabulary mapping (optional).
    vocab: Option<String>,
    /// Terms (or compact IRI prefixes) that expand to a keyword, grouped
    /// by that keyword and sorted shortest-then-lexicographic-first.
    keyword_aliases: HashMap<&'static str, Vec<String>>,
}

impl Context {
    /// Creates a new empty `Context`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new `Context` with the given base IRI.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Default::default()
        }
    }

    /// Returns the base IRI.
    pub(crate) fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Sets the base IRI.
    pub(crate) fn set_base(&mut self, base: Option<String>) {
        self.base = base;
    }

    /// Returns the default language.
    pub(crate) fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    /// Sets the default language.
    pub(crate) fn set_default_language(&mut self, lang: Option<String>) {
        self.default_language = lang;
    }

    /// Returns the vocabulary mapping.
    pub(crate) fn vocab(&self) -> Option<&str> {
        self.vocab.as_deref()
    }

    /// Sets the vocabulary mapping.
    pub(crate) fn set_vocab(&mut self, vocab: Option<String>) {
        self.vocab = vocab;
    }

    /// Returns a raw term definition.
    ///
    /// This distinguishes absence and explicit `null` (a tombstone left
    /// by a term that was set to `null` in a local context, which blocks
    /// inherited definitions without providing one of its own).
    pub(crate) fn raw_term_definition(&self, term: &str) -> Option<Nullable<&Definition>> {
        self.term_definitions.get(term).map(Nullable::as_ref)
    }

    /// Returns a flattened term definition.
    ///
    /// Returns `None` for both an absent term and a term tombstoned by
    /// explicit `null`.
    pub(crate) fn term_definition(&self, term: &str) -> Option<&Definition> {
        self.term_definitions
            .get(term)
            .and_then(|v| v.as_ref().into())
    }

    /// Inserts or overwrites a term definition.
    pub(crate) fn set_term_definition(&mut self, term: impl Into<String>, def: Nullable<Definition>) {
        self.term_definitions.insert(term.into(), def);
    }

    /// Removes the given term definition.
    ///
    /// Does nothing if the given term is not in the context.
    pub(crate) fn remove_term_definition(&mut self, term: &str) -> Option<Nullable<Definition>> {
        self.term_definitions.remove(term)
    }

    /// Iterates over all terms that currently have a (non-tombstoned)
    /// definition, in arbitrary order.
    ///
    /// Used by compaction to rank candidate terms.
    pub(crate) fn defined_terms(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.term_definitions.iter().filter_map(|(term, def)| match def {
            Nullable::Value(def) => Some((term.as_str(), def)),
            Nullable::Null => None,
        })
    }

    /// Registers `alias` as a way to spell `keyword`, keeping the
    /// per-keyword alias list sorted by length then lexicographically.
    pub(crate) fn register_keyword_alias(&mut self, keyword: &'static str, alias: String) {
        let aliases = self.keyword_aliases.entry(keyword).or_default();
        if !aliases.contains(&alias) {
            aliases.push(alias);
            aliases.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        }
    }

    /// Returns the shortest known alias for `keyword`, or the keyword
    /// itself if it has not been aliased.
    pub(crate) fn shortest_alias(&self, keyword: &'static str) -> &str {
        self.keyword_aliases
            .get(keyword)
            .and_then(|aliases| aliases.first())
            .map(String::as_str)
            .unwrap_or(keyword)
    }

    /// Returns all known aliases for `keyword`, shortest first.
    pub(crate) fn aliases_for(&self, keyword: &'static str) -> &[String] {
        self.keyword_aliases
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_alias_ordering() {
        let mut ctx = Context::new();
        ctx.register_keyword_alias("@id", "identifier".to_owned());
        ctx.register_keyword_alias("@id", "id_".to_owned());
        ctx.register_keyword_alias("@id", "zz".to_owned());
        assert_eq!(
            ctx.aliases_for("@id"),
            &["zz".to_owned(), "id_".to_owned(), "identifier".to_owned()]
        );
        assert_eq!(ctx.shortest_alias("@id"), "zz");
    }

    #[test]
    fn shortest_alias_falls_back_to_keyword() {
        let ctx = Context::new();
        assert_eq!(ctx.shortest_alias("@type"), "@type");
    }

    #[test]
    fn term_definition_tombstone_vs_absent() {
        let mut ctx = Context::new();
        assert!(ctx.raw_term_definition("name").is_none());
        ctx.set_term_definition("name", Nullable::Null);
        assert_eq!(ctx.raw_term_definition("name"), Some(Nullable::Null));
        assert!(ctx.term_definition("name").is_none());
    }
}
