//! IRI expansion.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-expansion>.

use std::{borrow::Cow, collections::HashMap};

use serde_json::{Map as JsonMap, Value};

use crate::{
    context::{self, Context, Definition},
    error::Result,
    iri::{self, is_absolute_iri, to_prefix_and_suffix},
    json::Nullable,
    processor::ProcessorOptions,
    syntax::Keyword,
};

/// Context for IRI expansion.
#[derive(Debug)]
enum ExpandIriContext<'a> {
    /// Immutable context: the active context is already fully built and
    /// no new term definitions can be created on the fly.
    Constant {
        /// Active context.
        active_context: &'a Context,
    },
    /// Mutable context: used while processing a local context, where
    /// expanding one key's IRI may need to recursively create another
    /// key's term definition first.
    Mutable {
        /// Active context.
        active_context: &'a mut Context,
        /// Local (currently loading) context.
        local_context: &'a JsonMap<String, Value>,
        /// Terms defined and being defined.
        defined: &'a mut HashMap<String, bool>,
    },
}

impl<'a> ExpandIriContext<'a> {
    /// Creates a new `ExpandIriContext` with the given immutable context.
    fn constant(active_context: &'a Context) -> Self {
        ExpandIriContext::Constant { active_context }
    }

    /// Creates a new `ExpandIriContext` with the given mutable context.
    fn mutable(
        active_context: &'a mut Context,
        local_context: &'a JsonMap<String, Value>,
        defined: &'a mut HashMap<String, bool>,
    ) -> Self {
        ExpandIriContext::Mutable {
            active_context,
            local_context,
            defined,
        }
    }
}

/// Options for IRI expansion algorithm.
#[derive(Debug)]
pub(crate) struct ExpandIriOptions<'a> {
    /// Context.
    context: ExpandIriContext<'a>,
    /// Vocab.
    vocab: bool,
    /// Document relative.
    document_relative: bool,
}

impl<'a> ExpandIriOptions<'a> {
    /// Creates a new `ExpandIriOptions` with the given immutable context.
    pub(crate) fn constant(active_context: &'a Context) -> Self {
        Self {
            context: ExpandIriContext::constant(active_context),
            vocab: false,
            document_relative: false,
        }
    }

    /// Creates a new `ExpandIriOptions` with the given mutable context.
    pub(crate) fn mutable(
        active_context: &'a mut Context,
        local_context: &'a JsonMap<String, Value>,
        defined: &'a mut HashMap<String, bool>,
    ) -> Self {
        Self {
            context: ExpandIriContext::mutable(active_context, local_context, defined),
            document_relative: false,
            vocab: false,
        }
    }

    /// Sets "document relative" flag.
    pub(crate) fn document_relative(self, document_relative: bool) -> Self {
        Self {
            document_relative,
            ..self
        }
    }

    /// Sets "vocab" flag.
    pub(crate) fn vocab(self, vocab: bool) -> Self {
        Self { vocab, ..self }
    }

    /// Returns the active context.
    fn active_context(&self) -> &Context {
        match &self.context {
            ExpandIriContext::Constant { active_context } => active_context,
            ExpandIriContext::Mutable { active_context, .. } => active_context,
        }
    }

    /// Returns the raw term definition if exists, or `self`.
    fn into_raw_term_definition(
        self,
        term: &str,
    ) -> std::result::Result<Nullable<&'a Definition>, ExpandIriOptions<'a>> {
        let Self {
            context,
            vocab,
            document_relative,
        } = self;
        match context {
            ExpandIriContext::Constant { active_context } => {
                if active_context.raw_term_definition(term).is_some() {
                    let def = active_context
                        .raw_term_definition(term)
                        .expect("checked by is_some()");
                    Ok(def)
                } else {
                    Err(Self {
                        context: ExpandIriContext::Constant { active_context },
                        vocab,
                        document_relative,
                    })
                }
            }
            ExpandIriContext::Mutable {
                active_context,
                local_context,
                defined,
            } => {
                if active_context.raw_term_definition(term).is_some() {
                    let def = active_context
                        .raw_term_definition(term)
                        .expect("checked by is_some()");
                    Ok(def)
                } else {
                    Err(Self {
                        context: ExpandIriContext::Mutable {
                            active_context,
                            local_context,
                            defined,
                        },
                        vocab,
                        document_relative,
                    })
                }
            }
        }
    }

    /// Runs "create term definition" algorithm if necessary.
    fn create_term_definition(&mut self, value: &str) -> Result<()> {
        if let ExpandIriContext::Mutable {
            active_context,
            local_context,
            defined,
        } = &mut self.context
        {
            if local_context.contains_key(value) && defined.get(value) != Some(&true) {
                context::create_term_definition(active_context, local_context, value, defined)?;
            }
        }

        Ok(())
    }

    /// Runs IRI expansion algorithm for string value.
    ///
    /// This may return one of the below:
    ///
    /// * `Ok(Some(absolute_iri_reference))`
    /// * `Ok(Some(blank_node_identifier))`
    /// * `Ok(None)` — the value expanded to `null`.
    /// * `Err(_)`
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-expansion>.
    pub(crate) fn expand_str(
        self,
        processor: &ProcessorOptions,
        value: &'a str,
    ) -> Result<Option<Cow<'a, str>>> {
        expand_str(self, processor, value)
    }
}

/// Runs IRI expansion algorithm for string value.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-expansion>.
fn expand_str<'a>(
    mut options: ExpandIriOptions<'a>,
    processor: &ProcessorOptions,
    value: &'a str,
) -> Result<Option<Cow<'a, str>>> {
    // Step 1: keywords and null pass through.
    if Keyword::is_keyword(value) {
        return Ok(Some(Cow::Borrowed(value)));
    }
    // Step 2: other keyword-shaped strings expand to nothing.
    if value.starts_with('@') {
        return Ok(None);
    }
    // Step 3.
    options.create_term_definition(value)?;
    // Step 4: a term definition exists — return its IRI mapping.
    if let Some(def_iri) = options
        .active_context()
        .term_definition(value)
        .map(Definition::iri)
        .filter(|iri| Keyword::is_keyword(iri))
    {
        return Ok(Some(Cow::Owned(def_iri.to_owned())));
    }
    // Step 5: vocab-relative lookup, including an explicit `null` definition
    // that decouples the term from `@vocab`.
    if options.vocab {
        options = match options.into_raw_term_definition(value) {
            Ok(Nullable::Null) => return Ok(None),
            Ok(Nullable::Value(def)) => return Ok(Some(Cow::Borrowed(def.iri()))),
            Err(options) => options,
        };
    }
    // Step 6: split at first `:`.
    if let Some((prefix, suffix)) = to_prefix_and_suffix(value) {
        if prefix == "_" || suffix.starts_with("//") {
            return Ok(Some(Cow::Borrowed(value)));
        }
        options.create_term_definition(prefix)?;
        if let Some(prefix_def) = options
            .active_context()
            .term_definition(prefix)
            .filter(|def| def.is_prefix())
        {
            return Ok(Some(Cow::Owned(format!("{}{}", prefix_def.iri(), suffix))));
        }
        if is_absolute_iri(value) {
            return Ok(Some(Cow::Borrowed(value)));
        }
    }
    // Step 7: plain term, vocab-relative.
    if options.vocab {
        if let Some(vocab) = options.active_context().vocab() {
            return Ok(Some(Cow::Owned(format!("{}{}", vocab, value))));
        }
    }
    // Step 8: plain term, document-relative.
    if options.document_relative {
        let base = processor.base(options.active_context());
        return Ok(Some(Cow::Owned(iri::resolve_against(value, base.as_deref()))));
    }

    // Step 9.
    Ok(Some(Cow::Borrowed(value)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::processor::ProcessorOptions;

    #[test]
    fn expands_absolute_iri_unchanged() {
        let active = Context::new();
        let processor = ProcessorOptions::new("http://example.org/");
        let result = ExpandIriOptions::constant(&active)
            .expand_str(&processor, "http://example.org/foo")
            .unwrap();
        assert_eq!(result.as_deref(), Some("http://example.org/foo"));
    }

    #[test]
    fn expands_vocab_relative_term() {
        let local = json!({"@vocab": "http://example.org/"});
        let active = context::process_context(&Context::new(), &local).unwrap();
        let processor = ProcessorOptions::new("http://example.org/");
        let result = ExpandIriOptions::constant(&active)
            .vocab(true)
            .expand_str(&processor, "name")
            .unwrap();
        assert_eq!(result.as_deref(), Some("http://example.org/name"));
    }

    #[test]
    fn keyword_shaped_unknown_string_is_dropped() {
        let active = Context::new();
        let processor = ProcessorOptions::new("http://example.org/");
        let result = ExpandIriOptions::constant(&active)
            .expand_str(&processor, "@bogus")
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn blank_node_identifier_passes_through() {
        let active = Context::new();
        let processor = ProcessorOptions::new("http://example.org/");
        let result = ExpandIriOptions::constant(&active)
            .expand_str(&processor, "_:b0")
            .unwrap();
        assert_eq!(result.as_deref(), Some("_:b0"));
    }
}
