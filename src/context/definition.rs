//! Term definition.

pub(crate) use self::container::ContainerItem;
use crate::json::Nullable;

mod container;

/// Term definition.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#dfn-term-definition>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    /// IRI mapping, or a keyword when this definition aliases one.
    // This can be a non-IRI-reference (such as keywords), so use `String` here.
    iri: String,
    /// Type mapping: an absolute IRI, or `@id`/`@vocab`.
    ty: Option<String>,
    /// Container mapping.
    container: Option<ContainerItem>,
    /// Language mapping. `Some(Nullable::Null)` pins "no language"
    /// explicitly, distinct from "unspecified" (`None`).
    language: Option<Nullable<String>>,
    /// Reverse property flag.
    reverse: bool,
    /// Prefix flag: whether this term may be used as a compact-IRI prefix.
    prefix: bool,
}

impl Definition {
    /// Returns the IRI mapping.
    pub(crate) fn iri(&self) -> &str {
        &self.iri
    }

    /// Returns the type mapping.
    pub(crate) fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Returns the container mapping.
    pub(crate) fn container(&self) -> Option<ContainerItem> {
        self.container
    }

    /// Returns the language mapping.
    pub(crate) fn language(&self) -> Option<Nullable<&str>> {
        self.language.as_ref().map(|n| n.as_ref().map(String::as_str))
    }

    /// Returns the reverse property flag.
    pub(crate) fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Returns the prefix flag.
    pub(crate) fn is_prefix(&self) -> bool {
        self.prefix
    }
}

/// Builder of [`Definition`].
///
/// Term definitions are assembled incrementally while `create term
/// definition` walks a term's raw JSON value, so a builder keeps
/// intermediate state without forcing every caller to track which fields
/// have been set.
#[derive(Default, Debug, Clone)]
pub(crate) struct DefinitionBuilder {
    /// IRI mapping or reverse property IRI.
    iri: Option<String>,
    /// Type mapping.
    ty: Option<String>,
    /// Container mapping.
    container: Option<Nullable<ContainerItem>>,
    /// Language mapping.
    language: Option<Nullable<String>>,
    /// Reverse property flag.
    reverse: Option<bool>,
    /// Prefix flag.
    prefix: bool,
}

impl DefinitionBuilder {
    /// Creates a new, empty builder.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds the definition.
    ///
    /// # Panics
    ///
    /// Panics if the IRI mapping has not been set; `create term
    /// definition` always sets it before returning.
    pub(crate) fn build(self) -> Definition {
        Definition {
            iri: self.iri.expect("IRI mapping must be set"),
            ty: self.ty,
            container: self.container.and_then(|n| n.into()),
            language: self.language,
            reverse: self.reverse.unwrap_or(false),
            prefix: self.prefix,
        }
    }

    /// Sets the IRI mapping.
    pub(crate) fn set_iri(&mut self, v: impl Into<String>) {
        self.iri = Some(v.into());
    }

    /// Returns the IRI mapping, if set.
    pub(crate) fn iri(&self) -> Option<&str> {
        self.iri.as_deref()
    }

    /// Sets the type mapping.
    pub(crate) fn set_ty(&mut self, v: impl Into<String>) {
        self.ty = Some(v.into());
    }

    /// Returns the type mapping, if set.
    pub(crate) fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Sets the container mapping.
    pub(crate) fn set_container(&mut self, v: Nullable<ContainerItem>) {
        self.container = Some(v);
    }

    /// Sets the language mapping.
    pub(crate) fn set_language(&mut self, v: Nullable<String>) {
        self.language = Some(v);
    }

    /// Sets the reverse property flag.
    pub(crate) fn set_reverse(&mut self, v: bool) {
        self.reverse = Some(v);
    }

    /// Sets the prefix flag.
    pub(crate) fn set_prefix(&mut self, v: bool) {
        self.prefix = v;
    }
}
