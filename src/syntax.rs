//! JSON-LD syntax related stuff.

/// Checks whether a string has the form of a keyword.
///
/// > having the form of a keyword (i.e., it matches the ABNF rule `"@"1*ALPHA` from \[RFC5234\]),
/// >
/// > --- <https://www.w3.org/TR/2019/WD-json-ld11-api-20191112/>
pub(crate) fn has_form_of_keyword(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('@') && s[1..].bytes().all(|b| b.is_ascii_alphabetic())
}

/// The fixed set of JSON-LD keywords recognised by this processor.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#syntax-tokens-and-keywords>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Keyword {
    /// `@base`.
    Base,
    /// `@context`.
    Context,
    /// `@container`.
    Container,
    /// `@default`.
    Default,
    /// `@embed`.
    Embed,
    /// `@explicit`.
    Explicit,
    /// `@graph`.
    Graph,
    /// `@id`.
    Id,
    /// `@index`.
    Index,
    /// `@language`.
    Language,
    /// `@list`.
    List,
    /// `@null`.
    Null,
    /// `@omitDefault`.
    OmitDefault,
    /// `@preserve`.
    Preserve,
    /// `@reverse`.
    Reverse,
    /// `@set`.
    Set,
    /// `@type`.
    Type,
    /// `@value`.
    Value,
    /// `@vocab`.
    Vocab,
}

impl Keyword {
    /// All keyword variants, used for exhaustive lookups and round-trips.
    pub(crate) const ALL: &'static [Keyword] = &[
        Keyword::Base,
        Keyword::Context,
        Keyword::Container,
        Keyword::Default,
        Keyword::Embed,
        Keyword::Explicit,
        Keyword::Graph,
        Keyword::Id,
        Keyword::Index,
        Keyword::Language,
        Keyword::List,
        Keyword::Null,
        Keyword::OmitDefault,
        Keyword::Preserve,
        Keyword::Reverse,
        Keyword::Set,
        Keyword::Type,
        Keyword::Value,
        Keyword::Vocab,
    ];

    /// Returns the canonical `@`-prefixed string for this keyword.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Keyword::Base => "@base",
            Keyword::Context => "@context",
            Keyword::Container => "@container",
            Keyword::Default => "@default",
            Keyword::Embed => "@embed",
            Keyword::Explicit => "@explicit",
            Keyword::Graph => "@graph",
            Keyword::Id => "@id",
            Keyword::Index => "@index",
            Keyword::Language => "@language",
            Keyword::List => "@list",
            Keyword::Null => "@null",
            Keyword::OmitDefault => "@omitDefault",
            Keyword::Preserve => "@preserve",
            Keyword::Reverse => "@reverse",
            Keyword::Set => "@set",
            Keyword::Type => "@type",
            Keyword::Value => "@value",
            Keyword::Vocab => "@vocab",
        }
    }

    /// Parses a keyword from its canonical string form.
    pub(crate) fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kw| kw.as_str() == s)
    }

    /// Checks whether `s` is a recognised keyword (the canonical spelling,
    /// not merely something with keyword *form*).
    pub(crate) fn is_keyword(s: &str) -> bool {
        Self::from_str(s).is_some()
    }

    /// Checks whether this keyword may never be aliased by a term
    /// definition.
    pub(crate) fn is_unaliasable(self) -> bool {
        matches!(self, Keyword::Context | Keyword::Preserve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_form() {
        assert!(has_form_of_keyword("@id"));
        assert!(!has_form_of_keyword("@"));
        assert!(!has_form_of_keyword("@1"));
        assert!(!has_form_of_keyword("id"));
    }

    #[test]
    fn roundtrip() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(*kw));
        }
        assert_eq!(Keyword::from_str("@bogus"), None);
    }

    #[test]
    fn unaliasable() {
        assert!(Keyword::Context.is_unaliasable());
        assert!(Keyword::Preserve.is_unaliasable());
        assert!(!Keyword::Id.is_unaliasable());
    }
}
