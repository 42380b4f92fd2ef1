//! IRI-related helpers.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#iris> and
//! RFC 3986 §5 (Reference Resolution).

use iri_string::types::{IriReferenceStr, IriStr};

/// IRI category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IriCategory {
    /// Blank node identifier.
    BlankNodeIdentifier,
    /// Absolute IRI (which can contain fragment part).
    AbsoluteIri,
    /// Compact IRI.
    ///
    /// Note that this is also a relative IRI.
    CompactIri,
}

impl IriCategory {
    /// Returns `IriCategory` for the given prefix and suffix.
    fn from_prefix_and_suffix(prefix: &str, suffix: &str) -> Self {
        if prefix == "_" {
            return IriCategory::BlankNodeIdentifier;
        }
        if suffix.starts_with("//") {
            // NOTE: In JSON-LD spec, "absolute IRI" can have fragment part.
            // This is "IRI" but not "absolute IRI" in RFC 3987.
            IriCategory::AbsoluteIri
        } else {
            IriCategory::CompactIri
        }
    }
}

impl From<&str> for IriCategory {
    fn from(s: &str) -> Self {
        to_prefix_and_suffix(s).map_or(IriCategory::CompactIri, |(prefix, suffix)| {
            Self::from_prefix_and_suffix(prefix, suffix)
        })
    }
}

/// Split the given string to prefix part and suffix part.
pub(crate) fn to_prefix_and_suffix(s: &str) -> Option<(&str, &str)> {
    s.find(':')
        .map(|colon_pos| (&s[..colon_pos], &s[(colon_pos + 1)..]))
}

/// Checks whether the given string is has the form of an absolute IRI.
pub(crate) fn is_absolute_iri(s: &str) -> bool {
    IriCategory::from(s) == IriCategory::AbsoluteIri
}

/// Checks whether the given string is a blank node identifier (`_:` prefix).
pub(crate) fn is_blank_node_ident(s: &str) -> bool {
    IriCategory::from(s) == IriCategory::BlankNodeIdentifier
}

/// Checks whether the given string is either an absolute IRI or a blank
/// node identifier.
pub(crate) fn is_absolute_or_blank_node_ident(s: &str) -> bool {
    is_absolute_iri(s) || is_blank_node_ident(s)
}

/// Resolves `relative` against `base` per RFC 3986 §5, failing open: if
/// `base` cannot be parsed as an absolute IRI, or `relative` is not a
/// valid IRI reference, the relative string is returned unchanged rather
/// than raising an error.
///
/// See spec's IRI utilities: "If base cannot be parsed, the relative IRI
/// is returned unchanged (fails open)."
pub(crate) fn resolve_against(relative: &str, base: Option<&str>) -> String {
    let base = match base.and_then(|b| IriStr::new(b).ok()) {
        Some(base) => base,
        None => return relative.to_owned(),
    };
    let relative_ref = match IriReferenceStr::new(relative) {
        Ok(r) => r,
        Err(_) => return relative.to_owned(),
    };
    relative_ref.resolve_against(base.to_absolute()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_absolute() {
        assert!(is_absolute_iri("http://example.org/foo"));
        assert!(!is_absolute_iri("foo/bar"));
        assert!(!is_absolute_iri("_:b0"));
    }

    #[test]
    fn classify_blank_node() {
        assert!(is_blank_node_ident("_:b0"));
        assert!(!is_blank_node_ident("http://example.org/foo"));
    }

    #[test]
    fn resolve_relative_against_base() {
        let resolved = resolve_against("bar", Some("http://example.org/foo/"));
        assert_eq!(resolved, "http://example.org/foo/bar");
    }

    #[test]
    fn resolve_fails_open_without_base() {
        assert_eq!(resolve_against("bar", None), "bar");
    }

    #[test]
    fn resolve_fails_open_on_unparsable_base() {
        assert_eq!(resolve_against("bar", Some("not a url")), "bar");
    }

    #[test]
    fn resolve_empty_relative_returns_base() {
        let resolved = resolve_against("", Some("http://example.org/foo"));
        assert_eq!(resolved, "http://example.org/foo");
    }
}
