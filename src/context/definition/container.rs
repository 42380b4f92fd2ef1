//! `@container` value.

use serde_json::Value;
use thiserror::Error as ThisError;

/// Possible values for `@container`.
///
/// Unlike JSON-LD 1.1 (which allows combined containers such as
/// `["@set", "@index"]`), the container mapping modelled here is a single
/// value, matching the term-definition shape this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ContainerItem {
    /// `@list`.
    List,
    /// `@set`.
    Set,
    /// `@index`.
    Index,
    /// `@language`.
    Language,
}

impl ContainerItem {
    /// Returns the canonical `@`-prefixed string for this container kind.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ContainerItem::List => "@list",
            ContainerItem::Set => "@set",
            ContainerItem::Index => "@index",
            ContainerItem::Language => "@language",
        }
    }

    /// Parses a single `@container` string value.
    pub(crate) fn parse(s: &str) -> Result<Self, ContainerLoadError> {
        match s {
            "@list" => Ok(Self::List),
            "@set" => Ok(Self::Set),
            "@index" => Ok(Self::Index),
            "@language" => Ok(Self::Language),
            v => Err(ContainerLoadError::new(format_args!(
                "unknown @container value: {:?}",
                v
            ))),
        }
    }

    /// Validates and converts a raw `@container` JSON value (`null` or a
    /// single string) into a container mapping.
    pub(crate) fn from_json(v: &Value) -> Result<Option<Self>, ContainerLoadError> {
        match v {
            Value::Null => Ok(None),
            Value::String(s) => Self::parse(s).map(Some),
            v => Err(ContainerLoadError::new(format_args!(
                "expected a string or null for @container, got {:?}",
                v
            ))),
        }
    }
}

/// `@container` load error.
#[derive(Debug, Clone, ThisError)]
#[error("failed to load @container: {msg}")]
pub(crate) struct ContainerLoadError {
    /// Message.
    msg: String,
}

impl ContainerLoadError {
    /// Creates a new error.
    fn new(msg: impl std::fmt::Display) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_known_values() {
        assert_eq!(ContainerItem::parse("@list").unwrap(), ContainerItem::List);
        assert_eq!(ContainerItem::parse("@set").unwrap(), ContainerItem::Set);
        assert!(ContainerItem::parse("@graph").is_err());
    }

    #[test]
    fn from_json_null_is_none() {
        assert_eq!(ContainerItem::from_json(&json!(null)).unwrap(), None);
    }
}
