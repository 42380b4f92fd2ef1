//! Remote-document related stuff.

use serde_json::Value;

pub mod profile;

/// A trait for types which can load a remote JSON-LD context document.
///
/// Unlike the originating processor's remote-document trait, `load` is a
/// plain synchronous call: the processor is required to run single
/// threaded with no suspension, so there is nothing for an `async fn`
/// seam to buy here. Implementors that need network I/O should block
/// internally (or pre-fetch and serve from a cache).
pub trait ContextLoader {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads a remote context.
    fn load(&self, iri: &str) -> Result<RemoteDocument, Self::Error>;
}

/// A loader that never succeeds, for processors that only ever receive
/// contexts embedded in-document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

/// Error returned by [`NoopLoader`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("remote context loading is not supported: {iri}")]
pub struct NoopLoaderError {
    /// The IRI that could not be loaded.
    iri: String,
}

impl ContextLoader for NoopLoader {
    type Error = NoopLoaderError;

    fn load(&self, iri: &str) -> Result<RemoteDocument, Self::Error> {
        Err(NoopLoaderError { iri: iri.to_owned() })
    }
}

/// Remote document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// Context URL.
    context_url: Option<String>,
    /// Document IRI.
    document_url: String,
    /// Document.
    document: Value,
}

impl RemoteDocument {
    /// Creates a new `RemoteDocument`.
    pub fn new(document_url: impl Into<String>, document: Value) -> Self {
        Self {
            context_url: None,
            document_url: document_url.into(),
            document,
        }
    }

    /// Sets the `Link: <...>; rel="http://www.w3.org/ns/json-ld#context"` URL.
    pub fn with_context_url(mut self, context_url: impl Into<String>) -> Self {
        self.context_url = Some(context_url.into());
        self
    }

    /// Returns the document IRI.
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Returns the context URL, if any.
    pub fn context_url(&self) -> Option<&str> {
        self.context_url.as_deref()
    }

    /// Returns a reference to the document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the document with ownership.
    pub fn into_document(self) -> Value {
        self.document
    }
}
