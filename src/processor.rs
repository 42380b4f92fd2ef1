//! JSON-LD processor.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldprocessor-interface>.

use serde_json::Value;

use crate::{
    compact, context::Context, error::Result, expand, flatten, frame, normalize, rdf::Statement,
    remote::ContextLoader,
};

/// JSON-LD processor options.
///
/// See <https://www.w3.org/TR/2014/REC-json-ld-api-20140116/#the-jsonldoptions-type>.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    /// Base IRI (or document IRI).
    document_iri: String,
}

impl ProcessorOptions {
    /// Creates new processor options with the given document/base IRI.
    pub fn new(document_iri: impl Into<String>) -> Self {
        Self {
            document_iri: document_iri.into(),
        }
    }

    /// Returns the base IRI set by the processor.
    pub(crate) fn document_iri(&self) -> &str {
        &self.document_iri
    }

    /// Returns the base IRI to resolve relative IRIs against: the active
    /// context's `@base` if set, falling back to the document IRI unless
    /// `@base` was explicitly nullified.
    ///
    /// Note that the base can be empty (null) when
    /// `{ "@context": { "@base": null } }` is specified — in that case
    /// this returns `None`.
    pub(crate) fn base(&self, context: &Context) -> Option<String> {
        match context.base() {
            Some(base) => Some(base.to_owned()),
            None => Some(self.document_iri.clone()),
        }
    }
}

/// Options shared by `expand`/`compact`/`flatten`/`frame`: the input
/// document's base IRI and whether to drop (default) or keep free
/// floating nodes during expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandOptions {
    /// Whether top-level free-floating nodes that yield no triples are
    /// kept rather than dropped.
    pub keep_free_floating_nodes: bool,
}

/// Options for `compact`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompactOptions {
    /// Whether to compact arrays of one element to that element.
    pub compact_arrays: bool,
}

/// Options for `flatten`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenOptions {
    /// Prefix used for generated blank node identifiers.
    pub blank_node_prefix: Option<String>,
}

/// Options for `frame`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOptions {
    /// Default `@embed` mode (`@last` per the 1.1 default) when a frame
    /// does not specify one.
    pub embed_by_default_last: bool,
}

/// Options for `to_rdf`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToRdfOptions {}

/// Options for `from_rdf`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromRdfOptions {
    /// Whether native types (`xsd:boolean`, `xsd:integer`, `xsd:double`)
    /// are converted to native JSON booleans/numbers.
    pub use_native_types: bool,
    /// Whether `rdf:type` statements are kept as a regular property
    /// keyed by the `rdf:type` IRI instead of being collapsed into
    /// `@type`.
    pub use_rdf_type: bool,
}

/// JSON-LD processor.
///
/// Owns the options shared by every operation and the context loader
/// used whenever a local context references a remote context by IRI.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldprocessor-interface>
/// and <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldoptions-type>.
pub struct Processor<L> {
    /// Processor options (except a loader).
    options: ProcessorOptions,
    /// Remote context loader.
    loader: L,
}

impl<L> Processor<L> {
    /// Creates a new processor with the given options and loader.
    pub fn new(options: ProcessorOptions, loader: L) -> Self {
        Self { options, loader }
    }

    /// Returns processor options.
    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Returns the context loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: ContextLoader> Processor<L> {
    /// Runs the context processing algorithm, applying `local` on top of
    /// `active`.
    pub fn process_context(&self, active: &Context, local: &Value) -> Result<Context> {
        crate::context::process_context(active, local)
    }

    /// Expands `input` under the processor's base IRI.
    pub fn expand(&self, input: &Value, options: &ExpandOptions) -> Result<Vec<Value>> {
        expand::expand_document(&self.options, input, options)
    }

    /// Compacts `input` (already in expanded form) against `context`.
    pub fn compact(&self, input: &[Value], context: &Value, options: &CompactOptions) -> Result<Value> {
        compact::compact_document(&self.options, input, context, options)
    }

    /// Flattens `input` (already in expanded form) into a single array of
    /// node objects.
    pub fn flatten(&self, input: &[Value], options: &FlattenOptions) -> Result<Vec<Value>> {
        flatten::flatten_document(input, options)
    }

    /// Frames `input` (already in expanded form) using `frame`.
    pub fn frame(&self, input: &[Value], frame_doc: &Value, options: &FrameOptions) -> Result<Value> {
        frame::frame_document(input, frame_doc, options)
    }

    /// Converts `input` (already in expanded form) to RDF statements,
    /// calling `sink` for each statement and once with `None` per graph
    /// to mark its end (mirroring the streaming to-RDF interface).
    pub fn to_rdf(
        &self,
        input: &[Value],
        options: &crate::processor::ToRdfOptions,
        sink: &mut dyn FnMut(Option<&Statement>),
    ) -> Result<()> {
        crate::rdf::to_rdf(input, options, sink)
    }

    /// Converts RDF statements back into expanded-form JSON-LD.
    pub fn from_rdf(&self, statements: &[Statement], options: &FromRdfOptions) -> Result<Vec<Value>> {
        crate::rdf::from_rdf(statements, options)
    }

    /// Normalizes `input`: flattens, converts to RDF, and canonically
    /// labels blank nodes.
    pub fn normalize(&self, input: &[Value], options: &ToRdfOptions) -> Result<Vec<Statement>> {
        normalize::normalize(input, options)
    }
}
