//! JSON-LD core processing library.
//!
//! This crate implements the algorithmic core of a JSON-LD processor:
//! context processing, IRI expansion/compaction, document expansion and
//! compaction, flattening, framing, and RDF interconversion. It consumes
//! and produces [`serde_json::Value`] trees; it performs no I/O itself.
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub use iri_string;

pub use self::{
    context::Context,
    error::{Error, ErrorCode, Result},
    processor::{
        CompactOptions, ExpandOptions, FlattenOptions, FrameOptions, FromRdfOptions, Processor,
        ProcessorOptions, ToRdfOptions,
    },
    rdf::{BlankNode, Literal, Node, Object, Statement},
    remote::{ContextLoader, NoopLoader, RemoteDocument},
};

pub(crate) mod compact;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod expand;
pub(crate) mod flatten;
pub(crate) mod frame;
pub(crate) mod iri;
pub(crate) mod json;
pub(crate) mod namer;
pub(crate) mod normalize;
pub(crate) mod processor;
pub(crate) mod rdf;
pub(crate) mod remote;
pub(crate) mod syntax;
pub(crate) mod value;
