//! End-to-end conformance tests driving the public `Processor` operations
//! against the scenarios and invariants from the core specification.

use jsonld_core::{
    CompactOptions, ExpandOptions, FlattenOptions, FrameOptions, NoopLoader, Object, Processor,
    ProcessorOptions, ToRdfOptions,
};
use serde_json::{json, Value};

fn processor() -> Processor<NoopLoader> {
    Processor::new(ProcessorOptions::new(""), NoopLoader)
}

#[test]
fn context_alias_expands_to_absolute_iri() {
    let p = processor();
    let input = json!({
        "@context": {"name": "http://schema.org/name"},
        "name": "Alice",
    });
    let expanded = p.expand(&input, &ExpandOptions::default()).unwrap();
    assert_eq!(
        expanded,
        vec![json!({"http://schema.org/name": [{"@value": "Alice"}]})]
    );
}

#[test]
fn type_coercion_attaches_datatype() {
    let p = processor();
    let input = json!({
        "@context": {
            "born": {"@id": "http://ex/born", "@type": "http://www.w3.org/2001/XMLSchema#date"}
        },
        "born": "1999-01-01",
    });
    let expanded = p.expand(&input, &ExpandOptions::default()).unwrap();
    assert_eq!(
        expanded,
        vec![json!({
            "http://ex/born": [{
                "@value": "1999-01-01",
                "@type": "http://www.w3.org/2001/XMLSchema#date",
            }],
        })]
    );

    let mut statements = Vec::new();
    p.to_rdf(&expanded, &ToRdfOptions::default(), &mut |s| {
        if let Some(s) = s {
            statements.push(s.clone());
        }
    })
    .unwrap();
    assert_eq!(statements.len(), 1);
    match &statements[0].object {
        Object::Literal(lit) => {
            assert_eq!(lit.datatype, "http://www.w3.org/2001/XMLSchema#date");
            assert_eq!(lit.value, "1999-01-01");
        }
        _ => panic!("expected a literal object"),
    }
}

#[test]
fn list_container_round_trips_through_rdf() {
    let p = processor();
    let input = json!({
        "@context": {"friends": {"@id": "http://ex/f", "@container": "@list"}},
        "friends": ["a", "b"],
    });
    let expanded = p.expand(&input, &ExpandOptions::default()).unwrap();
    assert_eq!(
        expanded,
        vec![json!({
            "http://ex/f": [{"@list": [{"@value": "a"}, {"@value": "b"}]}],
        })]
    );

    let mut statements = Vec::new();
    p.to_rdf(&expanded, &ToRdfOptions::default(), &mut |s| {
        if let Some(s) = s {
            statements.push(s.clone());
        }
    })
    .unwrap();
    // Two rdf:first/rdf:rest cells (four statements) plus the link from
    // the free-floating subject into the list head.
    assert_eq!(statements.len(), 5);
}

#[test]
fn frame_matches_only_nodes_with_the_requested_type() {
    let p = processor();
    let graph = vec![
        json!({"@id": "http://ex/a", "@type": ["http://ex/P"], "http://ex/name": [{"@value": "x"}]}),
        json!({"@id": "http://ex/b", "@type": ["http://ex/Q"]}),
    ];
    let frame_doc = json!({"@type": "http://ex/P"});
    let framed = p.frame(&graph, &frame_doc, &FrameOptions::default()).unwrap();
    let graph_entries = framed.get("@graph").and_then(Value::as_array).cloned().unwrap_or_else(|| vec![framed.clone()]);
    assert_eq!(graph_entries.len(), 1);
    assert_eq!(graph_entries[0].get("@id").and_then(Value::as_str), Some("http://ex/a"));
}

#[test]
fn compact_then_expand_round_trips_to_the_same_expanded_form() {
    let p = processor();
    let context = json!({"name": "http://schema.org/name"});
    let expanded = vec![json!({"http://schema.org/name": [{"@value": "Alice"}]})];

    let options = CompactOptions { compact_arrays: true };
    let compacted = p.compact(&expanded, &context, &options).unwrap();
    assert_eq!(compacted.get("name").and_then(Value::as_str), Some("Alice"));

    let re_expanded = p.expand(&compacted, &ExpandOptions::default()).unwrap();
    assert_eq!(re_expanded, expanded);
}

#[test]
fn expand_is_idempotent() {
    let p = processor();
    let input = json!({
        "@context": {"name": "http://schema.org/name"},
        "name": "Alice",
    });
    let once = p.expand(&input, &ExpandOptions::default()).unwrap();
    let input_again = Value::Array(once.clone());
    let twice = p.expand(&input_again, &ExpandOptions::default()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn null_context_resets_active_context() {
    let p = processor();
    let input = json!({
        "@context": [{"name": "http://schema.org/name"}, null],
        "name": "Alice",
    });
    // With the context reset, "name" is a plain (non-absolute, non-keyword)
    // key with no active property, so it is dropped during expansion.
    let expanded = p.expand(&input, &ExpandOptions::default()).unwrap();
    assert!(expanded.is_empty());
}

#[test]
fn flatten_assigns_stable_blank_node_labels() {
    let p = processor();
    let input = vec![
        json!({"@id": "_:x", "http://ex/p": [{"@id": "_:y"}]}),
        json!({"@id": "_:y"}),
    ];
    let flattened = p.flatten(&input, &FlattenOptions::default()).unwrap();
    assert_eq!(flattened.len(), 2);
    for node in &flattened {
        let id = node.get("@id").and_then(Value::as_str).unwrap();
        assert!(id.starts_with("_:"));
    }
}

#[test]
fn empty_frame_returns_every_subject_exactly_once() {
    let p = processor();
    let graph = vec![
        json!({"@id": "http://ex/a", "http://ex/p": [{"@value": "1"}]}),
        json!({"@id": "http://ex/b", "http://ex/p": [{"@value": "2"}]}),
    ];
    let framed = p.frame(&graph, &json!({}), &FrameOptions::default()).unwrap();
    let entries = framed.get("@graph").and_then(Value::as_array).cloned().unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn list_of_list_is_a_syntax_error() {
    let p = processor();
    let input = json!({
        "@context": {"items": {"@id": "http://ex/items", "@container": "@list"}},
        "items": [["a", "b"]],
    });
    let result = p.expand(&input, &ExpandOptions::default());
    assert!(result.is_err());
}
