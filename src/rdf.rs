//! RDF interconversion: Deserialize JSON-LD to RDF and Serialize RDF as
//! JSON-LD.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#deserialize-json-ld-to-rdf-algorithm>
//! and <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#serialize-rdf-as-json-ld-algorithm>.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value};

use crate::{
    error::{Error, ErrorCode, Result},
    flatten,
    json,
    namer::UniqueNamer,
    processor::{FlattenOptions, FromRdfOptions, ToRdfOptions},
    value,
};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

/// An RDF blank node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(pub String);

/// An RDF subject or object node: an IRI or a blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// An absolute IRI.
    Iri(String),
    /// A blank node.
    Blank(BlankNode),
}

impl Node {
    /// Returns the underlying string (IRI or `_:`-prefixed label).
    pub fn as_str(&self) -> &str {
        match self {
            Node::Iri(iri) => iri,
            Node::Blank(BlankNode(label)) => label,
        }
    }
}

/// An RDF literal: a lexical form plus either a datatype IRI or a
/// language tag (never both, per RDF 1.1).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Lexical form.
    pub value: String,
    /// Datatype IRI. Defaults to `xsd:string` (or `rdf:langString` when
    /// `language` is set).
    pub datatype: String,
    /// Language tag, present only when `datatype` is `rdf:langString`.
    pub language: Option<String>,
}

/// An RDF object: a node or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// A node reference.
    Node(Node),
    /// A literal value.
    Literal(Literal),
}

/// An RDF triple plus an optional graph name, i.e. a generalized quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Subject.
    pub subject: Node,
    /// Predicate (always an IRI).
    pub predicate: String,
    /// Object.
    pub object: Object,
    /// Graph name; `None` for the default graph.
    pub graph: Option<Node>,
}

/// Converts expanded-form JSON-LD `input` to RDF statements, calling
/// `sink` once per statement.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#deserialize-json-ld-to-rdf-algorithm>.
pub(crate) fn to_rdf(
    input: &[Value],
    _options: &ToRdfOptions,
    sink: &mut dyn FnMut(Option<&Statement>),
) -> Result<()> {
    let flattened = flatten::flatten_document(input, &FlattenOptions::default())?;
    let mut namer = UniqueNamer::new("_:tl");

    for node in &flattened {
        let obj = match node.as_object() {
            Some(obj) => obj,
            None => continue,
        };
        emit_graph(obj, None, &mut namer, sink)?;
    }
    Ok(())
}

/// Emits statements for one subject's properties, plus its nested
/// `@graph` (if any) under its own graph name.
fn emit_graph(
    subject_obj: &JsonMap<String, Value>,
    graph: Option<&Node>,
    namer: &mut UniqueNamer,
    sink: &mut dyn FnMut(Option<&Statement>),
) -> Result<()> {
    let subject_id = subject_obj.get("@id").and_then(Value::as_str).unwrap_or_default();
    if value::is_blank_node_id(subject_id) {
        // Already canonically labeled by flattening; keep as-is.
    }
    let subject = to_node(subject_id);

    let mut keys: Vec<&String> = subject_obj.keys().collect();
    keys.sort();

    for key in keys {
        let raw_value = &subject_obj[key];
        match key.as_str() {
            "@id" | "@index" => continue,
            "@type" => {
                for ty in json::as_array(raw_value) {
                    if let Some(ty) = ty.as_str() {
                        let statement = Statement {
                            subject: subject.clone(),
                            predicate: RDF_TYPE.to_owned(),
                            object: Object::Node(to_node(ty)),
                            graph: graph.cloned(),
                        };
                        sink(Some(&statement));
                    }
                }
            }
            "@graph" => {
                for item in json::as_array(raw_value) {
                    if let Some(item_obj) = item.as_object() {
                        emit_graph(item_obj, Some(&subject), namer, sink)?;
                    }
                }
            }
            _ => {
                for item in json::as_array(raw_value) {
                    if let Some(object) = item_to_object(&item, namer, graph, sink)? {
                        let statement = Statement {
                            subject: subject.clone(),
                            predicate: key.clone(),
                            object,
                            graph: graph.cloned(),
                        };
                        sink(Some(&statement));
                    }
                }
            }
        }
    }

    sink(None);
    Ok(())
}

/// Converts one property value to an RDF object, recursively emitting
/// the statements of a `@list` chain as a side effect.
fn item_to_object(
    item: &Value,
    namer: &mut UniqueNamer,
    graph: Option<&Node>,
    sink: &mut dyn FnMut(Option<&Statement>),
) -> Result<Option<Object>> {
    let obj = match item.as_object() {
        Some(obj) => obj,
        None => return Ok(None),
    };

    if let Some(id) = obj.get("@id").and_then(Value::as_str) {
        if obj.len() == 1 {
            return Ok(Some(Object::Node(to_node(id))));
        }
    }

    if value::is_list(obj) {
        let items = obj.get("@list").map(json::as_array).unwrap_or_default();
        return Ok(Some(Object::Node(emit_list(&items, namer, graph, sink)?)));
    }

    if value::is_value(obj) {
        return Ok(Some(Object::Literal(value_to_literal(obj)?)));
    }

    Ok(None)
}

/// Emits the `rdf:first`/`rdf:rest` chain for a `@list`, returning the
/// node that denotes its head (`rdf:nil` for an empty list).
fn emit_list(
    items: &[Value],
    namer: &mut UniqueNamer,
    graph: Option<&Node>,
    sink: &mut dyn FnMut(Option<&Statement>),
) -> Result<Node> {
    if items.is_empty() {
        return Ok(Node::Iri(RDF_NIL.to_owned()));
    }

    let labels: Vec<String> = (0..items.len()).map(|i| namer.name(&format!("_:list-{:p}-{}", items.as_ptr(), i))).collect();

    for (i, item) in items.iter().enumerate() {
        let node = Node::Blank(BlankNode(labels[i].clone()));
        if let Some(object) = item_to_object(item, namer, graph, sink)? {
            sink(Some(&Statement {
                subject: node.clone(),
                predicate: RDF_FIRST.to_owned(),
                object,
                graph: graph.cloned(),
            }));
        }
        let rest = if i + 1 < labels.len() {
            Node::Blank(BlankNode(labels[i + 1].clone()))
        } else {
            Node::Iri(RDF_NIL.to_owned())
        };
        sink(Some(&Statement {
            subject: node,
            predicate: RDF_REST.to_owned(),
            object: Object::Node(rest),
            graph: graph.cloned(),
        }));
    }

    Ok(Node::Blank(BlankNode(labels[0].clone())))
}

/// Converts a `@value` object into a literal, applying the default
/// datatype rules (boolean/double/integer/string) when no `@type` is
/// given.
fn value_to_literal(obj: &JsonMap<String, Value>) -> Result<Literal> {
    let value = obj.get("@value").cloned().unwrap_or(Value::Null);
    let explicit_type = obj.get("@type").and_then(Value::as_str);
    let language = obj.get("@language").and_then(Value::as_str).map(str::to_owned);

    if let Some(ty) = explicit_type {
        let lexical = value.as_str().map(str::to_owned).unwrap_or_else(|| value.to_string());
        return Ok(Literal {
            value: lexical,
            datatype: ty.to_owned(),
            language: None,
        });
    }

    if let Some(lang) = language {
        let lexical = value.as_str().unwrap_or_default().to_owned();
        return Ok(Literal {
            value: lexical,
            datatype: "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString".to_owned(),
            language: Some(lang),
        });
    }

    match &value {
        Value::Bool(b) => Ok(Literal {
            value: b.to_string(),
            datatype: XSD_BOOLEAN.to_owned(),
            language: None,
        }),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Literal {
            value: n.to_string(),
            datatype: XSD_INTEGER.to_owned(),
            language: None,
        }),
        Value::Number(n) => Ok(Literal {
            value: format_canonical_double(n.as_f64().unwrap_or_default()),
            datatype: XSD_DOUBLE.to_owned(),
            language: None,
        }),
        Value::String(s) => Ok(Literal {
            value: s.clone(),
            datatype: XSD_STRING.to_owned(),
            language: None,
        }),
        other => Err(Error::from(ErrorCode::InvalidValueObjectValue)
            .context(format!("cannot convert value to a literal: {other}"))),
    }
}

/// Formats a double in the canonical `E`-notation xsd:double lexical
/// form used by the JSON-LD spec's to-RDF algorithm.
fn format_canonical_double(v: f64) -> String {
    let formatted = format!("{:E}", v);
    let (mantissa, exponent) = formatted.split_once('E').expect("exponential format always has an E");
    let mantissa = if mantissa.contains('.') {
        mantissa.to_owned()
    } else {
        format!("{mantissa}.0")
    };
    format!("{mantissa}E{exponent}")
}

/// Converts a JSON-LD string value (IRI or blank node id) into a `Node`.
fn to_node(s: &str) -> Node {
    if value::is_blank_node_id(s) {
        Node::Blank(BlankNode(s.to_owned()))
    } else {
        Node::Iri(s.to_owned())
    }
}

/// Converts RDF statements back into expanded-form JSON-LD, one array
/// entry per graph (default graph last is not guaranteed; subjects are
/// sorted by id within each graph).
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#serialize-rdf-as-json-ld-algorithm>.
pub(crate) fn from_rdf(statements: &[Statement], options: &FromRdfOptions) -> Result<Vec<Value>> {
    let mut graphs: HashMap<String, JsonMap<String, Value>> = HashMap::new();
    let mut list_firsts: HashMap<String, Value> = HashMap::new();
    let mut list_rests: HashMap<String, String> = HashMap::new();
    let mut referenced_as_rest: std::collections::HashSet<String> = std::collections::HashSet::new();

    for statement in statements {
        let graph_name = statement.graph.as_ref().map_or("@default".to_owned(), |g| g.as_str().to_owned());
        let graph = graphs.entry(graph_name).or_default();
        let subject_id = statement.subject.as_str().to_owned();
        let node = graph
            .entry(subject_id.clone())
            .or_insert_with(|| Value::Object(json::single_entry_map("@id", subject_id.clone())));
        let node_obj = node.as_object_mut().expect("node is always an object");

        if statement.predicate == RDF_FIRST {
            let value = object_to_value(&statement.object, options)?;
            list_firsts.insert(subject_id.clone(), value);
            continue;
        }
        if statement.predicate == RDF_REST {
            if let Object::Node(rest) = &statement.object {
                list_rests.insert(subject_id.clone(), rest.as_str().to_owned());
                referenced_as_rest.insert(rest.as_str().to_owned());
            }
            continue;
        }
        if statement.predicate == RDF_TYPE && !options.use_rdf_type {
            if let Object::Node(ty) = &statement.object {
                let entry = node_obj.entry("@type".to_owned()).or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(arr) = entry {
                    arr.push(Value::String(ty.as_str().to_owned()));
                }
            }
            continue;
        }

        let value = object_to_value(&statement.object, options)?;
        let entry = node_obj.entry(statement.predicate.clone()).or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(arr) = entry {
            arr.push(value);
        }
    }

    // Reconstruct @list chains: every node that starts a first/rest chain
    // and is never itself referenced as a rest target is a list head.
    for graph in graphs.values_mut() {
        let list_heads: Vec<String> = list_firsts
            .keys()
            .filter(|id| !referenced_as_rest.contains(*id))
            .cloned()
            .collect();

        for head in list_heads {
            let mut items = Vec::new();
            let mut cursor = head.clone();
            loop {
                match list_firsts.get(&cursor) {
                    Some(v) => items.push(v.clone()),
                    None => {
                        return Err(Error::from(ErrorCode::RdfError)
                            .context(format!("dangling rdf:rest chain at {cursor}")))
                    }
                }
                match list_rests.get(&cursor) {
                    Some(next) if next == RDF_NIL => break,
                    Some(next) => cursor = next.clone(),
                    None => {
                        return Err(Error::from(ErrorCode::RdfError)
                            .context(format!("dangling rdf:rest chain at {cursor}")))
                    }
                }
            }

            // Replace any reference to `head` with the reconstructed list.
            let list_value = Value::Object(json::single_entry_map("@list", Value::Array(items)));
            for node in graph.values_mut() {
                if let Some(node_obj) = node.as_object_mut() {
                    for value in node_obj.values_mut() {
                        if let Value::Array(arr) = value {
                            for entry in arr.iter_mut() {
                                if entry.get("@id").and_then(Value::as_str) == Some(head.as_str()) {
                                    *entry = list_value.clone();
                                }
                            }
                        }
                    }
                }
            }
            graph.remove(&head);
        }
    }

    let default_graph = graphs.remove("@default").unwrap_or_default();
    let mut named_graph_names: Vec<String> = graphs.keys().cloned().collect();
    named_graph_names.sort();

    let mut result: Vec<Value> = Vec::new();
    let mut default_ids: Vec<String> = default_graph.keys().cloned().collect();
    default_ids.sort();
    for id in default_ids {
        let mut node = default_graph[&id].clone();
        if let Some(graph_nodes) = graphs.get(&id) {
            let mut ids: Vec<String> = graph_nodes.keys().cloned().collect();
            ids.sort();
            let entries: Vec<Value> = ids.into_iter().map(|i| graph_nodes[&i].clone()).collect();
            if let Some(obj) = node.as_object_mut() {
                obj.insert("@graph".to_owned(), Value::Array(entries));
            }
        }
        result.push(node);
    }

    Ok(result)
}

/// Converts an RDF object back into an expanded-form JSON-LD value.
fn object_to_value(object: &Object, options: &FromRdfOptions) -> Result<Value> {
    match object {
        Object::Node(node) => Ok(Value::Object(json::single_entry_map("@id", node.as_str().to_owned()))),
        Object::Literal(literal) => {
            let mut obj = JsonMap::new();
            if options.use_native_types {
                match literal.datatype.as_str() {
                    XSD_BOOLEAN => {
                        if let Ok(b) = literal.value.parse::<bool>() {
                            obj.insert("@value".to_owned(), Value::Bool(b));
                            return Ok(Value::Object(obj));
                        }
                    }
                    XSD_INTEGER => {
                        if let Ok(i) = literal.value.parse::<i64>() {
                            obj.insert("@value".to_owned(), Value::Number(i.into()));
                            return Ok(Value::Object(obj));
                        }
                    }
                    XSD_DOUBLE => {
                        if let Ok(f) = literal.value.parse::<f64>() {
                            if let Some(n) = serde_json::Number::from_f64(f) {
                                obj.insert("@value".to_owned(), Value::Number(n));
                                return Ok(Value::Object(obj));
                            }
                        }
                    }
                    _ => {}
                }
            }

            obj.insert("@value".to_owned(), Value::String(literal.value.clone()));
            if let Some(lang) = &literal.language {
                obj.insert("@language".to_owned(), Value::String(lang.clone()));
            } else if literal.datatype != XSD_STRING {
                obj.insert("@type".to_owned(), Value::String(literal.datatype.clone()));
            }
            Ok(Value::Object(obj))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn to_rdf_emits_basic_triple() {
        let input = vec![json!({"@id": "http://ex/a", "http://ex/p": [{"@value": "v"}]})];
        let mut statements = Vec::new();
        to_rdf(&input, &ToRdfOptions::default(), &mut |s| {
            if let Some(s) = s {
                statements.push(s.clone());
            }
        })
        .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].subject, Node::Iri("http://ex/a".to_owned()));
        assert_eq!(statements[0].predicate, "http://ex/p");
    }

    #[test]
    fn to_rdf_emits_type_as_rdf_type() {
        let input = vec![json!({"@id": "http://ex/a", "@type": ["http://ex/Thing"]})];
        let mut statements = Vec::new();
        to_rdf(&input, &ToRdfOptions::default(), &mut |s| {
            if let Some(s) = s {
                statements.push(s.clone());
            }
        })
        .unwrap();
        assert_eq!(statements[0].predicate, RDF_TYPE);
    }

    #[test]
    fn round_trips_simple_triple() {
        let input = vec![json!({"@id": "http://ex/a", "http://ex/p": [{"@value": "v"}]})];
        let mut statements = Vec::new();
        to_rdf(&input, &ToRdfOptions::default(), &mut |s| {
            if let Some(s) = s {
                statements.push(s.clone());
            }
        })
        .unwrap();
        let back = from_rdf(&statements, &FromRdfOptions::default()).unwrap();
        assert_eq!(back[0]["@id"], "http://ex/a");
        assert_eq!(back[0]["http://ex/p"][0]["@value"], "v");
    }

    #[test]
    fn formats_canonical_double_lexical_form() {
        assert_eq!(format_canonical_double(1.0), "1.0E0");
        assert_eq!(format_canonical_double(100.0), "1.0E2");
        assert_eq!(format_canonical_double(-1.5), "-1.5E0");
    }

    #[test]
    fn use_rdf_type_keeps_rdf_type_as_a_property() {
        let input = vec![json!({"@id": "http://ex/a", "@type": ["http://ex/Thing"]})];
        let mut statements = Vec::new();
        to_rdf(&input, &ToRdfOptions::default(), &mut |s| {
            if let Some(s) = s {
                statements.push(s.clone());
            }
        })
        .unwrap();
        let options = FromRdfOptions {
            use_rdf_type: true,
            ..FromRdfOptions::default()
        };
        let back = from_rdf(&statements, &options).unwrap();
        assert!(back[0].get("@type").is_none());
        assert_eq!(back[0][RDF_TYPE][0]["@id"], "http://ex/Thing");
    }

    #[test]
    fn reconstructs_list_from_chain() {
        let input = vec![json!({
            "@id": "http://ex/a",
            "http://ex/items": [{"@list": [{"@value": "x"}, {"@value": "y"}]}]
        })];
        let mut statements = Vec::new();
        to_rdf(&input, &ToRdfOptions::default(), &mut |s| {
            if let Some(s) = s {
                statements.push(s.clone());
            }
        })
        .unwrap();
        let back = from_rdf(&statements, &FromRdfOptions::default()).unwrap();
        let items = &back[0]["http://ex/items"][0]["@list"];
        assert_eq!(items[0]["@value"], "x");
        assert_eq!(items[1]["@value"], "y");
    }
}
