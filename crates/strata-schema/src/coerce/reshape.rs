//! Name, cardinality and default normalization of records.
//!
//! At every record the reshaper resolves property names, fixes cardinality,
//! recurses into the corrected values and only then fills required defaults.
//! It builds a new tree and never looks at primitive values.

use strata_node::{Node, NodePath, Record, TYPE_KEY};
use tracing::{debug, trace};

use crate::registry::{CompiledType, SchemaSet};
use crate::shape::{PropertySchema, Shape};

use super::record_target;
use super::warning::CoerceWarning;

/// How many values a shape holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
    /// Could be either, e.g. `any` or a union of arrays and scalars.
    Either,
}

pub struct Reshaper<'s> {
    schemas: &'s SchemaSet,
    warnings: Vec<CoerceWarning>,
    /// Types whose empty defaults are being built.
    defaulting: Vec<String>,
}

impl<'s> Reshaper<'s> {
    pub fn new(schemas: &'s SchemaSet) -> Self {
        Self {
            schemas,
            warnings: Vec::new(),
            defaulting: Vec::new(),
        }
    }

    pub fn into_warnings(self) -> Vec<CoerceWarning> {
        self.warnings
    }

    /// Reshape a value found at `path` where `shape` is expected.
    pub fn reshape(&mut self, node: Node, shape: &Shape, path: &mut NodePath) -> Node {
        let schemas = self.schemas;
        match (shape, node) {
            (Shape::Ref(name), Node::Record(record)) => {
                match record_target(schemas, &record, name) {
                    Some(compiled) => Node::Record(self.reshape_record(record, compiled, path)),
                    None => Node::Record(record),
                }
            }
            (Shape::OneOf(alternatives), Node::Record(record)) => {
                let selected = record
                    .type_name()
                    .and_then(|t| alternatives.iter().find(|a| a.names_type(t)));
                match selected {
                    Some(alternative) => self.reshape(Node::Record(record), alternative, path),
                    None => Node::Record(record),
                }
            }
            (Shape::Array(items), Node::Array(values)) => {
                Node::Array(self.reshape_items(values, items, path))
            }
            (Shape::Array(items), Node::Record(record)) => {
                Node::Array(self.reshape_items(vec![Node::Record(record)], items, path))
            }
            (Shape::Decode { inner, .. }, node) if !matches!(node, Node::String(_)) => {
                self.reshape(node, inner, path)
            }
            (_, node) => node,
        }
    }

    fn reshape_items(&mut self, values: Vec<Node>, items: &Shape, path: &mut NodePath) -> Vec<Node> {
        let mut reshaped = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            path.push_index(index);
            reshaped.push(self.reshape(value, items, path));
            path.pop();
        }
        reshaped
    }

    /// Reshape a record as an instance of `compiled`.
    pub fn reshape_record(
        &mut self,
        record: Record,
        compiled: &'s CompiledType,
        path: &mut NodePath,
    ) -> Record {
        let schema = &compiled.schema;

        let mut canonical = Record::new();
        for (key, value) in record {
            let Some(name) = compiled.names.resolve(&key) else {
                self.warnings.push(CoerceWarning::UnknownProperty {
                    property: key,
                    path: path.clone(),
                });
                continue;
            };
            if canonical.contains_key(name) {
                self.warnings.push(CoerceWarning::DuplicateProperty {
                    property: key,
                    canonical: name.to_string(),
                    path: path.clone(),
                });
                continue;
            }
            if name != key {
                trace!(%path, from = %key, to = name, "renamed property");
            }
            canonical.insert(name.to_string(), value);
        }

        let mut shaped = Record::new();
        for (name, value) in canonical {
            let Some(property) = schema.property(&name) else {
                continue;
            };
            let Some(value) = self.fix_cardinality(&name, value, &property.shape, path) else {
                continue;
            };
            path.push_property(name.clone());
            let value = self.reshape(value, &property.shape, path);
            path.pop();
            shaped.insert(name, value);
        }

        for name in &schema.required {
            if shaped.contains_key(name) {
                continue;
            }
            let Some(property) = schema.property(name) else {
                continue;
            };
            let value = self.default_value(name, property, path);
            if name == TYPE_KEY {
                shaped.insert_first(name.clone(), value);
            } else {
                shaped.insert(name.clone(), value);
            }
        }
        shaped
    }

    /// Returns `None` when the property should be removed.
    fn fix_cardinality(
        &mut self,
        name: &str,
        value: Node,
        shape: &Shape,
        path: &NodePath,
    ) -> Option<Node> {
        if matches!(shape, Shape::Decode { .. }) && matches!(value, Node::String(_)) {
            return Some(value);
        }
        match (cardinality(self.schemas, shape, 0), value) {
            (Cardinality::Many, Node::Record(record)) => Some(Node::Array(vec![Node::Record(record)])),
            (Cardinality::One, Node::Array(items)) => {
                let count = items.len();
                let Some(first) = items.into_iter().next() else {
                    debug!(%path, property = name, "removed empty array given for single-valued property");
                    return None;
                };
                if count > 1 {
                    self.warnings.push(CoerceWarning::CardinalityReduced {
                        property: name.to_string(),
                        discarded: count - 1,
                        path: path.child_property(name),
                    });
                }
                Some(first)
            }
            (_, value) => Some(value),
        }
    }

    fn default_value(&mut self, name: &str, property: &PropertySchema, path: &NodePath) -> Node {
        match &property.default {
            Some(default) => default.clone(),
            None => self.empty_value(&property.shape, &path.child_property(name)),
        }
    }

    fn empty_value(&mut self, shape: &Shape, path: &NodePath) -> Node {
        let schemas = self.schemas;
        match shape {
            Shape::Null => Node::Null,
            Shape::Boolean => Node::Boolean(false),
            Shape::Integer | Shape::Number => Node::Integer(0),
            Shape::String => Node::String(String::new()),
            Shape::Array(_) => Node::Array(Vec::new()),
            Shape::Object => Node::Record(Record::new()),
            Shape::Enum(values) => values
                .first()
                .cloned()
                .unwrap_or_else(|| Node::String(String::new())),
            Shape::Ref(name) => match schemas.record_type(name) {
                Some(compiled) if !self.defaulting.contains(name) => {
                    self.defaulting.push(name.clone());
                    let record = self.reshape_record(Record::new(), compiled, &mut path.clone());
                    self.defaulting.pop();
                    Node::Record(record)
                }
                _ => Node::String(String::new()),
            },
            // Strings are the most amenable to later coercion.
            Shape::Any | Shape::OneOf(_) | Shape::Decode { .. } => Node::String(String::new()),
        }
    }
}

/// Classifies `shape`, looking through references and unions.
pub fn cardinality(schemas: &SchemaSet, shape: &Shape, hops: usize) -> Cardinality {
    match shape {
        Shape::Array(_) => Cardinality::Many,
        Shape::Boolean
        | Shape::Integer
        | Shape::Number
        | Shape::String
        | Shape::Object
        | Shape::Enum(_) => Cardinality::One,
        Shape::Any | Shape::Null => Cardinality::Either,
        Shape::Decode { inner, .. } => cardinality(schemas, inner, hops),
        Shape::OneOf(alternatives) => combined(schemas, alternatives, hops),
        Shape::Ref(name) => match schemas.get(name) {
            Some(compiled) => match &compiled.schema.alternatives {
                None => Cardinality::One,
                Some(alternatives) if hops < schemas.reference_limit() => {
                    combined(schemas, alternatives, hops + 1)
                }
                Some(_) => Cardinality::Either,
            },
            None => Cardinality::Either,
        },
    }
}

fn combined(schemas: &SchemaSet, alternatives: &[Shape], hops: usize) -> Cardinality {
    let mut kinds = alternatives
        .iter()
        .map(|alternative| cardinality(schemas, alternative, hops));
    let Some(first) = kinds.next() else {
        return Cardinality::Either;
    };
    if kinds.all(|kind| kind == first) {
        first
    } else {
        Cardinality::Either
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::coerce::tests::schemas;

    fn reshape(value: serde_json::Value, type_name: &str) -> (Node, Vec<CoerceWarning>) {
        let schemas = schemas();
        let mut reshaper = Reshaper::new(&schemas);
        let node = reshaper.reshape(
            Node::from(value),
            &Shape::reference(type_name),
            &mut NodePath::root(),
        );
        (node, reshaper.into_warnings())
    }

    #[test]
    fn test_alias_and_normalized_names() {
        let (node, warnings) = reshape(
            json!({"type": "Person", "firstName": "Jo", "family_names": ["Doe"]}),
            "Person",
        );
        assert_eq!(
            node,
            Node::from(json!({"type": "Person", "givenNames": "Jo", "familyNames": ["Doe"]}))
        );
        assert_eq!(warnings, vec![]);
    }

    #[test]
    fn test_unknown_and_duplicate_properties() {
        let (node, warnings) = reshape(
            json!({"givenName": "A", "givenNames": ["B"], "favoriteColor": "red"}),
            "Person",
        );
        assert_eq!(node, Node::from(json!({"type": "Person", "givenNames": "A"})));
        assert_eq!(
            warnings,
            vec![
                CoerceWarning::DuplicateProperty {
                    property: "givenNames".to_string(),
                    canonical: "givenNames".to_string(),
                    path: NodePath::root(),
                },
                CoerceWarning::UnknownProperty {
                    property: "favoriteColor".to_string(),
                    path: NodePath::root(),
                },
            ]
        );
    }

    #[test]
    fn test_cardinality() {
        let (node, warnings) = reshape(
            json!({"type": "Person", "name": ["Ada", "Lovelace"], "affiliations": {"name": "Analytical"}}),
            "Person",
        );
        assert_eq!(
            node,
            Node::from(json!({
                "type": "Person",
                "name": "Ada",
                "affiliations": [{"type": "Organization", "name": "Analytical"}]
            }))
        );
        assert_eq!(
            warnings,
            vec![CoerceWarning::CardinalityReduced {
                property: "name".to_string(),
                discarded: 1,
                path: NodePath::root().child_property("name"),
            }]
        );
    }

    #[test]
    fn test_empty_array_for_scalar_is_removed() {
        let (node, warnings) = reshape(json!({"type": "Person", "name": []}), "Person");
        assert_eq!(node, Node::from(json!({"type": "Person"})));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_defaults_after_recursion() {
        let (node, _) = reshape(json!({"title": "Notes"}), "Note");
        let record = node.as_record().unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["type", "title", "status", "draft", "count", "tags", "meta", "owner"]);
        assert_eq!(
            node,
            Node::from(json!({
                "type": "Note",
                "title": "Notes",
                "status": "open",
                "draft": false,
                "count": 0,
                "tags": [],
                "meta": {},
                "owner": {"type": "Organization"}
            }))
        );
    }

    #[test]
    fn test_discriminator_picks_child_type() {
        let (node, warnings) = reshape(
            json!({"type": "Article", "authors": [{"type": "Organization", "legal_name": "ACME"}, {"firstName": "Jo"}]}),
            "Article",
        );
        assert_eq!(
            node,
            Node::from(json!({
                "type": "Article",
                "authors": [{"type": "Organization", "legalName": "ACME"}, {"firstName": "Jo"}]
            }))
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cardinality_through_unions() {
        let schemas = schemas();
        assert_eq!(
            cardinality(&schemas, &Shape::reference("Block"), 0),
            Cardinality::One
        );
        assert_eq!(
            cardinality(
                &schemas,
                &Shape::OneOf(vec![Shape::String, Shape::array(Shape::String)]),
                0
            ),
            Cardinality::Either
        );
        assert_eq!(
            cardinality(&schemas, &Shape::reference("Loop"), 0),
            Cardinality::Either
        );
    }
}
