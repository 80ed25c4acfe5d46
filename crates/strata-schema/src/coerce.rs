//! Coercion of loosely shaped trees.
//!
//! Coercion runs in two synchronous passes over a new tree:
//! 1. the [`Reshaper`] canonicalizes property names, fixes cardinality and
//!    fills required defaults, record by record;
//! 2. the [`Coercer`] converts primitive values, settles unions and records
//!    every string that carries a decode directive.
//!
//! Neither pass decides validity; the result is checked afterwards with the
//! pure validator.

mod coercer;
mod primitive;
mod reshape;
mod warning;

pub use coercer::{Coercer, DecodeSite};
pub use reshape::{Cardinality, Reshaper, cardinality};
pub use warning::CoerceWarning;

use strata_node::{Node, NodePath, Record};

use crate::registry::{CompiledType, SchemaSet};
use crate::shape::Shape;

/// Output of the structural passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub node: Node,
    pub warnings: Vec<CoerceWarning>,
    /// Strings left for the expander, in tree order.
    pub decode_sites: Vec<DecodeSite>,
}

/// Reshape then coerce `node`, found at `path`, towards `shape`.
pub fn coerce_tree(schemas: &SchemaSet, node: Node, shape: &Shape, path: &NodePath) -> Coerced {
    let mut path = path.clone();
    let mut reshaper = Reshaper::new(schemas);
    let node = reshaper.reshape(node, shape, &mut path);
    let mut warnings = reshaper.into_warnings();

    let mut coercer = Coercer::new(schemas);
    let node = coercer.coerce(node, shape, &mut path);
    let (coercer_warnings, decode_sites) = coercer.finish();
    warnings.extend(coercer_warnings);

    Coerced {
        node,
        warnings,
        decode_sites,
    }
}

/// Reshape then coerce `node` as an instance of `type_name`.
pub fn coerce_type(schemas: &SchemaSet, node: Node, type_name: &str) -> Coerced {
    coerce_tree(schemas, node, &Shape::reference(type_name), &NodePath::root())
}

/// The record type a record should be shaped as where a `name` is expected:
/// the type its discriminator names if that is a known record type, else
/// `name` itself if that is a record type.
pub(crate) fn record_target<'s>(
    schemas: &'s SchemaSet,
    record: &Record,
    name: &str,
) -> Option<&'s CompiledType> {
    if let Some(type_name) = record.type_name()
        && let Some(compiled) = schemas.record_type(type_name)
    {
        return Some(compiled);
    }
    schemas.record_type(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::parse::{build_type, parse_definition};
    use crate::validate::validate_type;

    pub(crate) fn schemas() -> SchemaSet {
        let definitions = [
            json!({
                "title": "Person",
                "properties": {
                    "name": {"type": "string"},
                    "givenNames": {"type": "array", "items": {"type": "string"}, "aliases": ["firstName", "givenName"]},
                    "familyNames": {"type": "array", "items": {"type": "string"}, "aliases": ["familyName", "lastName"]},
                    "affiliations": {"type": "array", "items": {"$ref": "Organization"}}
                }
            }),
            json!({
                "title": "Organization",
                "properties": {
                    "name": {"type": "string"},
                    "legalName": {"type": "string"}
                }
            }),
            json!({
                "title": "Article",
                "properties": {
                    "authors": {"type": "array", "items": {"oneOf": [{"$ref": "Person"}, {"$ref": "Organization"}]}},
                    "content": {"type": "array", "items": {"$ref": "Block"}, "decode": "md"}
                }
            }),
            json!({
                "title": "Note",
                "properties": {
                    "title": {"type": "string"},
                    "status": {"enum": ["closed", "open"], "default": "open"},
                    "draft": {"type": "boolean"},
                    "count": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "meta": {"type": "object"},
                    "owner": {"$ref": "Organization"}
                },
                "required": ["status", "draft", "count", "tags", "meta", "owner"]
            }),
            json!({"title": "Block", "oneOf": [{"type": "string"}, {"type": "number"}]}),
            json!({"title": "Loop", "oneOf": [{"$ref": "Loop"}, {"type": "boolean"}]}),
        ];
        SchemaSet::from_types(definitions.into_iter().map(|value| {
            let raw = parse_definition(value).unwrap();
            build_type(&raw.title.clone(), &[raw]).unwrap()
        }))
    }

    #[test]
    fn test_coerce_tree_result_validates() {
        let schemas = schemas();
        let input = Node::from(json!({
            "type": "Article",
            "authors": [{"givenName": "Joe"}, {"type": "Organization", "name": 7}],
            "content": ["intro", "2.5"]
        }));
        let coerced = coerce_type(&schemas, input, "Article");
        assert_eq!(
            coerced.node,
            Node::from(json!({
                "type": "Article",
                "authors": [
                    {"type": "Person", "givenNames": ["Joe"]},
                    {"type": "Organization", "name": "7"}
                ],
                "content": ["intro", "2.5"]
            }))
        );
        assert!(validate_type(&schemas, &coerced.node, "Article").is_valid);
        assert!(coerced.decode_sites.is_empty());
    }

    #[test]
    fn test_coerce_tree_is_idempotent() {
        let schemas = schemas();
        let input = Node::from(json!({"name": [42], "first_name": "Ada", "affiliations": {"name": "X"}}));
        let once = coerce_type(&schemas, input, "Person").node;
        let twice = coerce_type(&schemas, once.clone(), "Person");
        assert_eq!(once, twice.node);
        assert!(twice.warnings.is_empty());
    }
}
