//! Schema definition documents.
//!
//! Definitions are JSON objects using a small JSON-Schema-like vocabulary:
//! `title`, `extends`, `description`, `properties`, `required` and `oneOf` at
//! the top level; `type`, `items`, `$ref`, `oneOf`, `enum`, `default`,
//! `aliases`, `decode` and `description` for property shapes.

use indexmap::IndexMap;
use serde::Deserialize;
use strata_node::{Node, TYPE_KEY};
use thiserror::Error;

use crate::shape::{PropertySchema, Shape, TypeSchema};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaDefinitionError {
    #[error("Malformed schema definition: {message}")]
    Malformed { message: String },

    #[error("Definition is titled '{title}' but was loaded as '{name}'")]
    TitleMismatch { name: String, title: String },

    #[error("Unknown type '{kind}' for property '{property}'")]
    UnknownKind { property: String, kind: String },

    #[error("Parent type '{parent}' does not exist")]
    UnknownParent { parent: String },

    #[error("Cycle in extends: {}", chain.join(" -> "))]
    ExtendsCycle { chain: Vec<String> },

    #[error("Required property '{property}' is not declared")]
    UndeclaredRequired { property: String },

    #[error("Alias '{alias}' of '{property}' collides with '{other}'")]
    AliasCollision {
        alias: String,
        property: String,
        other: String,
    },

    #[error("Union type must not declare properties")]
    UnionWithProperties,
}

/// A definition document as written, before `extends` is flattened.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RawTypeSchema {
    pub title: String,
    #[serde(rename = "$schema", default)]
    pub schema_uri: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, RawShape>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub one_of: Option<Vec<RawShape>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RawShape {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Option<Box<RawShape>>,
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub one_of: Option<Vec<RawShape>>,
    #[serde(rename = "enum", default)]
    pub values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub decode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn parse_definition(value: serde_json::Value) -> Result<RawTypeSchema, SchemaDefinitionError> {
    serde_json::from_value(value).map_err(|e| SchemaDefinitionError::Malformed {
        message: e.to_string(),
    })
}

/// Flatten an `extends` chain into a single type.
///
/// `chain[0]` is the type itself, followed by its parent, grandparent and so
/// on. Ancestor properties come first in the result; a descendant redefining
/// a property replaces the shape in place.
pub fn build_type(
    name: &str,
    chain: &[RawTypeSchema],
) -> Result<TypeSchema, SchemaDefinitionError> {
    let Some(own) = chain.first() else {
        return Err(SchemaDefinitionError::Malformed {
            message: "empty definition chain".to_string(),
        });
    };
    if own.title != name {
        return Err(SchemaDefinitionError::TitleMismatch {
            name: name.to_string(),
            title: own.title.clone(),
        });
    }

    if let Some(alternatives) = &own.one_of {
        if !own.properties.is_empty() || own.extends.is_some() {
            return Err(SchemaDefinitionError::UnionWithProperties);
        }
        let alternatives = alternatives
            .iter()
            .map(|raw| lower(name, raw))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(TypeSchema {
            name: name.to_string(),
            description: own.description.clone(),
            properties: IndexMap::new(),
            required: Vec::new(),
            alternatives: Some(alternatives),
            aliases: IndexMap::new(),
        });
    }

    let mut properties: IndexMap<String, PropertySchema> = IndexMap::new();
    let mut required: Vec<String> = Vec::new();
    for raw in chain.iter().rev() {
        for (property, raw_shape) in &raw.properties {
            properties.insert(property.clone(), lower_property(property, raw_shape)?);
        }
        for property in &raw.required {
            if !required.contains(property) {
                required.push(property.clone());
            }
        }
    }

    // The discriminator always names this type, whatever the parents declared.
    let discriminator = PropertySchema::new(Shape::Enum(vec![Node::from(name)]));
    match properties.get_mut(TYPE_KEY) {
        Some(existing) => existing.shape = discriminator.shape,
        None => {
            properties.shift_insert(0, TYPE_KEY.to_string(), discriminator);
        }
    }
    if !required.iter().any(|r| r == TYPE_KEY) {
        required.insert(0, TYPE_KEY.to_string());
    }

    if let Some(undeclared) = required.iter().find(|r| !properties.contains_key(*r)) {
        return Err(SchemaDefinitionError::UndeclaredRequired {
            property: undeclared.clone(),
        });
    }

    let aliases = compile_aliases(&properties)?;
    Ok(TypeSchema {
        name: name.to_string(),
        description: own.description.clone(),
        properties,
        required,
        alternatives: None,
        aliases,
    })
}

fn compile_aliases(
    properties: &IndexMap<String, PropertySchema>,
) -> Result<IndexMap<String, String>, SchemaDefinitionError> {
    let mut aliases: IndexMap<String, String> = IndexMap::new();
    for (property, schema) in properties {
        for alias in &schema.aliases {
            let other = if properties.contains_key(alias) {
                Some(alias.clone())
            } else {
                aliases.get(alias).filter(|owner| *owner != property).cloned()
            };
            if let Some(other) = other {
                return Err(SchemaDefinitionError::AliasCollision {
                    alias: alias.clone(),
                    property: property.clone(),
                    other,
                });
            }
            aliases.insert(alias.clone(), property.clone());
        }
    }
    Ok(aliases)
}

fn lower_property(property: &str, raw: &RawShape) -> Result<PropertySchema, SchemaDefinitionError> {
    Ok(PropertySchema {
        shape: lower(property, raw)?,
        default: raw.default.clone().map(Node::from),
        aliases: raw.aliases.clone(),
        description: raw.description.clone(),
    })
}

fn lower(property: &str, raw: &RawShape) -> Result<Shape, SchemaDefinitionError> {
    let shape = if let Some(reference) = &raw.reference {
        Shape::Ref(reference_name(reference).to_string())
    } else if let Some(alternatives) = &raw.one_of {
        Shape::OneOf(
            alternatives
                .iter()
                .map(|alternative| lower(property, alternative))
                .collect::<Result<_, _>>()?,
        )
    } else if let Some(values) = &raw.values {
        Shape::Enum(values.iter().cloned().map(Node::from).collect())
    } else {
        match raw.kind.as_deref() {
            None | Some("any") => Shape::Any,
            Some("null") => Shape::Null,
            Some("boolean") => Shape::Boolean,
            Some("integer") => Shape::Integer,
            Some("number") => Shape::Number,
            Some("string") => Shape::String,
            Some("object") => Shape::Object,
            Some("array") => Shape::array(match &raw.items {
                Some(items) => lower(property, items)?,
                None => Shape::Any,
            }),
            Some(other) => {
                return Err(SchemaDefinitionError::UnknownKind {
                    property: property.to_string(),
                    kind: other.to_string(),
                });
            }
        }
    };
    Ok(match &raw.decode {
        Some(format) => Shape::Decode {
            format: format.clone(),
            inner: Box::new(shape),
        },
        None => shape,
    })
}

/// `Person`, `Person.schema.json` and `#/definitions/Person` all name `Person`.
fn reference_name(reference: &str) -> &str {
    let name = reference.rsplit('/').next().unwrap_or(reference);
    name.strip_suffix(".schema.json").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: serde_json::Value) -> RawTypeSchema {
        parse_definition(value).unwrap()
    }

    #[test]
    fn test_discriminator_is_added() {
        let schema = build_type(
            "Thing",
            &[raw(json!({"title": "Thing", "properties": {"name": {"type": "string"}}}))],
        )
        .unwrap();
        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["type", "name"]);
        assert_eq!(schema.required, vec!["type"]);
        assert_eq!(
            schema.properties["type"].shape,
            Shape::Enum(vec![Node::from("Thing")])
        );
    }

    #[test]
    fn test_extends_flattens_parent_first() {
        let chain = [
            raw(json!({
                "title": "Person",
                "extends": "Thing",
                "properties": {"givenNames": {"type": "array", "items": {"type": "string"}, "aliases": ["givenName"]}}
            })),
            raw(json!({
                "title": "Thing",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            })),
        ];
        let schema = build_type("Person", &chain).unwrap();
        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["type", "name", "givenNames"]);
        assert_eq!(schema.required, vec!["type", "name"]);
        assert_eq!(schema.aliases["givenName"], "givenNames");
        assert_eq!(
            schema.properties["type"].shape,
            Shape::Enum(vec![Node::from("Person")])
        );
    }

    #[test]
    fn test_decode_and_ref() {
        let schema = build_type(
            "Article",
            &[raw(json!({
                "title": "Article",
                "properties": {
                    "content": {"type": "array", "items": {"$ref": "BlockContent.schema.json"}, "decode": "md"}
                }
            }))],
        )
        .unwrap();
        assert_eq!(
            schema.properties["content"].shape,
            Shape::Decode {
                format: "md".to_string(),
                inner: Box::new(Shape::array(Shape::reference("BlockContent"))),
            }
        );
        assert_eq!(schema.references(), vec!["BlockContent"]);
    }

    #[test]
    fn test_union_type() {
        let schema = build_type(
            "InlineContent",
            &[raw(json!({
                "title": "InlineContent",
                "oneOf": [{"type": "string"}, {"$ref": "Emphasis"}]
            }))],
        )
        .unwrap();
        assert!(schema.is_union());
        assert!(schema.properties.is_empty());
    }

    #[test]
    fn test_unknown_keyword_is_rejected() {
        let err = parse_definition(json!({"title": "X", "propertees": {}})).unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::Malformed { .. }));
        let err = parse_definition(json!({
            "title": "X",
            "properties": {"a": {"type": "string", "minLength": 1}}
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::Malformed { .. }));
    }

    #[test]
    fn test_alias_collision() {
        let err = build_type(
            "X",
            &[raw(json!({
                "title": "X",
                "properties": {
                    "name": {"type": "string", "aliases": ["label"]},
                    "label": {"type": "string"}
                }
            }))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::AliasCollision {
                alias: "label".to_string(),
                property: "name".to_string(),
                other: "label".to_string(),
            }
        );
    }

    #[test]
    fn test_undeclared_required() {
        let err = build_type("X", &[raw(json!({"title": "X", "required": ["missing"]}))])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::UndeclaredRequired {
                property: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_title_mismatch() {
        let err = build_type("Y", &[raw(json!({"title": "X"}))]).unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::TitleMismatch { .. }));
    }
}
