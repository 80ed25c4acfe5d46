//! Structural validation of node trees
//!
//! # Architecture
//!
//! - `SchemaValidator`: dispatches to a kind-specific validator per [`Shape`]
//! - Kind validators: record, union, reference, array and primitive checks
//! - `ValidationContext`: shared state (errors, path, reference hops)
//!
//! Validation never modifies the node. Errors are accumulated over the whole
//! tree rather than stopping at the first one.

mod compound;
mod context;
mod error;
mod primitive;
mod record;
mod reference;
mod union;

pub use context::{ValidationContext, ValidationOutput, ValidationState};
pub use error::{BestVariantMatch, ValidationError, select_best_variant_match};

pub(crate) use primitive::{is_integral, literal_matches};

use strata_node::{Node, NodePath};

use crate::registry::SchemaSet;
use crate::shape::Shape;

use compound::ArrayValidator;
use primitive::{LiteralValidator, PrimitiveValidator};
use reference::ReferenceValidator;
use union::UnionValidator;

// =============================================================================
// Public API
// =============================================================================

/// Validate a node against the root type of `schemas`.
///
/// ```ignore
/// let output = validate(&schemas, &node);
/// if !output.is_valid {
///     for error in &output.errors {
///         println!("Error: {error}");
///     }
/// }
/// ```
pub fn validate(schemas: &SchemaSet, node: &Node) -> ValidationOutput {
    validate_type(schemas, node, schemas.root())
}

/// Validate a node against a named type.
pub fn validate_type(schemas: &SchemaSet, node: &Node, type_name: &str) -> ValidationOutput {
    validate_shape(schemas, node, &Shape::reference(type_name), NodePath::root())
}

/// Validate a node found at `path` against a shape.
///
/// `path` only prefixes the paths of reported errors.
pub fn validate_shape(
    schemas: &SchemaSet,
    node: &Node,
    shape: &Shape,
    path: NodePath,
) -> ValidationOutput {
    let ctx = ValidationContext::new(schemas, path);
    SchemaValidator { ctx: &ctx, shape }.validate(node);
    ctx.finish()
}

/// Whether a node matches a shape. Runs a full validation and discards the
/// errors.
pub fn is_valid(schemas: &SchemaSet, node: &Node, shape: &Shape) -> bool {
    validate_shape(schemas, node, shape, NodePath::root()).is_valid
}

// =============================================================================
// SchemaValidator (main dispatcher)
// =============================================================================

pub struct SchemaValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub shape: &'a Shape,
}

impl SchemaValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        let ctx = self.ctx;
        match self.shape {
            Shape::Any => {}
            Shape::Null
            | Shape::Boolean
            | Shape::Integer
            | Shape::Number
            | Shape::String
            | Shape::Object => PrimitiveValidator {
                ctx,
                shape: self.shape,
            }
            .validate(node),
            Shape::Enum(values) => LiteralValidator { ctx, values }.validate(node),
            Shape::Array(items) => ArrayValidator { ctx, items }.validate(node),
            Shape::Ref(name) => ReferenceValidator { ctx, name }.validate(node),
            Shape::OneOf(alternatives) => UnionValidator { ctx, alternatives }.validate(node),
            // Undecoded content is acceptable as is.
            Shape::Decode { inner, .. } => {
                if !matches!(node, Node::String(_)) {
                    SchemaValidator { ctx, shape: inner }.validate(node);
                }
            }
        }
    }
}
