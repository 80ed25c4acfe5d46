//! Array validator

use strata_node::Node;

use crate::shape::Shape;

use super::SchemaValidator;
use super::context::ValidationContext;
use super::error::ValidationError;
use super::primitive::actual_type;

pub struct ArrayValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub items: &'a Shape,
}

impl ArrayValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        let Node::Array(items) = node else {
            self.ctx.record_error(ValidationError::TypeMismatch {
                expected: format!("array of {}", self.items),
                actual: actual_type(node),
                path: self.ctx.path(),
            });
            return;
        };
        for (index, item) in items.iter().enumerate() {
            let hops = self.ctx.push_index(index);
            SchemaValidator {
                ctx: self.ctx,
                shape: self.items,
            }
            .validate(item);
            self.ctx.pop_path(hops);
        }
    }
}
