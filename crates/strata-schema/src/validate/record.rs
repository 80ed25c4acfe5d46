//! Record type validator

use strata_node::Node;

use crate::registry::CompiledType;

use super::SchemaValidator;
use super::context::ValidationContext;
use super::error::ValidationError;
use super::primitive::actual_type;

/// Validates a record against a record type. Properties the type does not
/// declare are errors.
pub struct RecordValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub compiled: &'a CompiledType,
}

impl RecordValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        let schema = &self.compiled.schema;
        let Node::Record(record) = node else {
            self.ctx.record_error(ValidationError::TypeMismatch {
                expected: schema.name.clone(),
                actual: actual_type(node),
                path: self.ctx.path(),
            });
            return;
        };

        for (name, property) in &schema.properties {
            match record.get(name) {
                Some(value) => {
                    let hops = self.ctx.push_property(name);
                    SchemaValidator {
                        ctx: self.ctx,
                        shape: &property.shape,
                    }
                    .validate(value);
                    self.ctx.pop_path(hops);
                }
                None if schema.is_required(name) => {
                    self.ctx
                        .record_error(ValidationError::MissingRequiredProperty {
                            property: name.clone(),
                            path: self.ctx.path(),
                        });
                }
                None => {}
            }
        }

        for key in record.keys() {
            if !schema.properties.contains_key(key) {
                self.ctx.record_error(ValidationError::UnknownProperty {
                    property: key.clone(),
                    path: self.ctx.path(),
                });
            }
        }
    }
}
