//! Reference validator
//!
//! Resolves a type name in the schema set and delegates to the record or
//! union validator.

use strata_node::Node;

use super::context::ValidationContext;
use super::error::ValidationError;
use super::record::RecordValidator;
use super::union::UnionValidator;

pub struct ReferenceValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub name: &'a str,
}

impl ReferenceValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        let Some(compiled) = self.ctx.schemas.get(self.name) else {
            self.ctx
                .record_error(ValidationError::UndefinedTypeReference {
                    name: self.name.to_string(),
                    path: self.ctx.path(),
                });
            return;
        };
        let Some(alternatives) = &compiled.schema.alternatives else {
            RecordValidator {
                ctx: self.ctx,
                compiled,
            }
            .validate(node);
            return;
        };

        // A union type does not consume a level of the tree, so a union that
        // reaches itself would recurse forever.
        if self.ctx.enter_hop() {
            UnionValidator {
                ctx: self.ctx,
                alternatives,
            }
            .validate(node);
        } else {
            self.ctx.record_error(ValidationError::ReferenceCycle {
                name: self.name.to_string(),
                path: self.ctx.path(),
            });
        }
        self.ctx.leave_hop();
    }
}
