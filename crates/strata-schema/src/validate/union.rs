//! Union validator
//!
//! A record whose discriminator names one of the alternatives is validated
//! against that alternative alone, and its errors are reported directly.
//! Anything else must match exactly one alternative.

use strata_node::Node;

use crate::shape::Shape;

use super::SchemaValidator;
use super::context::ValidationContext;
use super::error::{ValidationError, select_best_variant_match};

pub struct UnionValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub alternatives: &'a [Shape],
}

impl UnionValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        if let Some(type_name) = node.type_name()
            && let Some(alternative) = self
                .alternatives
                .iter()
                .find(|alternative| alternative.names_type(type_name))
        {
            SchemaValidator {
                ctx: self.ctx,
                shape: alternative,
            }
            .validate(node);
            return;
        }

        let mut matched = Vec::new();
        let mut variant_errors = Vec::new();
        for alternative in self.alternatives {
            let errors = self.ctx.trial(alternative, |trial_ctx| {
                SchemaValidator {
                    ctx: trial_ctx,
                    shape: alternative,
                }
                .validate(node);
            });
            if errors.is_empty() {
                matched.push(alternative.to_string());
            } else {
                variant_errors.push((alternative.to_string(), errors));
            }
        }

        match matched.len() {
            1 => {}
            0 => {
                let best_match =
                    select_best_variant_match(variant_errors, self.ctx.depth()).map(Box::new);
                self.ctx.record_error(ValidationError::NoVariantMatched {
                    path: self.ctx.path(),
                    best_match,
                });
            }
            _ => {
                self.ctx.record_error(ValidationError::AmbiguousUnion {
                    path: self.ctx.path(),
                    variants: matched,
                });
            }
        }
    }
}
