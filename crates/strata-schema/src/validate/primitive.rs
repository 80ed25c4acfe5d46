//! Primitive and literal validators

use strata_node::Node;

use crate::shape::{Shape, literal, literals};

use super::context::ValidationContext;
use super::error::ValidationError;

/// Checks `null`, `boolean`, `integer`, `number`, `string` and `object`.
pub struct PrimitiveValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub shape: &'a Shape,
}

impl PrimitiveValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        let matches = match (self.shape, node) {
            (Shape::Null, Node::Null)
            | (Shape::Boolean, Node::Boolean(_))
            | (Shape::Integer, Node::Integer(_))
            | (Shape::Number, Node::Integer(_))
            | (Shape::String, Node::String(_))
            | (Shape::Object, Node::Record(_)) => true,
            (Shape::Integer, Node::Number(f)) => is_integral(*f),
            (Shape::Number, Node::Number(f)) => f.is_finite(),
            _ => false,
        };
        if !matches {
            self.ctx.record_error(ValidationError::TypeMismatch {
                expected: self.shape.to_string(),
                actual: actual_type(node),
                path: self.ctx.path(),
            });
        }
    }
}

/// Checks membership in an enum.
pub struct LiteralValidator<'a, 's> {
    pub ctx: &'a ValidationContext<'s>,
    pub values: &'a [Node],
}

impl LiteralValidator<'_, '_> {
    pub fn validate(&self, node: &Node) {
        if self.values.iter().any(|value| literal_matches(value, node)) {
            return;
        }
        let expected = match self.values {
            [single] => literal(single),
            values => format!("one of {}", literals(values)),
        };
        self.ctx.record_error(ValidationError::LiteralMismatch {
            expected,
            actual: literal(node),
            path: self.ctx.path(),
        });
    }
}

pub(crate) fn actual_type(node: &Node) -> String {
    match node {
        Node::Number(f) if !f.is_finite() => format!("non-finite number ({f})"),
        other => other.kind().to_string(),
    }
}

/// Whether `f` is a whole number representable as `i64`.
pub(crate) fn is_integral(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// Literal equality, treating `1` and `1.0` as the same value.
pub(crate) fn literal_matches(expected: &Node, actual: &Node) -> bool {
    match (expected, actual) {
        (Node::Integer(i), Node::Number(f)) | (Node::Number(f), Node::Integer(i)) => {
            *i as f64 == *f
        }
        _ => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_integral() {
        assert!(is_integral(2.0));
        assert!(is_integral(-0.0));
        assert!(!is_integral(2.5));
        assert!(!is_integral(f64::NAN));
        assert!(!is_integral(1e19));
    }

    #[test]
    fn test_literal_matches() {
        assert!(literal_matches(&Node::Integer(1), &Node::Number(1.0)));
        assert!(literal_matches(&Node::from("a"), &Node::from("a")));
        assert!(!literal_matches(&Node::from("1"), &Node::Integer(1)));
    }
}
