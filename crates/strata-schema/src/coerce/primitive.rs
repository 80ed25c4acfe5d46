//! Conversions between primitive values.

use strata_node::Node;

use crate::shape::Shape;
use crate::validate::{is_integral, literal_matches};

/// `[x]` becomes `x`; anything else is returned unchanged.
pub(crate) fn unwrap_singleton(node: Node) -> Node {
    match node {
        Node::Array(items) if items.len() == 1 => items.into_iter().next().unwrap_or_default(),
        other => other,
    }
}

/// Converts `node` towards a primitive shape. Values that cannot be converted
/// are returned unchanged for the validator to report.
pub(crate) fn coerce_scalar(node: Node, shape: &Shape) -> Node {
    match (shape, unwrap_singleton(node)) {
        (Shape::String, Node::Integer(i)) => Node::String(i.to_string()),
        (Shape::String, Node::Number(f)) if f.is_finite() => Node::String(f.to_string()),
        (Shape::String, Node::Boolean(b)) => Node::String(b.to_string()),
        (Shape::String, Node::Null) => Node::String(String::new()),

        (Shape::Number, Node::String(s)) => parse_number(&s).unwrap_or(Node::String(s)),
        (Shape::Integer, Node::String(s)) => match parse_number(&s) {
            Some(Node::Integer(i)) => Node::Integer(i),
            Some(Node::Number(f)) if is_integral(f) => Node::Integer(f as i64),
            _ => Node::String(s),
        },
        (Shape::Integer, Node::Number(f)) if is_integral(f) => Node::Integer(f as i64),
        (Shape::Number | Shape::Integer, Node::Boolean(b)) => Node::Integer(i64::from(b)),
        (Shape::Number | Shape::Integer, Node::Null) => Node::Integer(0),

        (Shape::Boolean, Node::String(s)) => match s.as_str() {
            "true" => Node::Boolean(true),
            "false" => Node::Boolean(false),
            _ => Node::String(s),
        },
        (Shape::Boolean, Node::Integer(0)) | (Shape::Boolean, Node::Null) => Node::Boolean(false),
        (Shape::Boolean, Node::Integer(1)) => Node::Boolean(true),

        (Shape::Null, Node::String(s)) if s.is_empty() => Node::Null,
        (Shape::Null, Node::Integer(0) | Node::Boolean(false)) => Node::Null,

        (_, node) => node,
    }
}

/// Replaces `node` by the enum member it spells, if any.
pub(crate) fn coerce_enum(node: Node, values: &[Node]) -> Node {
    let node = unwrap_singleton(node);
    if values.iter().any(|value| literal_matches(value, &node)) {
        return node;
    }
    let Some(rendered) = render(&node) else {
        return node;
    };
    values
        .iter()
        .find(|value| render(value).as_deref() == Some(rendered.as_str()))
        .cloned()
        .unwrap_or(node)
}

fn render(node: &Node) -> Option<String> {
    match node {
        Node::Null => Some("null".to_string()),
        Node::Boolean(b) => Some(b.to_string()),
        Node::Integer(i) => Some(i.to_string()),
        Node::Number(f) => Some(f.to_string()),
        Node::String(s) => Some(s.clone()),
        Node::Array(_) | Node::Record(_) => None,
    }
}

/// Parses a finite number, preferring an integer.
fn parse_number(text: &str) -> Option<Node> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Node::Integer(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Node::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string() {
        assert_eq!(coerce_scalar(Node::Integer(42), &Shape::String), Node::from("42"));
        assert_eq!(coerce_scalar(Node::Number(1.5), &Shape::String), Node::from("1.5"));
        assert_eq!(coerce_scalar(Node::Boolean(true), &Shape::String), Node::from("true"));
        assert_eq!(coerce_scalar(Node::Null, &Shape::String), Node::from(""));
        assert_eq!(
            coerce_scalar(Node::Array(vec![Node::Integer(42)]), &Shape::String),
            Node::from("42")
        );
    }

    #[test]
    fn test_to_number() {
        assert_eq!(coerce_scalar(Node::from(" 7 "), &Shape::Number), Node::Integer(7));
        assert_eq!(coerce_scalar(Node::from("2.5"), &Shape::Number), Node::Number(2.5));
        assert_eq!(coerce_scalar(Node::from("NaN"), &Shape::Number), Node::from("NaN"));
        assert_eq!(coerce_scalar(Node::from("abc"), &Shape::Number), Node::from("abc"));
        assert_eq!(coerce_scalar(Node::Boolean(true), &Shape::Number), Node::Integer(1));
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(coerce_scalar(Node::from("3.0"), &Shape::Integer), Node::Integer(3));
        assert_eq!(coerce_scalar(Node::from("3.5"), &Shape::Integer), Node::from("3.5"));
        assert_eq!(coerce_scalar(Node::Number(4.0), &Shape::Integer), Node::Integer(4));
        assert_eq!(coerce_scalar(Node::Null, &Shape::Integer), Node::Integer(0));
    }

    #[test]
    fn test_to_boolean_and_null() {
        assert_eq!(coerce_scalar(Node::from("false"), &Shape::Boolean), Node::Boolean(false));
        assert_eq!(coerce_scalar(Node::Integer(1), &Shape::Boolean), Node::Boolean(true));
        assert_eq!(coerce_scalar(Node::Integer(2), &Shape::Boolean), Node::Integer(2));
        assert_eq!(coerce_scalar(Node::from(""), &Shape::Null), Node::Null);
        assert_eq!(coerce_scalar(Node::Boolean(false), &Shape::Null), Node::Null);
    }

    #[test]
    fn test_enum() {
        let values = [Node::Integer(1), Node::Integer(2), Node::from("three")];
        assert_eq!(coerce_enum(Node::from("2"), &values), Node::Integer(2));
        assert_eq!(coerce_enum(Node::Number(1.0), &values), Node::Number(1.0));
        assert_eq!(
            coerce_enum(Node::Array(vec![Node::from("three")]), &values),
            Node::from("three")
        );
        assert_eq!(coerce_enum(Node::from("four"), &values), Node::from("four"));
    }
}
