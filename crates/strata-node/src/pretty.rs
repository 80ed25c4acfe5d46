use std::ops::Range;

use indexmap::IndexMap;

use crate::prelude_internal::*;

/// Byte range of every value written by [`to_pretty_json_with_spans`], by path.
pub type SpanMap = IndexMap<NodePath, Range<usize>>;

const INDENT: &str = "  ";

/// Render `node` as indented JSON, recording where each value was written.
///
/// Non-finite numbers are written as bare `NaN` / `inf` so that a tree which
/// cannot be serialized can still be shown in diagnostics.
pub fn to_pretty_json_with_spans(node: &Node) -> (String, SpanMap) {
    let mut writer = SpanWriter {
        out: String::new(),
        spans: SpanMap::new(),
        path: NodePath::root(),
    };
    writer.write(node, 0);
    (writer.out, writer.spans)
}

struct SpanWriter {
    out: String,
    spans: SpanMap,
    path: NodePath,
}

impl SpanWriter {
    fn write(&mut self, node: &Node, level: usize) {
        let start = self.out.len();
        match node {
            Node::Null => self.out.push_str("null"),
            Node::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Node::Integer(i) => self.out.push_str(&i.to_string()),
            Node::Number(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => self.out.push_str(&n.to_string()),
                None => self.out.push_str(&f.to_string()),
            },
            Node::String(s) => self.write_string(s),
            Node::Array(items) if items.is_empty() => self.out.push_str("[]"),
            Node::Array(items) => {
                self.out.push_str("[\n");
                for (index, item) in items.iter().enumerate() {
                    self.indent(level + 1);
                    self.path.push_index(index);
                    self.write(item, level + 1);
                    self.path.pop();
                    if index + 1 < items.len() {
                        self.out.push(',');
                    }
                    self.out.push('\n');
                }
                self.indent(level);
                self.out.push(']');
            }
            Node::Record(record) if record.is_empty() => self.out.push_str("{}"),
            Node::Record(record) => {
                self.out.push_str("{\n");
                let len = record.len();
                for (index, (key, value)) in record.iter().enumerate() {
                    self.indent(level + 1);
                    self.write_string(key);
                    self.out.push_str(": ");
                    self.path.push_property(key.clone());
                    self.write(value, level + 1);
                    self.path.pop();
                    if index + 1 < len {
                        self.out.push(',');
                    }
                    self.out.push('\n');
                }
                self.indent(level);
                self.out.push('}');
            }
        }
        self.spans.insert(self.path.clone(), start..self.out.len());
    }

    fn write_string(&mut self, s: &str) {
        let quoted = serde_json::Value::String(s.to_string()).to_string();
        self.out.push_str(&quoted);
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_pretty_output() {
        let node = Node::from(json!({"type": "Person", "givenNames": ["Jo"], "meta": {}}));
        let (text, _) = to_pretty_json_with_spans(&node);
        assert_eq!(
            text,
            "{\n  \"type\": \"Person\",\n  \"givenNames\": [\n    \"Jo\"\n  ],\n  \"meta\": {}\n}"
        );
    }

    #[test]
    fn test_spans_point_at_values() {
        let node = Node::from(json!({"name": "Ada", "tags": [1, 2]}));
        let (text, spans) = to_pretty_json_with_spans(&node);
        let name = &spans[&NodePath::root().child_property("name")];
        assert_eq!(&text[name.clone()], "\"Ada\"");
        let second = &spans[&NodePath::root().child_property("tags").child_index(1)];
        assert_eq!(&text[second.clone()], "2");
        assert_eq!(spans[&NodePath::root()], 0..text.len());
    }
}
