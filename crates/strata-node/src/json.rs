use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

use crate::prelude_internal::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsonError {
    #[error("Invalid number: cannot represent {value} as a JSON number at path {path}")]
    NonFiniteNumber { value: f64, path: NodePath },
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Integer(i),
                // u64 beyond i64::MAX and floats
                None => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Node::String(s),
            serde_json::Value::Array(items) => {
                Node::Array(items.into_iter().map(Node::from).collect())
            }
            serde_json::Value::Object(map) => Node::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Node {
    /// Convert the tree to a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, JsonError> {
        to_json_at(self, &mut NodePath::root())
    }
}

fn to_json_at(node: &Node, path: &mut NodePath) -> Result<serde_json::Value, JsonError> {
    match node {
        Node::Null => Ok(serde_json::Value::Null),
        Node::Boolean(b) => Ok(json!(*b)),
        Node::Integer(i) => Ok(json!(*i)),
        Node::Number(f) => {
            if f.is_finite() {
                Ok(json!(*f))
            } else {
                Err(JsonError::NonFiniteNumber {
                    value: *f,
                    path: path.clone(),
                })
            }
        }
        Node::String(s) => Ok(json!(s)),
        Node::Array(items) => {
            let mut json_items = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push_index(index);
                let item = to_json_at(item, path);
                path.pop();
                json_items.push(item?);
            }
            Ok(serde_json::Value::Array(json_items))
        }
        Node::Record(record) => {
            let mut json_map = serde_json::Map::new();
            for (key, value) in record.iter() {
                path.push_property(key.clone());
                let value = to_json_at(value, path);
                path.pop();
                json_map.insert(key.clone(), value?);
            }
            Ok(serde_json::Value::Object(json_map))
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Node::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Node::from(json!(42)), Node::Integer(42));
        assert_eq!(Node::from(json!(1.5)), Node::Number(1.5));
        assert_eq!(Node::from(json!(-7)), Node::Integer(-7));
    }

    #[test]
    fn test_from_json_record_keeps_order() {
        let node = Node::from(json!({"type": "Person", "name": "Ada", "age": 36}));
        let keys: Vec<_> = node.as_record().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["type", "name", "age"]);
        assert_eq!(node.type_name(), Some("Person"));
    }

    #[test]
    fn test_to_json() {
        let value = json!({"type": "Article", "authors": [{"type": "Person"}], "n": 1.5});
        assert_eq!(Node::from(value.clone()).to_json().unwrap(), value);
    }

    #[test]
    fn test_to_json_rejects_non_finite() {
        let mut record = Record::new();
        record.insert("x".to_string(), Node::Array(vec![Node::Number(f64::INFINITY)]));
        let err = Node::Record(record).to_json().unwrap_err();
        assert_eq!(
            err,
            JsonError::NonFiniteNumber {
                value: f64::INFINITY,
                path: NodePath::root().child_property("x").child_index(0),
            }
        );
    }

    #[test]
    fn test_serde_through_string() {
        let node: Node = serde_json::from_str(r#"{"type":"Thing","name":"x"}"#).unwrap();
        assert_eq!(node.type_name(), Some("Thing"));
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"type":"Thing","name":"x"}"#);
    }
}
