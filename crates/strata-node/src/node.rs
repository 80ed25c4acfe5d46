use core::fmt::Display;

use crate::prelude_internal::*;

/// The kind of a [`Node`], used when describing values in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Record,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Record => write!(f, "record"),
        }
    }
}

/// A value in a strata document tree.
///
/// Numbers are split into `Integer` and `Number` so that integer-typed
/// properties can be checked; a `number` schema accepts both.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Node {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Node>),
    Record(Record),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Boolean(_) => NodeKind::Boolean,
            Node::Integer(_) => NodeKind::Integer,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Record(_) => NodeKind::Record,
        }
    }

    /// The discriminator of a record node, if it has a string one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Node::Record(record) => record.type_name(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the value at `path`, if every segment exists.
    pub fn get_path(&self, path: &NodePath) -> Option<&Node> {
        let mut current = self;
        for segment in &path.0 {
            current = match (segment, current) {
                (PathSegment::Property(key), Node::Record(record)) => record.get(key)?,
                (PathSegment::Index(index), Node::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Consumes the tree and returns a new one with the value at `path`
    /// replaced by `value`.
    ///
    /// Sibling order is preserved. Fails if any segment of `path` is absent.
    pub fn replace_at(self, path: &NodePath, value: Node) -> Result<Node, PathError> {
        replace_in(self, &path.0, value).map_err(|depth| PathError::NotFound {
            path: NodePath(path.0[..=depth].to_vec()),
        })
    }
}

/// Returns the index of the first segment that could not be followed.
fn replace_in(node: Node, segments: &[PathSegment], value: Node) -> Result<Node, usize> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(value);
    };
    let nested = |depth: usize| depth + 1;
    match (segment, node) {
        (PathSegment::Property(key), Node::Record(record)) => {
            let mut entries: Vec<(String, Node)> = record.into_iter().collect();
            let slot = entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .ok_or(0usize)?;
            let child = core::mem::take(&mut slot.1);
            slot.1 = replace_in(child, rest, value).map_err(nested)?;
            Ok(Node::Record(entries.into_iter().collect()))
        }
        (PathSegment::Index(index), Node::Array(mut items)) => {
            let slot = items.get_mut(*index).ok_or(0usize)?;
            let child = core::mem::take(slot);
            *slot = replace_in(child, rest, value).map_err(nested)?;
            Ok(Node::Array(items))
        }
        _ => Err(0),
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Boolean(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Integer(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Number(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Array(value)
    }
}

impl From<Record> for Node {
    fn from(value: Record) -> Self {
        Node::Record(value)
    }
}
