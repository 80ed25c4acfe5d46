use core::fmt::Display;

use crate::prelude_internal::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Plural)]
pub struct NodePath(pub Vec<PathSegment>);

impl NodePath {
    /// Create an empty path representing the root node
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn push_property(&mut self, name: impl Into<String>) {
        self.0.push(PathSegment::Property(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    #[must_use]
    pub fn child_property(&self, name: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push_property(name);
        path
    }

    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push_index(index);
        path
    }

    /// The path of the enclosing value, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(NodePath(rest.to_vec()))
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Record property
    Property(String),
    /// Array element
    Index(usize),
}

impl Display for NodePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Property(name) => {
                    if i != 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("no value at path {path}")]
    NotFound { path: NodePath },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_empty_path() {
        assert_eq!(format!("{}", NodePath::root()), "(root)");
    }

    #[test]
    fn test_display_nested_properties() {
        let path = NodePath::root()
            .child_property("a")
            .child_property("b")
            .child_property("c");
        assert_eq!(format!("{}", path), "a.b.c");
    }

    #[test]
    fn test_display_array_index() {
        let path = NodePath::root()
            .child_property("authors")
            .child_index(0)
            .child_property("givenNames");
        assert_eq!(format!("{}", path), "authors[0].givenNames");
    }

    #[test]
    fn test_display_root_index() {
        let path = NodePath::root().child_index(2);
        assert_eq!(format!("{}", path), "[2]");
    }

    #[test]
    fn test_parent() {
        let path = NodePath::root().child_property("a").child_index(1);
        assert_eq!(path.parent(), Some(NodePath::root().child_property("a")));
        assert_eq!(NodePath::root().parent(), None);
    }
}
