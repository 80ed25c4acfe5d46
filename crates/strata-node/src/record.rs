use indexmap::IndexMap;

use crate::prelude_internal::*;

/// Key of the discriminator property naming a record's type.
pub const TYPE_KEY: &str = "type";

/// Insertion-ordered properties of a record node.
///
/// Equality ignores property order.
#[derive(Debug, Clone, Plural)]
#[plural(len, is_empty, iter, into_iter, into_iter_ref, new)]
pub struct Record(IndexMap<String, Node>);

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl FromIterator<(String, Node)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

impl Default for Record {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl Record {
    /// A record holding only its discriminator.
    pub fn typed(type_name: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.insert(TYPE_KEY.to_string(), Node::String(type_name.into()));
        record
    }

    pub fn type_name(&self) -> Option<&str> {
        self.get(TYPE_KEY).and_then(Node::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: String, value: Node) -> Option<Node> {
        self.0.insert(key, value)
    }

    /// Inserts `key` as the first property, moving it there if present.
    pub fn insert_first(&mut self, key: String, value: Node) {
        self.0.shift_insert(0, key, value);
    }

    /// O(n) removal, preserves property order.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_order() {
        let a: Record = [
            ("type".to_string(), Node::from("Person")),
            ("name".to_string(), Node::from("Ada")),
        ]
        .into_iter()
        .collect();
        let b: Record = [
            ("name".to_string(), Node::from("Ada")),
            ("type".to_string(), Node::from("Person")),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_type_name_requires_string() {
        assert_eq!(Record::typed("Thing").type_name(), Some("Thing"));
        let mut record = Record::new();
        record.insert(TYPE_KEY.to_string(), Node::Integer(1));
        assert_eq!(record.type_name(), None);
    }

    #[test]
    fn test_insert_first() {
        let mut record: Record = [("name".to_string(), Node::from("Ada"))].into_iter().collect();
        record.insert_first(TYPE_KEY.to_string(), Node::from("Person"));
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["type", "name"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut record: Record = ["a", "b", "c"]
            .into_iter()
            .map(|k| (k.to_string(), Node::Null))
            .collect();
        record.remove("a");
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }
}
