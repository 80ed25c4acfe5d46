use ahash::AHashMap;
use convert_case::{Case, Casing};

use crate::shape::TypeSchema;

/// Lookup from any accepted spelling of a property name to its canonical name.
#[derive(Debug, Clone, Default)]
pub struct PropertyNames {
    /// Canonical names and declared aliases.
    exact: AHashMap<String, String>,
    /// The same, keyed by normalized spelling.
    normalized: AHashMap<String, String>,
}

impl PropertyNames {
    pub fn build(schema: &TypeSchema) -> Self {
        let mut names = Self::default();
        for canonical in schema.properties.keys() {
            names.add(canonical, canonical);
        }
        for (alias, canonical) in &schema.aliases {
            names.add(alias, canonical);
        }
        names
    }

    fn add(&mut self, spelling: &str, canonical: &str) {
        self.exact
            .entry(spelling.to_string())
            .or_insert_with(|| canonical.to_string());
        self.normalized
            .entry(normalize(spelling))
            .or_insert_with(|| canonical.to_string());
    }

    /// The canonical name `key` stands for, if any.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        if let Some(canonical) = self.exact.get(key) {
            return Some(canonical);
        }
        self.normalized.get(&normalize(key)).map(String::as_str)
    }
}

/// Separator- and case-insensitive spelling: `given_name`, `Given-Name` and
/// `givenName` all normalize to `givenName`.
pub fn normalize(name: &str) -> String {
    name.to_case(Case::Camel)
}
