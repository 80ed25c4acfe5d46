use std::path::PathBuf;

use ahash::AHashMap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read schema '{name}' from {}: {source}", path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema '{name}' is not valid JSON: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema definition #{index} has no string title")]
    MissingTitle { index: usize },
}

/// Backing store of raw schema definitions, keyed by type name.
///
/// `Ok(None)` means the store has no definition for the name.
pub trait SchemaSource: Send + Sync {
    fn load<'a>(
        &'a self,
        type_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, SourceError>>;
}

/// Definitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    definitions: AHashMap<String, serde_json::Value>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from definitions keyed by their `title`.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = serde_json::Value>,
    ) -> Result<Self, SourceError> {
        let mut source = Self::new();
        for (index, definition) in definitions.into_iter().enumerate() {
            let Some(title) = definition.get("title").and_then(|t| t.as_str()) else {
                return Err(SourceError::MissingTitle { index });
            };
            source.insert(title.to_string(), definition);
        }
        Ok(source)
    }

    pub fn insert(&mut self, type_name: impl Into<String>, definition: serde_json::Value) {
        self.definitions.insert(type_name.into(), definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl SchemaSource for MemorySource {
    fn load<'a>(
        &'a self,
        type_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, SourceError>> {
        let definition = self.definitions.get(type_name).cloned();
        async move { Ok(definition) }.boxed()
    }
}

/// Definitions stored as `<dir>/<TypeName>.schema.json` files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_of(&self, type_name: &str) -> Option<PathBuf> {
        let plain = !type_name.is_empty()
            && type_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        plain.then(|| self.dir.join(format!("{type_name}.schema.json")))
    }
}

impl SchemaSource for DirectorySource {
    fn load<'a>(
        &'a self,
        type_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, SourceError>> {
        async move {
            let Some(path) = self.path_of(type_name) else {
                return Ok(None);
            };
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(source) => {
                    return Err(SourceError::Io {
                        name: type_name.to_string(),
                        path,
                        source,
                    });
                }
            };
            serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| SourceError::Json {
                    name: type_name.to_string(),
                    source,
                })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::from_definitions([json!({"title": "Thing"})]).unwrap();
        assert_eq!(
            source.load("Thing").await.unwrap(),
            Some(json!({"title": "Thing"}))
        );
        assert_eq!(source.load("Nope").await.unwrap(), None);
    }

    #[test]
    fn test_memory_source_requires_title() {
        let err = MemorySource::from_definitions([json!({"title": "A"}), json!({})]).unwrap_err();
        assert!(matches!(err, SourceError::MissingTitle { index: 1 }));
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = std::env::temp_dir().join(format!("strata-source-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("Thing.schema.json"), r#"{"title": "Thing"}"#)
            .await
            .unwrap();
        tokio::fs::write(dir.join("Broken.schema.json"), "{").await.unwrap();

        let source = DirectorySource::new(&dir);
        assert_eq!(
            source.load("Thing").await.unwrap(),
            Some(json!({"title": "Thing"}))
        );
        assert_eq!(source.load("Missing").await.unwrap(), None);
        assert_eq!(source.load("../Thing").await.unwrap(), None);
        assert!(matches!(
            source.load("Broken").await,
            Err(SourceError::Json { .. })
        ));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
