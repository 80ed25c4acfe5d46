//! Schemas bundled with the crate.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use strata_schema::{SchemaSource, SourceError};

macro_rules! bundled {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../schemas/", $name, ".schema.json")))),*]
    };
}

const SCHEMAS: &[(&str, &str)] = bundled![
    "Article",
    "BlockContent",
    "CodeBlock",
    "CreativeWork",
    "Emphasis",
    "Heading",
    "ImageObject",
    "InlineContent",
    "Link",
    "List",
    "ListItem",
    "Organization",
    "Paragraph",
    "Person",
    "Strong",
    "Thing",
];

/// Names of the bundled types.
pub fn builtin_types() -> impl Iterator<Item = &'static str> {
    SCHEMAS.iter().map(|(name, _)| *name)
}

/// Serves the bundled schemas. Definitions are parsed on each load; the
/// registry caches the compiled result.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl SchemaSource for BuiltinSource {
    fn load<'a>(
        &'a self,
        type_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, SourceError>> {
        let text = SCHEMAS
            .iter()
            .find(|(name, _)| *name == type_name)
            .map(|(_, text)| *text);
        async move {
            let Some(text) = text else {
                return Ok(None);
            };
            serde_json::from_str(text)
                .map(Some)
                .map_err(|source| SourceError::Json {
                    name: type_name.to_string(),
                    source,
                })
        }
        .boxed()
    }
}
