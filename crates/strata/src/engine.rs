use std::sync::Arc;

use strata_node::Node;
use strata_schema::{
    CoerceWarning, Coerced, Registry, SchemaSet, SchemaSource, coerce_type, validate_type,
};
use tracing::{Span, debug, instrument, warn};

use crate::builtin::BuiltinSource;
use crate::config::EngineOptions;
use crate::decode::{DecoderResolver, Decoders};
use crate::error::CoerceError;
use crate::expand::expand;

/// A coerced tree together with the adjustments made to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    pub node: Node,
    pub warnings: Vec<CoerceWarning>,
}

/// Coerces and validates node trees against the types of one registry.
///
/// Cloning is cheap and clones share the schema cache. Separate engines
/// share nothing.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    decoders: Arc<dyn DecoderResolver>,
    options: EngineOptions,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// An engine loading types from `source`, with no decoders.
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self {
            registry: Arc::new(Registry::new(source)),
            decoders: Arc::new(Decoders::new()),
            options: EngineOptions::default(),
        }
    }

    /// An engine over the bundled schemas.
    pub fn builtin() -> Self {
        Self::new(BuiltinSource)
    }

    #[must_use]
    pub fn with_decoders(mut self, decoders: impl DecoderResolver + 'static) -> Self {
        self.decoders = Arc::new(decoders);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Coerce `node` into a valid instance of `type_name`, or of the type its
    /// discriminator names when `type_name` is `None`.
    ///
    /// `node` is never modified; the result is a new tree.
    pub async fn coerce(&self, node: &Node, type_name: Option<&str>) -> Result<Node, CoerceError> {
        self.coerce_with_report(node, type_name)
            .await
            .map(|coercion| coercion.node)
    }

    /// Like [`Engine::coerce`], also returning the warnings raised on the way.
    #[instrument(skip_all, fields(type_name))]
    pub async fn coerce_with_report(
        &self,
        node: &Node,
        type_name: Option<&str>,
    ) -> Result<Coercion, CoerceError> {
        let type_name = target_type(node, type_name)?;
        Span::current().record("type_name", type_name);
        let schemas = self.schemas(type_name).await?;

        let Coerced {
            node: coerced,
            mut warnings,
            decode_sites,
        } = coerce_type(&schemas, node.clone(), type_name);

        let coerced = if self.options.expand && !decode_sites.is_empty() {
            debug!(sites = decode_sites.len(), "expanding embedded content");
            expand(
                &schemas,
                self.decoders.as_ref(),
                self.options.decode_failure,
                coerced,
                decode_sites,
                &mut warnings,
            )
            .await?
        } else {
            coerced
        };

        for warning in &warnings {
            warn!(path = %warning.path(), "{warning}");
        }

        let output = validate_type(&schemas, &coerced, type_name);
        if !output.is_valid {
            return Err(CoerceError::StructuralViolation {
                type_name: type_name.to_string(),
                errors: output.errors,
            });
        }
        Ok(Coercion {
            node: coerced,
            warnings,
        })
    }

    /// Check `node` against `type_name` (or its own discriminator) without
    /// changing anything. Every structural error is reported.
    #[instrument(skip_all, fields(type_name))]
    pub async fn validate(&self, node: &Node, type_name: Option<&str>) -> Result<(), CoerceError> {
        let type_name = target_type(node, type_name)?;
        Span::current().record("type_name", type_name);
        let schemas = self.schemas(type_name).await?;
        let output = validate_type(&schemas, node, type_name);
        if output.is_valid {
            Ok(())
        } else {
            Err(CoerceError::StructuralViolation {
                type_name: type_name.to_string(),
                errors: output.errors,
            })
        }
    }

    /// Whether `node` is valid. Any failure, including an unknown type,
    /// counts as invalid.
    pub async fn is_valid(&self, node: &Node, type_name: Option<&str>) -> bool {
        match self.validate(node, type_name).await {
            Ok(()) => true,
            Err(error) => {
                debug!(%error, "node is not valid");
                false
            }
        }
    }

    async fn schemas(&self, type_name: &str) -> Result<SchemaSet, CoerceError> {
        let schemas = self.registry.resolve(type_name).await?;
        Ok(schemas.with_reference_limit(self.options.max_reference_depth))
    }
}

fn target_type<'a>(node: &'a Node, type_name: Option<&'a str>) -> Result<&'a str, CoerceError> {
    type_name
        .or_else(|| node.type_name())
        .ok_or(CoerceError::MissingType)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_target_type() {
        let node = Node::from(json!({"type": "Person"}));
        assert_eq!(target_type(&node, None).unwrap(), "Person");
        assert_eq!(target_type(&node, Some("Thing")).unwrap(), "Thing");
        assert!(matches!(
            target_type(&Node::from(json!({"name": "x"})), None),
            Err(CoerceError::MissingType)
        ));
    }

    #[tokio::test]
    async fn test_engines_do_not_share_caches() {
        let first = Engine::builtin();
        let second = Engine::builtin();
        first.coerce(&Node::from(json!({})), Some("Thing")).await.unwrap();
        assert!(first.registry().is_cached("Thing"));
        assert!(!second.registry().is_cached("Thing"));

        let clone = first.clone();
        assert!(clone.registry().is_cached("Thing"));
    }
}
