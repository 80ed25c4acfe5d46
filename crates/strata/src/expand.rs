//! Expansion of strings flagged with a decode directive.
//!
//! Runs after the structural passes. Every site is resolved and decoded
//! concurrently; the decoded trees are then coerced against the directive's
//! shape and spliced in, in tree order. Directives inside decoded content are
//! not expanded again.

use futures_util::future::join_all;
use strata_node::Node;
use strata_schema::{CoerceWarning, DecodeSite, SchemaSet, coerce_tree};
use tracing::debug;

use crate::config::DecodeFailurePolicy;
use crate::decode::{DecodeError, DecoderResolver};
use crate::error::CoerceError;

enum Outcome {
    /// The site no longer holds a string.
    Gone,
    Unavailable,
    Decoded(Result<Node, DecodeError>),
}

pub(crate) async fn expand(
    schemas: &SchemaSet,
    resolver: &dyn DecoderResolver,
    policy: DecodeFailurePolicy,
    node: Node,
    sites: Vec<DecodeSite>,
    warnings: &mut Vec<CoerceWarning>,
) -> Result<Node, CoerceError> {
    let outcomes = join_all(sites.iter().map(|site| {
        let content = node.get_path(&site.path).and_then(Node::as_str);
        async move {
            let Some(content) = content else {
                return Outcome::Gone;
            };
            match resolver.resolve(&site.format).await {
                Some(decoder) => Outcome::Decoded(decoder.decode(content).await),
                None => Outcome::Unavailable,
            }
        }
    }))
    .await;

    let mut node = node;
    for (site, outcome) in sites.into_iter().zip(outcomes) {
        match outcome {
            Outcome::Gone => {
                debug!(path = %site.path, "decode site no longer holds a string");
            }
            Outcome::Unavailable => warnings.push(CoerceWarning::DecodeUnavailable {
                format: site.format,
                path: site.path,
            }),
            Outcome::Decoded(Err(error)) => match policy {
                DecodeFailurePolicy::Abort => {
                    return Err(CoerceError::DecodeFailure {
                        path: site.path,
                        format: site.format,
                        message: error.message,
                    });
                }
                DecodeFailurePolicy::Warn => warnings.push(CoerceWarning::DecodeFailed {
                    format: site.format,
                    message: error.message,
                    path: site.path,
                }),
            },
            Outcome::Decoded(Ok(decoded)) => {
                let coerced = coerce_tree(schemas, decoded, &site.shape, &site.path);
                if !coerced.decode_sites.is_empty() {
                    debug!(
                        path = %site.path,
                        nested = coerced.decode_sites.len(),
                        "left decode directives inside decoded content unexpanded"
                    );
                }
                warnings.extend(coerced.warnings);
                debug!(path = %site.path, format = %site.format, "expanded embedded content");
                node = node.replace_at(&site.path, coerced.node)?;
            }
        }
    }
    Ok(node)
}
