//! Validation error types

use strata_node::NodePath;
use thiserror::Error;

/// Information about the nearest variant of a union that no variant matched.
///
/// The nearest variant is the one whose errors suggest it got furthest:
/// a structural match at the union's own level first, then the depth of its
/// deepest error, then the fewest errors, then the most telling error kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BestVariantMatch {
    pub variant_name: String,
    /// Most significant error of the variant (may itself be `NoVariantMatched`)
    pub error: Box<ValidationError>,
    pub all_errors: Vec<ValidationError>,
    /// Path length of the deepest error
    pub depth: usize,
    pub error_count: usize,
}

/// A structural mismatch between a node and its schema.
///
/// Errors are accumulated; validation continues after recording one.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Type mismatch: expected {expected}, got {actual} at path {path}")]
    TypeMismatch {
        expected: String,
        actual: String,
        path: NodePath,
    },
    #[error("Missing required property '{property}' at path {path}")]
    MissingRequiredProperty {
        property: String,
        path: NodePath,
    },
    #[error("Unknown property '{property}' at path {path}")]
    UnknownProperty {
        property: String,
        path: NodePath,
    },
    #[error("Literal mismatch: expected {expected}, got {actual} at path {path}")]
    LiteralMismatch {
        expected: String,
        actual: String,
        path: NodePath,
    },
    #[error("{} at path {path}", format_no_variant_matched(.best_match))]
    NoVariantMatched {
        path: NodePath,
        /// None if no variant was tried
        best_match: Option<Box<BestVariantMatch>>,
    },
    #[error("Multiple variants matched: {} at path {path}", .variants.join(", "))]
    AmbiguousUnion {
        path: NodePath,
        variants: Vec<String>,
    },
    #[error("Undefined type reference '{name}' at path {path}")]
    UndefinedTypeReference {
        name: String,
        path: NodePath,
    },
    #[error("Too many nested references through '{name}' at path {path}")]
    ReferenceCycle {
        name: String,
        path: NodePath,
    },
}

impl ValidationError {
    pub fn path(&self) -> &NodePath {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingRequiredProperty { path, .. }
            | Self::UnknownProperty { path, .. }
            | Self::LiteralMismatch { path, .. }
            | Self::NoVariantMatched { path, .. }
            | Self::AmbiguousUnion { path, .. }
            | Self::UndefinedTypeReference { path, .. }
            | Self::ReferenceCycle { path, .. } => path,
        }
    }

    /// The error without its path.
    pub fn message(&self) -> String {
        match self {
            Self::TypeMismatch {
                expected, actual, ..
            } => format!("Type mismatch: expected {expected}, got {actual}"),
            Self::MissingRequiredProperty { property, .. } => {
                format!("Missing required property '{property}'")
            }
            Self::UnknownProperty { property, .. } => format!("Unknown property '{property}'"),
            Self::LiteralMismatch {
                expected, actual, ..
            } => format!("Literal mismatch: expected {expected}, got {actual}"),
            Self::NoVariantMatched { best_match, .. } => format_no_variant_matched(best_match),
            Self::AmbiguousUnion { variants, .. } => {
                format!("Multiple variants matched: {}", variants.join(", "))
            }
            Self::UndefinedTypeReference { name, .. } => {
                format!("Undefined type reference '{name}'")
            }
            Self::ReferenceCycle { name, .. } => {
                format!("Too many nested references through '{name}'")
            }
        }
    }

    /// Walks nested `NoVariantMatched` errors down to the error that says
    /// what was actually wrong with the value.
    pub fn deepest_error(&self) -> &ValidationError {
        match self {
            Self::NoVariantMatched {
                best_match: Some(best),
                ..
            } => match best.error.as_ref() {
                Self::NoVariantMatched { .. }
                | Self::TypeMismatch { .. }
                | Self::LiteralMismatch { .. }
                | Self::UnknownProperty { .. } => best.error.deepest_error(),
                _ => self,
            },
            _ => self,
        }
    }

    /// Path length; deeper errors mean validation got further.
    pub fn depth(&self) -> usize {
        self.path().depth()
    }

    /// Higher means more indicative of a mismatch.
    pub fn priority_score(&self) -> u8 {
        match self {
            Self::MissingRequiredProperty { .. } => 90,
            Self::TypeMismatch { .. } => 80,
            Self::LiteralMismatch { .. } => 70,
            Self::NoVariantMatched { .. } => 60,
            Self::UnknownProperty { .. } => 50,
            Self::AmbiguousUnion { .. } => 0,
            Self::UndefinedTypeReference { .. } => 0,
            Self::ReferenceCycle { .. } => 0,
        }
    }
}

fn format_no_variant_matched(best_match: &Option<Box<BestVariantMatch>>) -> String {
    let Some(best) = best_match else {
        return "No variant matched".to_string();
    };
    let mut msg = best.error.to_string();
    if best.all_errors.len() > 1 {
        msg.push_str(&format!(" (and {} more errors)", best.all_errors.len() - 1));
    }
    // Nested unions already name their nearest variant.
    if !matches!(best.error.as_ref(), ValidationError::NoVariantMatched { .. }) {
        msg.push_str(&format!(
            " (based on nearest variant '{}')",
            best.variant_name
        ));
    }
    msg
}

/// Select the nearest variant from the errors each variant produced.
///
/// `base_depth` is the depth of the union's own path; a type mismatch there
/// means the variant does not even have the right kind of value.
pub fn select_best_variant_match(
    variant_errors: Vec<(String, Vec<ValidationError>)>,
    base_depth: usize,
) -> Option<BestVariantMatch> {
    let best = variant_errors
        .into_iter()
        .filter(|(_, errors)| !errors.is_empty())
        .max_by_key(|(_, errors)| {
            let max_depth = errors.iter().map(|e| e.depth()).max().unwrap_or(0);
            let max_priority = errors.iter().map(|e| e.priority_score()).max().unwrap_or(0);
            let structural_match = !errors.iter().any(|e| {
                matches!(e, ValidationError::TypeMismatch { .. }) && e.depth() == base_depth
            });
            (
                structural_match,
                max_depth,
                usize::MAX - errors.len(),
                max_priority,
            )
        });

    best.and_then(|(variant_name, mut errors)| {
        let depth = errors.iter().map(|e| e.depth()).max().unwrap_or(0);
        let error_count = errors.len();
        errors.sort_by_key(|e| {
            (
                core::cmp::Reverse(e.priority_score()),
                core::cmp::Reverse(e.depth()),
            )
        });
        let primary = errors.first().cloned()?;
        Some(BestVariantMatch {
            variant_name,
            error: Box::new(primary),
            all_errors: errors,
            depth,
            error_count,
        })
    })
}
