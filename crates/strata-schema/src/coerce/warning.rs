use strata_node::NodePath;
use thiserror::Error;

/// A non-fatal adjustment made while coercing a tree.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoerceWarning {
    /// A property matching no declared name or alias was dropped from the
    /// record at `path`.
    #[error("Dropped unknown property '{property}' at path {path}")]
    UnknownProperty { property: String, path: NodePath },
    /// `property` named a canonical property already present in the record
    /// at `path`; the first occurrence was kept.
    #[error("Dropped '{property}' at path {path}: '{canonical}' was already given")]
    DuplicateProperty {
        property: String,
        canonical: String,
        path: NodePath,
    },
    /// A single-valued property was given an array; all but the first element
    /// were dropped.
    #[error(
        "Kept the first of {} values for single-valued property '{property}' at path {path}",
        .discarded + 1
    )]
    CardinalityReduced {
        property: String,
        discarded: usize,
        path: NodePath,
    },
    /// No decoder is registered for `format`; the content was left as is.
    #[error("No decoder for format '{format}'; left content at path {path} as is")]
    DecodeUnavailable { format: String, path: NodePath },
    /// The decoder failed and the lenient policy kept the content as is.
    #[error("Failed to decode {format} content at path {path}: {message}")]
    DecodeFailed {
        format: String,
        message: String,
        path: NodePath,
    },
}

impl CoerceWarning {
    pub fn path(&self) -> &NodePath {
        match self {
            Self::UnknownProperty { path, .. }
            | Self::DuplicateProperty { path, .. }
            | Self::CardinalityReduced { path, .. }
            | Self::DecodeUnavailable { path, .. }
            | Self::DecodeFailed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let warning = CoerceWarning::CardinalityReduced {
            property: "name".to_string(),
            discarded: 2,
            path: NodePath::root().child_property("name"),
        };
        assert_eq!(
            warning.to_string(),
            "Kept the first of 3 values for single-valued property 'name' at path name"
        );
        let warning = CoerceWarning::UnknownProperty {
            property: "favoriteColor".to_string(),
            path: NodePath::root().child_property("authors").child_index(0),
        };
        assert_eq!(
            warning.to_string(),
            "Dropped unknown property 'favoriteColor' at path authors[0]"
        );
    }
}
