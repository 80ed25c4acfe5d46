use strata_node::{NodePath, PathError};
use strata_schema::{RegistryError, SchemaDefinitionError, SourceError, ValidationError};
use thiserror::Error;

use crate::report::format_errors;

#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("no schema for type '{name}'")]
    NoSchema { name: String },

    #[error("no type name given and the node has no string 'type' property")]
    MissingType,

    #[error("invalid schema for type '{name}': {source}")]
    InvalidSchema {
        name: String,
        #[source]
        source: SchemaDefinitionError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to decode {format} content at path {path}: {message}")]
    DecodeFailure {
        path: NodePath,
        format: String,
        message: String,
    },

    #[error("invalid {type_name}: {}", format_errors(.errors))]
    StructuralViolation {
        type_name: String,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

impl CoerceError {
    /// The structural errors, if the tree failed validation.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::StructuralViolation { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<RegistryError> for CoerceError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NoSchema { name } => Self::NoSchema { name },
            RegistryError::Definition { name, source } => Self::InvalidSchema { name, source },
            RegistryError::Source(source) => Self::Source(source),
        }
    }
}
