//! Type schemas for strata documents, and the synchronous machinery that
//! checks and coerces node trees against them.
//!
//! Types are loaded lazily through a [`Registry`] backed by any
//! [`SchemaSource`]. Before a tree is processed, the registry resolves the
//! root type's reference closure into a [`SchemaSet`]; validation and
//! coercion then run over that snapshot without suspending.

mod names;
mod parse;
mod registry;
mod shape;
mod source;

pub mod coerce;
pub mod validate;

pub use names::{PropertyNames, normalize};
pub use parse::{RawShape, RawTypeSchema, SchemaDefinitionError, build_type, parse_definition};
pub use registry::{CompiledType, DEFAULT_REFERENCE_LIMIT, Registry, RegistryError, SchemaSet};
pub use shape::{PropertySchema, Shape, TypeSchema};
pub use source::{DirectorySource, MemorySource, SchemaSource, SourceError};

pub use coerce::{CoerceWarning, Coerced, DecodeSite, coerce_tree, coerce_type};
pub use validate::{ValidationError, ValidationOutput, validate_shape, validate_type};
