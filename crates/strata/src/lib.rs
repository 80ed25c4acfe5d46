//! Schema-directed coercion of strata document trees.
//!
//! An [`Engine`] owns a schema [`Registry`](strata_schema::Registry), the
//! decoders used to expand embedded content and its [`EngineOptions`]. Every
//! call works on a private copy of the caller's tree:
//!
//! 1. the target type's reference closure is resolved through the registry;
//! 2. the tree is reshaped and coerced synchronously;
//! 3. strings flagged with a decode directive are expanded concurrently;
//! 4. the result is validated and returned, or rejected with every
//!    structural error found.

pub mod builtin;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
mod expand;
pub mod report;

pub use builtin::{BuiltinSource, builtin_types};
pub use config::{DecodeFailurePolicy, EngineOptions};
pub use decode::{DecodeError, Decoder, DecoderResolver, Decoders};
pub use engine::{Coercion, Engine};
pub use error::CoerceError;
pub use report::{format_errors, render_error, render_errors};

pub use strata_node::{Node, NodePath, Record};
pub use strata_schema::{CoerceWarning, ValidationError};
