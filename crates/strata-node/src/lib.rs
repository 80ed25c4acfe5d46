//! Node tree of the strata document model.
//!
//! Every document handled by strata, whatever format it came from, is held as a
//! tree of [`Node`]s. Records carry a `"type"` discriminator naming their schema.

/// The node value type and its kinds.
pub mod node;

/// Ordered string-keyed records.
pub mod record;

/// Paths addressing values inside a node tree.
pub mod path;

/// Conversion between nodes and JSON.
pub mod json;

/// Pretty JSON rendering that remembers where each value was written.
pub mod pretty;

pub use json::JsonError;
pub use node::{Node, NodeKind};
pub use path::{NodePath, PathError, PathSegment};
pub use pretty::{SpanMap, to_pretty_json_with_spans};
pub use record::{Record, TYPE_KEY};

pub(crate) mod prelude_internal {
    #![allow(unused_imports)]
    pub use crate::node::{Node, NodeKind};
    pub use crate::path::{NodePath, PathError, PathSegment};
    pub use crate::record::{Record, TYPE_KEY};
    pub use thisisplural::Plural;
}
