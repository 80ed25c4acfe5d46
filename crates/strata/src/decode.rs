//! Decoders for embedded content.
//!
//! A decode directive names a content format. The engine asks its
//! [`DecoderResolver`] for a [`Decoder`] for that format and replaces the
//! flagged string with the node the decoder returns.

use std::sync::Arc;

use ahash::AHashMap;
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use strata_node::Node;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns content in one format into a node tree.
pub trait Decoder: Send + Sync {
    fn decode<'a>(&'a self, content: &'a str) -> BoxFuture<'a, Result<Node, DecodeError>>;
}

impl<F> Decoder for F
where
    F: Fn(&str) -> Result<Node, DecodeError> + Send + Sync,
{
    fn decode<'a>(&'a self, content: &'a str) -> BoxFuture<'a, Result<Node, DecodeError>> {
        future::ready(self(content)).boxed()
    }
}

/// Finds the decoder for a format name. `None` means no decoder is available.
pub trait DecoderResolver: Send + Sync {
    fn resolve<'a>(&'a self, format: &'a str) -> BoxFuture<'a, Option<Arc<dyn Decoder>>>;
}

/// Decoders registered by format name. Names are matched case-insensitively.
#[derive(Clone, Default)]
pub struct Decoders {
    decoders: AHashMap<String, Arc<dyn Decoder>>,
}

impl core::fmt::Debug for Decoders {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut formats: Vec<&String> = self.decoders.keys().collect();
        formats.sort();
        f.debug_struct("Decoders").field("formats", &formats).finish()
    }
}

impl Decoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, format: &str, decoder: impl Decoder + 'static) {
        self.decoders
            .insert(format.to_ascii_lowercase(), Arc::new(decoder));
    }

    #[must_use]
    pub fn with(mut self, format: &str, decoder: impl Decoder + 'static) -> Self {
        self.register(format, decoder);
        self
    }

    pub fn get(&self, format: &str) -> Option<Arc<dyn Decoder>> {
        self.decoders.get(&format.to_ascii_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl DecoderResolver for Decoders {
    fn resolve<'a>(&'a self, format: &'a str) -> BoxFuture<'a, Option<Arc<dyn Decoder>>> {
        future::ready(self.get(format)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(content: &str) -> Result<Node, DecodeError> {
        if content.is_empty() {
            return Err(DecodeError::new("empty content"));
        }
        Ok(Node::Array(content.lines().map(Node::from).collect()))
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() {
        let decoders = Decoders::new().with("TXT", lines);
        assert_eq!(decoders.len(), 1);
        let decoder = decoders.resolve("txt").await.unwrap();
        assert_eq!(
            decoder.decode("a\nb").await,
            Ok(Node::Array(vec!["a".into(), "b".into()]))
        );
        assert!(decoders.resolve("md").await.is_none());
    }

    #[tokio::test]
    async fn test_decoder_error() {
        let decoders = Decoders::new().with("txt", lines);
        let decoder = decoders.get("txt").unwrap();
        let err = decoder.decode("").await.unwrap_err();
        assert_eq!(err.to_string(), "empty content");
    }
}
