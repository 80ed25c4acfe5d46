use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::json;
use strata::{
    BuiltinSource, DecodeError, Decoder, DecoderResolver, Engine, EngineOptions, Node,
    render_error,
};
use strata_schema::{MemorySource, SchemaSource, SourceError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

struct SlowSource {
    inner: BuiltinSource,
    loads: Arc<AtomicUsize>,
}

impl SchemaSource for SlowSource {
    fn load<'a>(
        &'a self,
        type_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, SourceError>> {
        async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.load(type_name).await
        }
        .boxed()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_loads_once() {
    init_tracing();
    let loads = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(SlowSource {
        inner: BuiltinSource,
        loads: loads.clone(),
    });
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let input = Node::from(json!({"name": i}));
                engine.coerce(&input, Some("Thing")).await
            })
        })
        .collect();
    for (i, task) in tasks.into_iter().enumerate() {
        let coerced = task.await.unwrap().unwrap();
        assert_eq!(
            coerced,
            Node::from(json!({"type": "Thing", "name": i.to_string()}))
        );
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

/// Resolves every format to a decoder that waits before answering.
struct SlowResolver {
    resolved: Arc<AtomicUsize>,
}

impl DecoderResolver for SlowResolver {
    fn resolve<'a>(&'a self, format: &'a str) -> BoxFuture<'a, Option<Arc<dyn Decoder>>> {
        async move {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            let decoder: Arc<dyn Decoder> = match format {
                "txt" => Arc::new(|content: &str| -> Result<Node, DecodeError> {
                    Ok(Node::Array(content.split(' ').map(Node::from).collect()))
                }),
                _ => return None,
            };
            Some(decoder)
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_every_site_expanded_before_return() {
    init_tracing();
    let source = MemorySource::from_definitions([
        json!({
            "title": "Note",
            "properties": {
                "words": {"type": "array", "items": {"type": "string"}, "decode": "txt"},
                "replies": {"type": "array", "items": {"$ref": "Note"}}
            }
        }),
    ])
    .unwrap();
    let resolved = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(source).with_decoders(SlowResolver {
        resolved: resolved.clone(),
    });
    let input = Node::from(json!({
        "type": "Note",
        "words": "a b",
        "replies": [{"words": "c"}, {"words": ["d"]}, {"words": "e f g"}]
    }));
    let coerced = engine.coerce(&input, None).await.unwrap();
    assert_eq!(
        coerced,
        Node::from(json!({
            "type": "Note",
            "words": ["a", "b"],
            "replies": [
                {"type": "Note", "words": ["c"]},
                {"type": "Note", "words": ["d"]},
                {"type": "Note", "words": ["e", "f", "g"]}
            ]
        }))
    );
    assert_eq!(resolved.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_render_structural_violation() {
    let engine = Engine::builtin();
    let input = Node::from(json!({"type": "Person", "favoriteColor": "red", "name": {"first": "Jo"}}));
    let err = engine.validate(&input, None).await.unwrap_err();
    let text = render_error(&err, &input, false);
    assert!(text.contains("Unknown property 'favoriteColor'"), "{text}");
    assert!(text.contains("Type mismatch: expected string, got record"), "{text}");
    assert!(text.contains("\"first\": \"Jo\""), "{text}");
}

#[tokio::test]
async fn test_reference_depth_option() {
    let source = MemorySource::from_definitions([
        json!({"title": "Loop", "oneOf": [{"$ref": "Loop"}, {"type": "boolean"}]}),
        json!({"title": "Holder", "properties": {"value": {"$ref": "Loop"}}}),
    ])
    .unwrap();
    let engine =
        Engine::new(source).with_options(EngineOptions::default().with_max_reference_depth(4));
    let input = Node::from(json!({"type": "Holder", "value": "true"}));
    let err = engine.validate(&input, None).await.unwrap_err();
    assert!(
        err.to_string().contains("Too many nested references through 'Loop'"),
        "{err}"
    );
}
