//! Human-readable diagnostics for structural errors.
//!
//! [`format_errors`] gives the compact single-line form used in error
//! messages. [`render_errors`] echoes the offending node, pretty-printed as
//! JSON, with each error annotated where it occurred.
//!
//! Rendering never fails: if it cannot be done, the errors are listed as
//! `path: message` lines instead.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use annotate_snippets::{AnnotationKind as SnippetAnnotation, Group, Level, Renderer, Snippet};
use strata_node::{Node, NodePath, SpanMap, to_pretty_json_with_spans};
use strata_schema::ValidationError;

use crate::error::CoerceError;

/// Name shown for the rendered node.
const SOURCE_NAME: &str = "<node>";

/// `path: message` for each error, joined with `; `.
pub fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.path(), error.message()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render `errors` against the node they were found in.
pub fn render_errors(errors: &[ValidationError], original: &Node, styled: bool) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        let located: Vec<Located> = errors.iter().map(Located::from_error).collect();
        render_located(&located, original, styled)
    }));
    match rendered {
        Ok(text) => text,
        Err(_) => fallback(errors.iter().map(|e| (e.path().to_string(), e.message()))),
    }
}

/// Render any engine error. Structural violations are annotated against
/// `original`; other errors are rendered as a single titled report.
pub fn render_error(error: &CoerceError, original: &Node, styled: bool) -> String {
    let errors = error.validation_errors();
    if !errors.is_empty() {
        return render_errors(errors, original, styled);
    }
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        let located = match error {
            CoerceError::DecodeFailure { path, .. } => Located {
                title: error.to_string(),
                label: "could not be decoded".to_string(),
                path: path.clone(),
            },
            _ => Located {
                title: error.to_string(),
                label: error.to_string(),
                path: NodePath::root(),
            },
        };
        render_located(&[located], original, styled)
    }));
    match rendered {
        Ok(text) => text,
        Err(_) => fallback([("(root)".to_string(), error.to_string())]),
    }
}

/// One annotated report: what to say, and where in the node.
struct Located {
    title: String,
    label: String,
    path: NodePath,
}

impl Located {
    fn from_error(error: &ValidationError) -> Self {
        // A failed union is reported where its nearest variant went wrong.
        let cause = error.deepest_error();
        let path = match cause {
            ValidationError::UnknownProperty { property, path } => path.child_property(property),
            _ => cause.path().clone(),
        };
        Self {
            title: error.to_string(),
            label: cause.message(),
            path,
        }
    }
}

fn render_located(located: &[Located], original: &Node, styled: bool) -> String {
    let (source, spans) = to_pretty_json_with_spans(original);
    let groups: Vec<Group<'_>> = located
        .iter()
        .map(|report| {
            let span = nearest_span(&spans, &report.path, source.len());
            Level::ERROR.primary_title(report.title.as_str()).element(
                Snippet::source(&source)
                    .line_start(1)
                    .path(SOURCE_NAME)
                    .annotation(
                        SnippetAnnotation::Primary
                            .span(span)
                            .label(report.label.as_str()),
                    ),
            )
        })
        .collect();

    let renderer = if styled {
        Renderer::styled()
    } else {
        Renderer::plain()
    };
    renderer.render(&groups).to_string()
}

/// Span of `path`, or of its nearest ancestor present in the rendered node.
fn nearest_span(spans: &SpanMap, path: &NodePath, len: usize) -> Range<usize> {
    let mut current = Some(path.clone());
    while let Some(path) = current {
        if let Some(span) = spans.get(&path) {
            let start = span.start.min(len);
            return start..span.end.min(len).max(start);
        }
        current = path.parent();
    }
    0..len
}

fn fallback(lines: impl IntoIterator<Item = (String, String)>) -> String {
    lines
        .into_iter()
        .map(|(path, message)| format!("{path}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn unknown_color() -> ValidationError {
        ValidationError::UnknownProperty {
            property: "favoriteColor".to_string(),
            path: NodePath::root(),
        }
    }

    #[test]
    fn test_format_errors() {
        let errors = vec![
            unknown_color(),
            ValidationError::MissingRequiredProperty {
                property: "type".to_string(),
                path: NodePath::root().child_property("authors").child_index(0),
            },
        ];
        assert_eq!(
            format_errors(&errors),
            "(root): Unknown property 'favoriteColor'; \
             authors[0]: Missing required property 'type'"
        );
    }

    #[test]
    fn test_render_echoes_fragment() {
        let node = Node::from(json!({"type": "Person", "favoriteColor": "red"}));
        let text = render_errors(&[unknown_color()], &node, false);
        assert!(text.contains("Unknown property 'favoriteColor' at path (root)"), "{text}");
        assert!(text.contains("\"favoriteColor\": \"red\""), "{text}");
        assert!(text.contains(SOURCE_NAME), "{text}");
    }

    #[test]
    fn test_missing_path_uses_nearest_ancestor() {
        let node = Node::from(json!({"authors": [{"name": "Jo"}]}));
        let (source, spans) = to_pretty_json_with_spans(&node);
        let path = NodePath::root()
            .child_property("authors")
            .child_index(0)
            .child_property("givenNames")
            .child_index(3);
        let span = nearest_span(&spans, &path, source.len());
        assert_eq!(&source[span], "{\n      \"name\": \"Jo\"\n    }");
    }

    #[test]
    fn test_render_error_without_validation_errors() {
        let node = Node::from(json!({"content": "# Title"}));
        let error = CoerceError::DecodeFailure {
            path: NodePath::root().child_property("content"),
            format: "md".to_string(),
            message: "unexpected end of input".to_string(),
        };
        let text = render_error(&error, &node, false);
        assert!(
            text.contains("failed to decode md content at path content: unexpected end of input"),
            "{text}"
        );
        assert!(text.contains("could not be decoded"), "{text}");
    }

    #[test]
    fn test_fallback_lines() {
        let text = fallback([
            ("(root)".to_string(), "Unknown property 'x'".to_string()),
            ("name".to_string(), "Type mismatch: expected string, got integer".to_string()),
        ]);
        assert_eq!(
            text,
            "(root): Unknown property 'x'\nname: Type mismatch: expected string, got integer"
        );
    }
}
