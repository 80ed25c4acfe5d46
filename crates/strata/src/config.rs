//! Engine configuration.

use serde::{Deserialize, Serialize};
use strata_schema::DEFAULT_REFERENCE_LIMIT;

/// What to do when a resolved decoder fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecodeFailurePolicy {
    /// Fail the whole call with [`CoerceError::DecodeFailure`](crate::CoerceError::DecodeFailure).
    #[default]
    Abort,
    /// Keep the undecoded string and record a warning.
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineOptions {
    pub decode_failure: DecodeFailurePolicy,
    /// Expand decode directives. When off, flagged strings are left as is.
    pub expand: bool,
    /// Bound on reference hops taken without descending into a value.
    pub max_reference_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            decode_failure: DecodeFailurePolicy::default(),
            expand: true,
            max_reference_depth: DEFAULT_REFERENCE_LIMIT,
        }
    }
}

impl EngineOptions {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    #[must_use]
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    #[must_use]
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::from_json_str("{}").unwrap();
        assert_eq!(options, EngineOptions::default());
        assert_eq!(options.decode_failure, DecodeFailurePolicy::Abort);
        assert!(options.expand);
        assert_eq!(options.max_reference_depth, 64);
    }

    #[test]
    fn test_camel_case_fields() {
        let options = EngineOptions::from_json_str(
            r#"{"decodeFailure": "warn", "expand": false, "maxReferenceDepth": 8}"#,
        )
        .unwrap();
        assert_eq!(
            options,
            EngineOptions::default()
                .with_decode_failure(DecodeFailurePolicy::Warn)
                .with_expand(false)
                .with_max_reference_depth(8)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineOptions::from_json_str(r#"{"strict": true}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `strict`"));
    }
}
