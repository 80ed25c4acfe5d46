use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use strata::{DecodeError, Decoders, Engine, EngineOptions, Node};

use crate::scenarios::{
    CoercionErrorScenario, CoercionScenario, IdempotenceScenario, Scenario, ValidityScenario,
    WarningsScenario,
};

/// A test case file.
///
/// Every expectation present in the file becomes one scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CaseFile {
    #[serde(default)]
    pub description: Option<String>,
    /// Target type; the input's discriminator when absent.
    #[serde(default)]
    pub type_name: Option<String>,
    pub input: serde_json::Value,
    /// Expected result of coercing `input`.
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Text the coercion error must contain.
    #[serde(default)]
    pub error: Option<String>,
    /// Expected warnings, as displayed.
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    /// Expected validity of `input` as given.
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub options: Option<EngineOptions>,
    #[serde(default)]
    pub decoders: BTreeMap<String, FixedDecoder>,
}

/// A decoder that ignores its content and always gives the same answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixedDecoder {
    Output(serde_json::Value),
    Error(String),
}

pub struct Case {
    pub path: PathBuf,
    pub file: CaseFile,
}

impl Case {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read test file: {}", path.display()))?;
        let file = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse test case: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// A fresh engine over the built-in schemas, configured for this case.
    pub fn engine(&self) -> Engine {
        let mut decoders = Decoders::new();
        for (format, decoder) in &self.file.decoders {
            match decoder {
                FixedDecoder::Output(value) => {
                    let node = Node::from(value.clone());
                    decoders.register(format, move |_: &str| -> Result<Node, DecodeError> {
                        Ok(node.clone())
                    });
                }
                FixedDecoder::Error(message) => {
                    let message = message.clone();
                    decoders.register(format, move |_: &str| -> Result<Node, DecodeError> {
                        Err(DecodeError::new(message.clone()))
                    });
                }
            }
        }
        Engine::builtin()
            .with_decoders(decoders)
            .with_options(self.file.options.clone().unwrap_or_default())
    }

    /// Returns all scenarios that this case will run.
    pub fn scenarios(&self) -> Vec<Scenario<'_>> {
        let file = &self.file;
        let input = Node::from(file.input.clone());
        let type_name = file.type_name.as_deref();
        let mut scenarios = Vec::new();

        if let Some(output) = &file.output {
            let output = Node::from(output.clone());
            scenarios.push(Scenario::Coercion(CoercionScenario {
                input: input.clone(),
                type_name,
                output: output.clone(),
            }));
            scenarios.push(Scenario::Idempotence(IdempotenceScenario { output, type_name }));
        }
        if let Some(error) = &file.error {
            scenarios.push(Scenario::CoercionError(CoercionErrorScenario {
                input: input.clone(),
                type_name,
                error,
            }));
        }
        if let Some(warnings) = &file.warnings {
            scenarios.push(Scenario::Warnings(WarningsScenario {
                input: input.clone(),
                type_name,
                warnings,
            }));
        }
        if let Some(valid) = file.valid {
            scenarios.push(Scenario::Validity(ValidityScenario {
                input,
                type_name,
                valid,
            }));
        }
        scenarios
    }
}
