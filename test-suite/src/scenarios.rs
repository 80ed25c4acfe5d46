use strata::{Engine, Node};

pub mod coercion;
pub mod coercion_error;
pub mod idempotence;
pub mod validity;
pub mod warnings;

pub use coercion::CoercionScenario;
pub use coercion_error::CoercionErrorScenario;
pub use idempotence::IdempotenceScenario;
pub use validity::ValidityScenario;
pub use warnings::WarningsScenario;

/// A runnable scenario of a test case.
pub enum Scenario<'a> {
    Coercion(CoercionScenario<'a>),
    Idempotence(IdempotenceScenario<'a>),
    CoercionError(CoercionErrorScenario<'a>),
    Warnings(WarningsScenario<'a>),
    Validity(ValidityScenario<'a>),
}

impl Scenario<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Coercion(_) => "coercion",
            Scenario::Idempotence(_) => "idempotence",
            Scenario::CoercionError(_) => "coercion_error",
            Scenario::Warnings(_) => "warnings",
            Scenario::Validity(_) => "validity",
        }
    }

    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        match self {
            Scenario::Coercion(s) => s.run(engine).await,
            Scenario::Idempotence(s) => s.run(engine).await,
            Scenario::CoercionError(s) => s.run(engine).await,
            Scenario::Warnings(s) => s.run(engine).await,
            Scenario::Validity(s) => s.run(engine).await,
        }
    }
}

/// Error type for scenario execution failures.
#[derive(Debug, Clone)]
pub enum ScenarioError {
    /// Coercion failed where it was expected to succeed
    CoercionFailed { message: String },
    /// Coercion succeeded with a different tree
    OutputMismatch { expected: String, actual: String },
    /// Coercion succeeded where it was expected to fail
    ExpectedCoercionToFail { expected_error: String, actual: String },
    /// Coercion failed, but not with the expected error
    ErrorMismatch { expected_error: String, actual: String },
    WarningsMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    ValidityMismatch { expected: bool },
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::CoercionFailed { message } => {
                write!(f, "Coercion failed: {message}")
            }
            ScenarioError::OutputMismatch { expected, actual } => {
                write!(f, "Output mismatch.\nExpected:\n{expected}\nActual:\n{actual}")
            }
            ScenarioError::ExpectedCoercionToFail {
                expected_error,
                actual,
            } => write!(
                f,
                "Expected coercion to fail with '{expected_error}', but it produced:\n{actual}"
            ),
            ScenarioError::ErrorMismatch {
                expected_error,
                actual,
            } => write!(
                f,
                "Expected error containing '{expected_error}', got: {actual}"
            ),
            ScenarioError::WarningsMismatch { expected, actual } => {
                writeln!(f, "Warnings mismatch.")?;
                writeln!(f, "Expected:")?;
                for warning in expected {
                    writeln!(f, "  {warning}")?;
                }
                writeln!(f, "Actual:")?;
                for warning in actual {
                    writeln!(f, "  {warning}")?;
                }
                Ok(())
            }
            ScenarioError::ValidityMismatch { expected } => {
                write!(f, "Expected the input to be {}", if *expected { "valid" } else { "invalid" })
            }
        }
    }
}

/// Pretty JSON for mismatch messages.
pub(crate) fn show(node: &Node) -> String {
    match node.to_json() {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| format!("{node:?}")),
        Err(_) => format!("{node:?}"),
    }
}
