use strata::{Engine, Node};

use crate::scenarios::{ScenarioError, show};

/// Coercing an expected output again must leave it unchanged.
pub struct IdempotenceScenario<'a> {
    pub output: Node,
    pub type_name: Option<&'a str>,
}

impl IdempotenceScenario<'_> {
    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        let again = engine
            .coerce(&self.output, self.type_name)
            .await
            .map_err(|e| ScenarioError::CoercionFailed {
                message: e.to_string(),
            })?;
        if again != self.output {
            return Err(ScenarioError::OutputMismatch {
                expected: show(&self.output),
                actual: show(&again),
            });
        }
        Ok(())
    }
}
