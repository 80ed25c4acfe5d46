use strata::{Engine, Node};

use crate::scenarios::ScenarioError;

pub struct WarningsScenario<'a> {
    pub input: Node,
    pub type_name: Option<&'a str>,
    pub warnings: &'a [String],
}

impl WarningsScenario<'_> {
    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        let coercion = engine
            .coerce_with_report(&self.input, self.type_name)
            .await
            .map_err(|e| ScenarioError::CoercionFailed {
                message: e.to_string(),
            })?;
        let actual: Vec<String> = coercion.warnings.iter().map(ToString::to_string).collect();
        if actual != self.warnings {
            return Err(ScenarioError::WarningsMismatch {
                expected: self.warnings.to_vec(),
                actual,
            });
        }
        Ok(())
    }
}
