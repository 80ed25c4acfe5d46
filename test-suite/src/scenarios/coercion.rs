use strata::{Engine, Node};

use crate::scenarios::{ScenarioError, show};

pub struct CoercionScenario<'a> {
    pub input: Node,
    pub type_name: Option<&'a str>,
    pub output: Node,
}

impl CoercionScenario<'_> {
    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        let before = self.input.clone();
        let result = engine.coerce(&self.input, self.type_name).await;
        assert_eq!(self.input, before, "coercion modified its input");
        let actual = result.map_err(|e| ScenarioError::CoercionFailed {
            message: e.to_string(),
        })?;
        if actual != self.output {
            return Err(ScenarioError::OutputMismatch {
                expected: show(&self.output),
                actual: show(&actual),
            });
        }
        if !engine.is_valid(&actual, self.type_name).await {
            return Err(ScenarioError::ValidityMismatch { expected: true });
        }
        Ok(())
    }
}
