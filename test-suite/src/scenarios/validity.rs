use strata::{Engine, Node};

use crate::scenarios::ScenarioError;

pub struct ValidityScenario<'a> {
    pub input: Node,
    pub type_name: Option<&'a str>,
    pub valid: bool,
}

impl ValidityScenario<'_> {
    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        if engine.is_valid(&self.input, self.type_name).await != self.valid {
            return Err(ScenarioError::ValidityMismatch {
                expected: self.valid,
            });
        }
        Ok(())
    }
}
