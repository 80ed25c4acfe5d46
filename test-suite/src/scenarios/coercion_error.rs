use strata::{Engine, Node};

use crate::scenarios::{ScenarioError, show};

pub struct CoercionErrorScenario<'a> {
    pub input: Node,
    pub type_name: Option<&'a str>,
    pub error: &'a str,
}

impl CoercionErrorScenario<'_> {
    pub async fn run(&self, engine: &Engine) -> Result<(), ScenarioError> {
        match engine.coerce(&self.input, self.type_name).await {
            Ok(node) => Err(ScenarioError::ExpectedCoercionToFail {
                expected_error: self.error.to_string(),
                actual: show(&node),
            }),
            Err(e) if e.to_string().contains(self.error) => Ok(()),
            Err(e) => Err(ScenarioError::ErrorMismatch {
                expected_error: self.error.to_string(),
                actual: e.to_string(),
            }),
        }
    }
}
