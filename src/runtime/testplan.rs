// Test plan - externally supplied selection of tests to run

use crate::error::{ReporterError, Result};
use crate::model::{ALLURE_ID_LABEL, Label};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable pointing at the test plan JSON file
pub const ENV_ALLURE_TESTPLAN_PATH: &str = "ALLURE_TESTPLAN_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlanEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub tests: Vec<TestPlanEntry>,
}

impl TestPlan {
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ReporterError::InvalidTestPlan {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReporterError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// A test is selected when its full name matches a selector or its
    /// `ALLURE_ID` label matches an id. An empty plan selects everything.
    pub fn includes(&self, full_name: Option<&str>, labels: &[Label]) -> bool {
        if self.tests.is_empty() {
            return true;
        }

        let allure_id = labels
            .iter()
            .find(|label| label.name == ALLURE_ID_LABEL)
            .map(|label| label.value.as_str());

        self.tests.iter().any(|entry| {
            let by_selector = full_name.is_some() && entry.selector.as_deref() == full_name;
            let by_id = allure_id.is_some() && entry.id.as_deref() == allure_id;
            by_selector || by_id
        })
    }
}
