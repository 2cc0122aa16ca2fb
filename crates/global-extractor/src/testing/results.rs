//! The results file written by the test harness.
//!
//! ```json
//! { "speedfiles": "passed", "filemoon": "failed" }
//! ```

use crate::error::{self, BuildError, Result};
use crate::extraction::ProviderFilter;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

/// Outcome of one provider's test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    /// Only the literal string `"passed"` counts as a pass.
    fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("passed") => TestStatus::Passed,
            _ => TestStatus::Failed,
        }
    }

    pub fn is_passed(self) -> bool {
        self == TestStatus::Passed
    }
}

/// Provider → status, in the order the harness wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestResults {
    entries: Vec<(String, TestStatus)>,
}

impl TestResults {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(text)?;
        Ok(map
            .iter()
            .map(|(name, value)| (name.clone(), TestStatus::from_value(value)))
            .collect())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = error::read_to_string(path)?;
        Self::parse(&text).map_err(|source| BuildError::MalformedResults {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TestStatus)> {
        self.entries.iter().map(|(name, status)| (name.as_str(), *status))
    }

    pub fn passed_count(&self) -> usize {
        self.iter().filter(|(_, status)| status.is_passed()).count()
    }

    /// Allow-list of the providers that passed.
    pub fn passing(&self) -> ProviderFilter {
        self.iter()
            .filter(|(_, status)| status.is_passed())
            .map(|(name, _)| name)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, TestStatus)> for TestResults {
    fn from_iter<I: IntoIterator<Item = (S, TestStatus)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, status)| (name.into(), status))
                .collect(),
        }
    }
}

impl Serialize for TestResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
