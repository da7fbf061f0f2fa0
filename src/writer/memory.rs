// In-memory writer - collects everything for tests and in-process aggregation

use super::Writer;
use crate::error::{ReporterError, Result};
use crate::model::{Category, EnvironmentInfo, TestResult, TestResultContainer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything a writer has received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryResults {
    pub tests: Vec<TestResult>,
    pub groups: Vec<TestResultContainer>,
    pub attachments: HashMap<String, Vec<u8>>,
    pub env_info: Option<EnvironmentInfo>,
    pub categories: Option<Vec<Category>>,
}

impl InMemoryResults {
    pub fn find_test(&self, uuid: &str) -> Option<&TestResult> {
        self.tests.iter().find(|test| test.uuid == uuid)
    }

    /// Replay the collected writes into another writer
    pub fn write_all(&self, writer: &dyn Writer) -> Result<()> {
        for test in &self.tests {
            writer.write_result(test)?;
        }
        for group in &self.groups {
            writer.write_group(group)?;
        }
        for (file_name, content) in &self.attachments {
            writer.write_attachment(file_name, content)?;
        }
        if let Some(info) = &self.env_info {
            writer.write_environment_info(info)?;
        }
        if let Some(categories) = &self.categories {
            writer.write_categories_definitions(categories)?;
        }
        Ok(())
    }
}

/// Cloning shares the same underlying storage, so a handle kept by the caller
/// sees what the runtime writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWriter {
    inner: Arc<Mutex<InMemoryResults>>,
}

impl InMemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    // Writes are append-only, so data behind a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, InMemoryResults> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of everything written so far
    pub fn results(&self) -> InMemoryResults {
        self.lock().clone()
    }

    pub fn tests(&self) -> Vec<TestResult> {
        self.lock().tests.clone()
    }

    pub fn groups(&self) -> Vec<TestResultContainer> {
        self.lock().groups.clone()
    }

    pub fn attachment(&self, file_name: &str) -> Option<Vec<u8>> {
        self.lock().attachments.get(file_name).cloned()
    }
}

impl Writer for InMemoryWriter {
    fn write_result(&self, result: &TestResult) -> Result<()> {
        self.lock().tests.push(result.clone());
        Ok(())
    }

    fn write_group(&self, container: &TestResultContainer) -> Result<()> {
        self.lock().groups.push(container.clone());
        Ok(())
    }

    fn write_attachment(&self, file_name: &str, content: &[u8]) -> Result<()> {
        self.lock()
            .attachments
            .insert(file_name.to_string(), content.to_vec());
        Ok(())
    }

    fn write_attachment_from_path(&self, file_name: &str, path: &Path) -> Result<()> {
        let content = std::fs::read(path).map_err(|e| ReporterError::io(path, e))?;
        self.write_attachment(file_name, &content)
    }

    fn write_environment_info(&self, info: &EnvironmentInfo) -> Result<()> {
        self.lock().env_info = Some(info.clone());
        Ok(())
    }

    fn write_categories_definitions(&self, categories: &[Category]) -> Result<()> {
        self.lock().categories = Some(categories.to_vec());
        Ok(())
    }
}
