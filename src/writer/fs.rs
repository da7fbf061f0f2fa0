// Filesystem writer - the standard results directory layout

use super::{
    CATEGORIES_FILE, ENVIRONMENT_INFO_FILE, Writer, container_file_name, result_file_name,
};
use crate::error::{ReporterError, Result};
use crate::model::{Category, EnvironmentInfo, TestResult, TestResultContainer};
use crate::utils::properties;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `<uuid>-result.json`, `<uuid>-container.json`, attachments,
/// `environment.properties` and `categories.json` into one directory.
#[derive(Debug, Clone)]
pub struct FileSystemWriter {
    results_dir: PathBuf,
}

impl FileSystemWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    // Cleanup tooling may remove the directory mid-run, so check before every write.
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.results_dir).map_err(|e| ReporterError::io(&self.results_dir, e))
    }

    fn write_bytes(&self, file_name: &str, content: &[u8]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.results_dir.join(file_name);
        fs::write(&path, content).map_err(|e| ReporterError::io(&path, e))
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        let content = serde_json::to_vec(value)?;
        self.write_bytes(file_name, &content)
    }
}

impl Writer for FileSystemWriter {
    fn write_result(&self, result: &TestResult) -> Result<()> {
        self.write_json(&result_file_name(&result.uuid), result)
    }

    fn write_group(&self, container: &TestResultContainer) -> Result<()> {
        self.write_json(&container_file_name(&container.uuid), container)
    }

    fn write_attachment(&self, file_name: &str, content: &[u8]) -> Result<()> {
        self.write_bytes(file_name, content)
    }

    fn write_attachment_from_path(&self, file_name: &str, path: &Path) -> Result<()> {
        self.ensure_dir()?;
        let target = self.results_dir.join(file_name);
        fs::copy(path, &target).map_err(|e| ReporterError::io(path, e))?;
        Ok(())
    }

    fn write_environment_info(&self, info: &EnvironmentInfo) -> Result<()> {
        self.write_bytes(ENVIRONMENT_INFO_FILE, properties::stringify(info).as_bytes())
    }

    fn write_categories_definitions(&self, categories: &[Category]) -> Result<()> {
        self.write_json(CATEGORIES_FILE, &categories)
    }
}
