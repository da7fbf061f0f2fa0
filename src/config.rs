// Configuration file handling

use crate::error::{ReporterError, Result};
use crate::model::{Category, EnvironmentInfo};
use crate::utils::LinkTemplateConfig;
use crate::writer::WriterDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".allurerc.toml";
pub const ENV_ALLURE_RESULTS_DIR: &str = "ALLURE_RESULTS_DIR";
pub use crate::runtime::testplan::ENV_ALLURE_TESTPLAN_PATH;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Directory receiving result files when no writer is given
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Writer descriptor: `"InMemoryWriter"` or `["FileSystemWriter", "dir"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<WriterDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_info: Option<EnvironmentInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    /// Link type → templates
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, LinkTemplateConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testplan_path: Option<PathBuf>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            writer: None,
            environment_info: None,
            categories: None,
            links: HashMap::new(),
            testplan_path: None,
        }
    }
}

pub fn default_results_dir() -> PathBuf {
    PathBuf::from("allure-results")
}

impl ReporterConfig {
    /// Load configuration from default locations, then apply environment overrides.
    /// Returns `Ok(None)` when no configuration file exists.
    pub fn load() -> Result<Option<Self>> {
        // Check locations in order:
        // 1. .allurerc.toml (current directory)
        // 2. ~/.allurerc.toml (home directory)
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        for path in &paths {
            if path.exists() {
                let mut config = Self::load_from_file(path)?;
                config.apply_env();
                return Ok(Some(config));
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReporterError::io(path, e))?;
        Self::parse(&content).map_err(|e| ReporterError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Defaults plus environment overrides, for runs without a file
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var_os(ENV_ALLURE_RESULTS_DIR).map(PathBuf::from),
            std::env::var_os(ENV_ALLURE_TESTPLAN_PATH).map(PathBuf::from),
        );
    }

    fn apply_overrides(&mut self, results_dir: Option<PathBuf>, testplan_path: Option<PathBuf>) {
        if let Some(dir) = results_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.results_dir = dir;
        }
        if let Some(path) = testplan_path.filter(|path| !path.as_os_str().is_empty()) {
            self.testplan_path = Some(path);
        }
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
