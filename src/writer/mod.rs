// Writer module - pluggable sinks for finished results

pub mod fs;
pub mod memory;
pub mod message;
pub mod registry;

pub use fs::FileSystemWriter;
pub use memory::{InMemoryResults, InMemoryWriter};
pub use message::{MessageReader, MessageType, MessageWriter, WriterMessage, replay};
pub use registry::{WriterDescriptor, WriterRegistry, WriterSource};

use crate::error::Result;
use crate::model::{Category, EnvironmentInfo, TestResult, TestResultContainer};
use std::path::Path;

pub const ENVIRONMENT_INFO_FILE: &str = "environment.properties";
pub const CATEGORIES_FILE: &str = "categories.json";

pub fn result_file_name(uuid: &str) -> String {
    format!("{}-result.json", uuid)
}

pub fn container_file_name(uuid: &str) -> String {
    format!("{}-container.json", uuid)
}

/// Destination of everything the runtime persists
pub trait Writer: Send + Sync {
    fn write_result(&self, result: &TestResult) -> Result<()>;

    fn write_group(&self, container: &TestResultContainer) -> Result<()>;

    fn write_attachment(&self, file_name: &str, content: &[u8]) -> Result<()>;

    fn write_attachment_from_path(&self, file_name: &str, path: &Path) -> Result<()>;

    fn write_environment_info(&self, info: &EnvironmentInfo) -> Result<()>;

    fn write_categories_definitions(&self, categories: &[Category]) -> Result<()>;
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    fn write_result(&self, result: &TestResult) -> Result<()> {
        (**self).write_result(result)
    }

    fn write_group(&self, container: &TestResultContainer) -> Result<()> {
        (**self).write_group(container)
    }

    fn write_attachment(&self, file_name: &str, content: &[u8]) -> Result<()> {
        (**self).write_attachment(file_name, content)
    }

    fn write_attachment_from_path(&self, file_name: &str, path: &Path) -> Result<()> {
        (**self).write_attachment_from_path(file_name, path)
    }

    fn write_environment_info(&self, info: &EnvironmentInfo) -> Result<()> {
        (**self).write_environment_info(info)
    }

    fn write_categories_definitions(&self, categories: &[Category]) -> Result<()> {
        (**self).write_categories_definitions(categories)
    }
}
