// Writer registry - resolve writers from names and descriptors

use super::{FileSystemWriter, InMemoryWriter, MessageWriter, Writer};
use crate::error::{ReporterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Builds a writer from the arguments that follow its name in a descriptor
pub type WriterConstructor = Box<dyn Fn(&[Value]) -> Result<Box<dyn Writer>> + Send + Sync>;

/// Declarative writer choice: `"InMemoryWriter"` or `["FileSystemWriter", "out"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WriterDescriptor {
    Name(String),
    WithArgs(Vec<Value>),
}

impl WriterDescriptor {
    pub fn file_system(results_dir: impl Into<String>) -> Self {
        Self::WithArgs(vec![
            Value::String("FileSystemWriter".to_string()),
            Value::String(results_dir.into()),
        ])
    }
}

/// Either a ready writer or a descriptor to resolve
pub enum WriterSource {
    Instance(Box<dyn Writer>),
    Descriptor(WriterDescriptor),
}

impl From<WriterDescriptor> for WriterSource {
    fn from(descriptor: WriterDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<Box<dyn Writer>> for WriterSource {
    fn from(writer: Box<dyn Writer>) -> Self {
        Self::Instance(writer)
    }
}

impl From<&str> for WriterSource {
    fn from(name: &str) -> Self {
        Self::Descriptor(WriterDescriptor::Name(name.to_string()))
    }
}

/// Name → constructor map for writers, seeded with the built-in ones
pub struct WriterRegistry {
    constructors: HashMap<String, WriterConstructor>,
}

impl WriterRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    fn register_defaults(&mut self) {
        self.register("FileSystemWriter", |args| {
            let results_dir = results_dir_arg(args).ok_or_else(|| ReporterError::InvalidWriterArgs {
                name: "FileSystemWriter".to_string(),
                reason: "expected a results directory string or {\"resultsDir\": ...}".to_string(),
            })?;
            Ok(Box::new(FileSystemWriter::new(results_dir)))
        });
        self.register("InMemoryWriter", |_| Ok(Box::new(InMemoryWriter::new())));
        self.register("MessageWriter", |_| Ok(Box::new(MessageWriter::stdout())));
    }

    /// Add or replace a constructor
    pub fn register(
        &mut self,
        name: &str,
        constructor: impl Fn(&[Value]) -> Result<Box<dyn Writer>> + Send + Sync + 'static,
    ) {
        self.constructors
            .insert(name.to_string(), Box::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create(&self, name: &str, args: &[Value]) -> Result<Box<dyn Writer>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ReporterError::UnknownWriter(name.to_string()))?;
        constructor(args)
    }

    pub fn resolve(&self, source: WriterSource) -> Result<Box<dyn Writer>> {
        match source {
            WriterSource::Instance(writer) => Ok(writer),
            WriterSource::Descriptor(descriptor) => self.resolve_descriptor(&descriptor),
        }
    }

    pub fn resolve_descriptor(&self, descriptor: &WriterDescriptor) -> Result<Box<dyn Writer>> {
        match descriptor {
            WriterDescriptor::Name(name) => self.create(name, &[]),
            WriterDescriptor::WithArgs(values) => match values.split_first() {
                Some((Value::String(name), args)) => self.create(name, args),
                _ => Err(ReporterError::InvalidWriterArgs {
                    name: "<unnamed>".to_string(),
                    reason: "descriptor must start with a writer name".to_string(),
                }),
            },
        }
    }
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WriterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterRegistry")
            .field("writers", &self.names())
            .finish()
    }
}

fn results_dir_arg(args: &[Value]) -> Option<String> {
    match args.first()? {
        Value::String(dir) => Some(dir.clone()),
        Value::Object(options) => options
            .get("resultsDir")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
