pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod runtime;
pub mod state;
pub mod time;
pub mod utils;
pub mod writer;

pub use config::ReporterConfig;
pub use error::{ReporterError, Result};
pub use model::{
    Attachment, Category, EnvironmentInfo, Executable, FixtureResult, Label, Link, Parameter,
    Stage, Status, StatusDetails, StepResult, TestResult, TestResultContainer,
};
pub use notifier::LifecycleListener;
pub use runtime::{AttachmentOptions, AttachmentSource, ReporterRuntime, StepParent};
pub use state::FixtureType;
pub use utils::StopOptions;
pub use writer::{FileSystemWriter, InMemoryWriter, MessageWriter, Writer, WriterRegistry};
