// Message relay - carry writes across a process boundary as JSON messages

use super::{
    CATEGORIES_FILE, ENVIRONMENT_INFO_FILE, InMemoryResults, Writer, container_file_name,
    result_file_name,
};
use crate::error::{ReporterError, Result};
use crate::model::{Category, EnvironmentInfo, TestResult, TestResultContainer};
use crate::utils::properties;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Result,
    Container,
    Attachment,
    /// Environment info or categories, told apart by `path`
    Misc,
}

/// One relayed write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterMessage {
    pub path: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Base64-encoded file content
    pub data: String,
}

impl WriterMessage {
    pub fn new(path: impl Into<String>, message_type: MessageType, content: &[u8]) -> Self {
        Self {
            path: path.into(),
            message_type,
            data: STANDARD.encode(content),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.data)?)
    }
}

type Callback = Arc<dyn Fn(WriterMessage) + Send + Sync>;

enum Bus {
    Callback(Callback),
    Channel(Sender<WriterMessage>),
    /// Newline-delimited JSON on stdout
    Stdout,
}

/// Writer that emits every write as a [`WriterMessage`] instead of touching disk
pub struct MessageWriter {
    bus: Bus,
}

impl MessageWriter {
    pub fn new(callback: impl Fn(WriterMessage) + Send + Sync + 'static) -> Self {
        Self {
            bus: Bus::Callback(Arc::new(callback)),
        }
    }

    pub fn channel() -> (Self, Receiver<WriterMessage>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                bus: Bus::Channel(sender),
            },
            receiver,
        )
    }

    pub fn stdout() -> Self {
        Self { bus: Bus::Stdout }
    }

    fn send(&self, path: &str, message_type: MessageType, content: &[u8]) -> Result<()> {
        let message = WriterMessage::new(path, message_type, content);
        match &self.bus {
            Bus::Callback(callback) => {
                callback(message);
                Ok(())
            }
            Bus::Channel(sender) => sender.send(message).map_err(|_| ReporterError::BusClosed),
            Bus::Stdout => {
                let line = serde_json::to_string(&message)?;
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", line)
                    .and_then(|_| stdout.flush())
                    .map_err(|e| ReporterError::io("<stdout>", e))
            }
        }
    }
}

impl fmt::Debug for MessageWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bus = match self.bus {
            Bus::Callback(_) => "callback",
            Bus::Channel(_) => "channel",
            Bus::Stdout => "stdout",
        };
        f.debug_struct("MessageWriter").field("bus", &bus).finish()
    }
}

impl Writer for MessageWriter {
    fn write_result(&self, result: &TestResult) -> Result<()> {
        let content = serde_json::to_vec(result)?;
        self.send(&result_file_name(&result.uuid), MessageType::Result, &content)
    }

    fn write_group(&self, container: &TestResultContainer) -> Result<()> {
        let content = serde_json::to_vec(container)?;
        self.send(
            &container_file_name(&container.uuid),
            MessageType::Container,
            &content,
        )
    }

    fn write_attachment(&self, file_name: &str, content: &[u8]) -> Result<()> {
        self.send(file_name, MessageType::Attachment, content)
    }

    fn write_attachment_from_path(&self, file_name: &str, path: &Path) -> Result<()> {
        let content = std::fs::read(path).map_err(|e| ReporterError::io(path, e))?;
        self.send(file_name, MessageType::Attachment, &content)
    }

    fn write_environment_info(&self, info: &EnvironmentInfo) -> Result<()> {
        let content = properties::stringify(info);
        self.send(ENVIRONMENT_INFO_FILE, MessageType::Misc, content.as_bytes())
    }

    fn write_categories_definitions(&self, categories: &[Category]) -> Result<()> {
        let content = serde_json::to_vec(categories)?;
        self.send(CATEGORIES_FILE, MessageType::Misc, &content)
    }
}

/// Perform the write a message describes against another writer
pub fn replay(message: &WriterMessage, writer: &dyn Writer) -> Result<()> {
    let content = message.decode()?;
    match message.message_type {
        MessageType::Result => writer.write_result(&serde_json::from_slice(&content)?),
        MessageType::Container => writer.write_group(&serde_json::from_slice(&content)?),
        MessageType::Attachment => writer.write_attachment(&message.path, &content),
        MessageType::Misc => match message.path.as_str() {
            ENVIRONMENT_INFO_FILE => {
                let info = properties::parse(&String::from_utf8_lossy(&content));
                writer.write_environment_info(&info)
            }
            CATEGORIES_FILE => {
                let categories: Vec<Category> = serde_json::from_slice(&content)?;
                writer.write_categories_definitions(&categories)
            }
            other => Err(ReporterError::UnsupportedMessage(other.to_string())),
        },
    }
}

/// Rebuilds the writes a [`MessageWriter`] relayed
#[derive(Debug, Default)]
pub struct MessageReader {
    results: InMemoryResults,
}

impl MessageReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_message(&mut self, message: &WriterMessage) -> Result<()> {
        let content = message.decode()?;
        match message.message_type {
            MessageType::Result => {
                let result: TestResult = serde_json::from_slice(&content)?;
                self.results.tests.push(result);
            }
            MessageType::Container => {
                let container: TestResultContainer = serde_json::from_slice(&content)?;
                self.results.groups.push(container);
            }
            MessageType::Attachment => {
                self.results
                    .attachments
                    .insert(message.path.clone(), content);
            }
            MessageType::Misc => match message.path.as_str() {
                ENVIRONMENT_INFO_FILE => {
                    let text = String::from_utf8_lossy(&content);
                    self.results.env_info = Some(properties::parse(&text));
                }
                CATEGORIES_FILE => {
                    let categories: Vec<Category> = serde_json::from_slice(&content)?;
                    self.results.categories = Some(categories);
                }
                other => return Err(ReporterError::UnsupportedMessage(other.to_string())),
            },
        }
        Ok(())
    }

    /// Handle one line of newline-delimited JSON. Blank lines are ignored.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let message: WriterMessage = serde_json::from_str(line)?;
        self.handle_message(&message)
    }

    pub fn results(&self) -> &InMemoryResults {
        &self.results
    }

    pub fn into_results(self) -> InMemoryResults {
        self.results
    }

    pub fn write_all(&self, writer: &dyn Writer) -> Result<()> {
        self.results.write_all(writer)
    }
}
