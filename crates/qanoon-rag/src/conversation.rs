//! Chat history: role-tagged messages and their persistence
//!
//! A conversation is append-only. The only way to remove messages is to clear
//! the whole history.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ASSISTANT" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered message sequence; serialized as a bare JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of messages sent by `role`, in order
    pub fn contents_by(&self, role: Role) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Where the request layer keeps the conversation between turns.
/// Callers serialize access; the last writer wins.
pub trait ConversationStore: Send + Sync {
    /// Stored conversation, or an empty one when nothing has been saved yet
    fn load(&self) -> Result<Conversation>;

    fn save(&self, conversation: &Conversation) -> Result<()>;

    fn append(&self, role: Role, content: &str) -> Result<()> {
        let mut conversation = self.load()?;
        conversation.push(role, content);
        self.save(&conversation)
    }

    /// Discard the entire history
    fn clear(&self) -> Result<()>;
}

/// One JSON array of `{role, content, timestamp}` records in a file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path a corrupt history is moved to: `<name>.corrupt-<timestamp>`
    fn quarantine_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chat_history.json".to_string());
        self.path.with_file_name(format!(
            "{}.corrupt-{}",
            name,
            Utc::now().format("%Y%m%d%H%M%S%3f")
        ))
    }
}

impl ConversationStore for JsonFileStore {
    /// A file that cannot be parsed is moved aside and the history starts
    /// empty. Read failures are returned, so nothing is overwritten blind.
    fn load(&self) -> Result<Conversation> {
        if !self.path.exists() {
            return Ok(Conversation::new());
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Conversation::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(conversation) => Ok(conversation),
            Err(e) => {
                let quarantine = self.quarantine_path();
                std::fs::rename(&self.path, &quarantine)?;
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %quarantine.display(),
                    error = %e,
                    "Corrupt chat history moved aside, starting fresh"
                );
                Ok(Conversation::new())
            }
        }
    }

    fn save(&self, conversation: &Conversation) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(conversation)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), messages = conversation.len(), "Saved chat history");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store for embedding hosts and tests
#[derive(Default)]
pub struct InMemoryStore {
    conversation: Mutex<Conversation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversation(conversation: Conversation) -> Self {
        Self {
            conversation: Mutex::new(conversation),
        }
    }
}

impl ConversationStore for InMemoryStore {
    fn load(&self) -> Result<Conversation> {
        Ok(self.conversation.lock().clone())
    }

    fn save(&self, conversation: &Conversation) -> Result<()> {
        *self.conversation.lock() = conversation.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.conversation.lock() = Conversation::new();
        Ok(())
    }
}
