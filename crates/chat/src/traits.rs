//! Gateway trait definition and shared error types.

use std::sync::Arc;

use crate::handler::MessageHandler;

/// Errors that can occur while running a chat gateway.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// One inbound chat line with its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
        }
    }
}

/// Trait for chat transport implementations.
#[async_trait::async_trait]
pub trait Gateway: Send {
    /// Receive lines until the transport closes, passing each to `handler`.
    async fn run(&mut self, handler: Arc<MessageHandler>) -> Result<(), ChatError>;

    /// Human-readable name for this gateway (e.g., "twitch", "console").
    fn name(&self) -> &str;
}
