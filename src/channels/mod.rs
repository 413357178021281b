//! Channel abstraction for message I/O.

pub mod cli;

pub use cli::CliChannel;

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::error::ChannelError;

/// A message arriving from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub channel: String,
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(channel: &str, sender: &str, content: &str) -> Self {
        Self {
            channel: channel.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
            received_at: Utc::now(),
        }
    }
}

/// A response to send back on a channel.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stream of incoming messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A bidirectional message channel.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for identification.
    fn name(&self) -> &str;

    /// Start the channel, returning its stream of incoming messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a response for a previously received message.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Shut the channel down.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_message_fields() {
        let msg = IncomingMessage::new("cli", "local-user", "hello");
        assert_eq!(msg.channel, "cli");
        assert_eq!(msg.sender, "local-user");
        assert_eq!(msg.content, "hello");
    }
}
