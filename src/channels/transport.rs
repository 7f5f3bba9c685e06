//! Transport-facing types — inbound events and the outbound effect trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::dialog::Reply;
use crate::error::ChannelError;
use crate::models::User;

/// One inbound chat event, tagged with its chat id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub chat_id: i64,
    pub user: User,
    pub kind: EventKind,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A slash command, e.g. `/start` or `/export all`.
    Command(String),
    /// Free text.
    Text(String),
    /// An inline-keyboard button press. `id` must be acknowledged back
    /// to the transport.
    Callback { id: String, data: String },
}

/// A pinned boxed stream of inbound events.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Outbound effects the dispatch layer can request.
///
/// The bot logic only ever talks to this trait, so tests run against a
/// recording double instead of the Bot API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a prompt: text plus an optional inline keyboard.
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), ChannelError>;

    /// Send a file (CSV export).
    async fn send_document(
        &self,
        chat_id: i64,
        bytes: Vec<u8>,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<(), ChannelError>;

    /// Acknowledge a callback query so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChannelError>;
}
