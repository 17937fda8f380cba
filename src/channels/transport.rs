//! Transport boundary types — inbound updates and outbound messages.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::flow::event::{ButtonToken, FlowEvent};
use crate::store::UserId;

/// One normalized inbound update from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    /// Identity of the person (Profile and Session key).
    pub user_id: UserId,
    /// Where replies for this update go.
    pub chat_id: i64,
    /// The event itself.
    pub event: FlowEvent,
}

impl InboundUpdate {
    pub fn new(user_id: UserId, chat_id: i64, event: FlowEvent) -> Self {
        Self {
            user_id,
            chat_id,
            event,
        }
    }
}

/// A button on a reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub label: String,
    /// Ask the client to share the user's phone number.
    pub request_contact: bool,
}

impl ReplyButton {
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request_contact: false,
        }
    }

    pub fn contact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request_contact: true,
        }
    }
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Inline buttons; each press comes back as a `ButtonToken`.
    Inline(Vec<Vec<(String, ButtonToken)>>),
    /// Persistent reply keyboard.
    Reply {
        rows: Vec<Vec<ReplyButton>>,
        one_time: bool,
    },
    /// Remove any previous reply keyboard.
    Remove,
}

/// One outbound prompt or notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Stream of inbound updates produced by a transport.
pub type UpdateStream = Pin<Box<dyn Stream<Item = InboundUpdate> + Send>>;

/// A chat transport the dispatcher can receive from and send through.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Start receiving; returns the inbound update stream.
    async fn start(&self) -> Result<UpdateStream, ChannelError>;

    /// Send one outbound message.
    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError>;

    /// Verify the transport is reachable.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Graceful shutdown.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}
