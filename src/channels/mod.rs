//! Transport abstraction and the Telegram implementation.

pub mod telegram;
pub mod transport;

pub use telegram::TelegramTransport;
pub use transport::{
    InboundUpdate, Keyboard, OutboundMessage, ReplyButton, Transport, UpdateStream,
};
