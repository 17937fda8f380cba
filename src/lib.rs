//! Enroll Bot — conversational student registration over Telegram.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod store;
pub mod validate;
