//! Conversation flows — events, steps, and the transition function.

pub mod event;
pub mod fields;
pub mod machine;
pub mod prompts;
pub mod session;

pub use event::{ButtonToken, FlowEvent};
pub use fields::ProfileField;
pub use machine::{Reply, SessionUpdate, Step};
pub use session::{EditStep, PendingProfile, RegStep, Session};
