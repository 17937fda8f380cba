//! The conversation state machine.
//!
//! `handle` is a pure, synchronous transition function: given the current
//! session and one event it decides the replies to emit and what happens to
//! the session. It never touches the store or the transport — commits and
//! patches are returned as instructions for the dispatcher to execute, so
//! every transition is deterministic and directly testable.
//!
//! Any event other than the one expected in the current step is ignored
//! without mutating the session. This covers duplicate taps, duplicate
//! message deliveries, and stale keyboards firing after the prompt moved on.

use crate::channels::transport::Keyboard;
use crate::validate;

use super::event::{ButtonToken, FlowEvent};
use super::fields::ProfileField;
use super::prompts;
use super::session::{EditStep, PendingProfile, RegStep, Session};

/// One outbound reply, not yet addressed to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// What happens to the session after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Session unchanged (self-loop or ignored event).
    Stay,
    /// Session moves to a new step.
    Replace(Session),
    /// Flow over; destroy the session. No store effect.
    End,
    /// All fields confirmed; the dispatcher must insert the profile and
    /// then destroy the session.
    CommitAndEnd(PendingProfile),
    /// Edit confirmed; the dispatcher must patch one field and then
    /// destroy the session.
    PatchAndEnd(ProfileField, String),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub replies: Vec<Reply>,
    pub update: SessionUpdate,
}

impl Step {
    fn ignore() -> Self {
        Self {
            replies: Vec::new(),
            update: SessionUpdate::Stay,
        }
    }

    fn stay(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            update: SessionUpdate::Stay,
        }
    }
}

/// Apply one event to a session.
///
/// `Entry` and `EditEntry` are session-lifecycle events owned by the
/// dispatcher; if one reaches the machine it is ignored.
pub fn handle(session: &Session, event: &FlowEvent) -> Step {
    // Cancel is accepted in every non-terminal state of either flow.
    if matches!(event, FlowEvent::Cancel) {
        return Step {
            replies: Vec::new(),
            update: SessionUpdate::End,
        };
    }

    match session {
        Session::Registration { step, pending } => handle_registration(*step, pending, event),
        Session::Edit { step } => handle_edit(*step, event),
    }
}

/// Extract the submitted value for a collect-style step, if the event
/// carries one. Contact payloads are only meaningful for the phone field
/// and are normalized before validation.
fn submitted_value(field: ProfileField, event: &FlowEvent) -> Option<String> {
    match event {
        FlowEvent::Text(text) => Some(text.clone()),
        FlowEvent::Contact(number) if field == ProfileField::Phone => {
            Some(validate::normalize_contact_phone(number))
        }
        _ => None,
    }
}

/// The collection prompt for a field, with its keyboard if any.
pub(crate) fn ask(field: ProfileField) -> Reply {
    let reply = Reply::new(field.prompt());
    match field.prompt_keyboard() {
        Some(keyboard) => reply.with_keyboard(keyboard),
        None => reply,
    }
}

fn handle_registration(step: RegStep, pending: &PendingProfile, event: &FlowEvent) -> Step {
    match step {
        RegStep::Collect(field) => {
            let Some(value) = submitted_value(field, event) else {
                return Step::ignore();
            };
            if !field.is_valid(&value) {
                // Self-loop: discard the rejected value, re-prompt in place.
                return Step::stay(Reply::new(field.error_prompt()));
            }
            let mut pending = pending.clone();
            pending.set(field, value.clone());
            Step {
                replies: vec![
                    Reply::new(prompts::confirm_prompt(field, &value))
                        .with_keyboard(prompts::confirm_keyboard(field)),
                ],
                update: SessionUpdate::Replace(Session::Registration {
                    step: RegStep::Confirm(field),
                    pending,
                }),
            }
        }
        RegStep::Confirm(field) => match event {
            FlowEvent::Button(ButtonToken::Confirm(pressed)) if *pressed == field => {
                match field.next() {
                    Some(next) => Step {
                        replies: vec![ask(next)],
                        update: SessionUpdate::Replace(Session::Registration {
                            step: RegStep::Collect(next),
                            pending: pending.clone(),
                        }),
                    },
                    // Last field confirmed — hand the full pending set to
                    // the dispatcher for the one-time commit.
                    None => Step {
                        replies: Vec::new(),
                        update: SessionUpdate::CommitAndEnd(pending.clone()),
                    },
                }
            }
            FlowEvent::Button(ButtonToken::Retry(pressed)) if *pressed == field => {
                let mut pending = pending.clone();
                pending.clear(field);
                Step {
                    replies: vec![ask(field)],
                    update: SessionUpdate::Replace(Session::Registration {
                        step: RegStep::Collect(field),
                        pending,
                    }),
                }
            }
            _ => Step::ignore(),
        },
    }
}

fn handle_edit(step: EditStep, event: &FlowEvent) -> Step {
    match step {
        EditStep::ChooseField => match event {
            FlowEvent::Button(ButtonToken::EditField(field)) => {
                let mut reply = Reply::new(prompts::edit_value_prompt(*field));
                if let Some(keyboard) = field.prompt_keyboard() {
                    reply = reply.with_keyboard(keyboard);
                }
                Step {
                    replies: vec![reply],
                    update: SessionUpdate::Replace(Session::Edit {
                        step: EditStep::EnterValue(*field),
                    }),
                }
            }
            FlowEvent::Button(ButtonToken::CancelEdit) => Step {
                replies: vec![
                    Reply::new(prompts::EDIT_CANCELLED).with_keyboard(prompts::main_menu()),
                ],
                update: SessionUpdate::End,
            },
            _ => Step::ignore(),
        },
        EditStep::EnterValue(field) => {
            let Some(value) = submitted_value(field, event) else {
                return Step::ignore();
            };
            if !field.is_valid(&value) {
                return Step::stay(Reply::new(field.error_prompt()));
            }
            Step {
                replies: Vec::new(),
                update: SessionUpdate::PatchAndEnd(field, value),
            }
        }
    }
}
