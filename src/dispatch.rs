//! Dialogue driver — owns per-identity sessions and routes events through
//! the state machine.
//!
//! Guarantees: at most one session per identity, and events for one
//! identity are handled strictly one at a time (each identity has its own
//! async mutex, held for the whole event). Different identities proceed in
//! parallel. All side effects — prompts and store calls — happen as direct
//! consequences of a machine transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::channels::transport::{InboundUpdate, OutboundMessage};
use crate::error::FlowError;
use crate::flow::event::FlowEvent;
use crate::flow::fields::ProfileField;
use crate::flow::machine::{self, Reply, SessionUpdate, Step};
use crate::flow::prompts;
use crate::flow::session::{PendingProfile, Session};
use crate::store::{ProfileStore, UserId};

type Slot = Arc<tokio::sync::Mutex<Option<Session>>>;

/// Live sessions keyed by identity.
///
/// The outer std mutex only guards the map itself and is never held across
/// an await; the per-identity slot mutex serializes event handling.
#[derive(Default)]
pub struct SessionMap {
    inner: Mutex<HashMap<UserId, Slot>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic get-or-create of the per-identity slot.
    fn slot(&self, user_id: UserId) -> Slot {
        let mut map = self.inner.lock().expect("session map poisoned");
        Arc::clone(map.entry(user_id).or_default())
    }

    /// Drop the map entry once no session remains and no other task holds
    /// the slot. The caller still holds the slot's guard, and creating a
    /// new reference requires the map lock held here, so a positive check
    /// cannot race with a new waiter.
    fn release_if_idle(&self, user_id: UserId, slot: &Slot) {
        let mut map = self.inner.lock().expect("session map poisoned");
        // One reference in the map, one held by the caller.
        if Arc::strong_count(slot) == 2 {
            map.remove(&user_id);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Routes inbound events into the state machine and turns transitions into
/// outbound messages and store effects.
pub struct Dispatcher {
    store: Arc<dyn ProfileStore>,
    sessions: SessionMap,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            sessions: SessionMap::new(),
        }
    }

    /// Map commands and menu-button texts to lifecycle events.
    fn normalize(event: FlowEvent) -> FlowEvent {
        match event {
            FlowEvent::Text(text) => match text.trim() {
                "/start" => FlowEvent::Entry,
                "/cancel" => FlowEvent::Cancel,
                t if t == prompts::MENU_EDIT => FlowEvent::EditEntry,
                t if t == prompts::MENU_RESET => FlowEvent::Cancel,
                _ => FlowEvent::Text(text),
            },
            other => other,
        }
    }

    /// Handle one inbound update; returns the messages to emit, in order.
    pub async fn handle(&self, update: InboundUpdate) -> Vec<OutboundMessage> {
        let InboundUpdate {
            user_id,
            chat_id,
            event,
        } = update;
        let event = Self::normalize(event);

        let slot = self.sessions.slot(user_id);
        let mut guard = slot.lock().await;

        let replies = match &event {
            FlowEvent::Entry => self.on_entry(user_id, &mut guard).await,
            FlowEvent::Cancel => self.on_cancel(user_id, &mut guard).await,
            FlowEvent::EditEntry if guard.is_none() => {
                self.on_edit_entry(user_id, &mut guard).await
            }
            _ => match guard.as_ref() {
                Some(session) => {
                    let step = machine::handle(session, &event);
                    self.apply(user_id, &mut guard, step).await
                }
                None => {
                    debug!(user_id, "Ignoring event outside any flow");
                    Vec::new()
                }
            },
        };

        if guard.is_none() {
            self.sessions.release_if_idle(user_id, &slot);
        }
        drop(guard);

        replies
            .into_iter()
            .map(|reply| {
                let mut msg = OutboundMessage::new(chat_id, reply.text);
                msg.keyboard = reply.keyboard;
                msg
            })
            .collect()
    }

    /// Execute a machine transition's session update and store effects.
    async fn apply(
        &self,
        user_id: UserId,
        guard: &mut Option<Session>,
        step: Step,
    ) -> Vec<Reply> {
        let Step { mut replies, update } = step;
        match update {
            SessionUpdate::Stay => {}
            SessionUpdate::Replace(next) => *guard = Some(next),
            SessionUpdate::End => *guard = None,
            SessionUpdate::CommitAndEnd(pending) => {
                *guard = None;
                replies.extend(self.commit(user_id, pending).await);
            }
            SessionUpdate::PatchAndEnd(field, value) => {
                *guard = None;
                replies.extend(self.patch(user_id, field, value).await);
            }
        }
        replies
    }

    /// `/start`: supersedes any live session, then either greets a
    /// registered user or opens a fresh registration flow.
    async fn on_entry(&self, user_id: UserId, guard: &mut Option<Session>) -> Vec<Reply> {
        *guard = None;
        match self.store.get(user_id).await {
            Ok(Some(profile)) => vec![
                Reply::new(prompts::welcome_back(&profile.full_name))
                    .with_keyboard(prompts::main_menu()),
            ],
            Ok(None) => {
                *guard = Some(Session::new_registration());
                vec![
                    Reply::new(prompts::WELCOME_NEW),
                    machine::ask(ProfileField::first()),
                ]
            }
            Err(err) => {
                error!(user_id, error = %err, "Profile lookup failed on entry");
                vec![Reply::new(prompts::SAVE_FAILED)]
            }
        }
    }

    /// Edit trigger with no live session. Requires an existing profile;
    /// otherwise no session is created at all.
    async fn on_edit_entry(&self, user_id: UserId, guard: &mut Option<Session>) -> Vec<Reply> {
        match self.store.get(user_id).await {
            Ok(Some(profile)) => {
                *guard = Some(Session::new_edit());
                vec![
                    Reply::new(prompts::edit_overview(&profile))
                        .with_keyboard(prompts::edit_menu()),
                ]
            }
            Ok(None) => {
                warn!(user_id, error = %FlowError::ProfileNotFound(user_id), "Edit without profile");
                vec![Reply::new(prompts::REGISTER_FIRST)]
            }
            Err(err) => {
                error!(user_id, error = %err, "Profile lookup failed on edit entry");
                vec![Reply::new(prompts::SAVE_FAILED)]
            }
        }
    }

    /// Explicit cancel/restart: destroys the session without touching the
    /// store, then returns to the menu (or asks to register).
    async fn on_cancel(&self, user_id: UserId, guard: &mut Option<Session>) -> Vec<Reply> {
        *guard = None;
        match self.store.get(user_id).await {
            Ok(Some(profile)) => vec![
                Reply::new(prompts::cancelled(&profile.full_name))
                    .with_keyboard(prompts::main_menu()),
            ],
            Ok(None) => vec![Reply::new(prompts::CANCEL_INCOMPLETE)],
            Err(err) => {
                error!(user_id, error = %err, "Profile lookup failed on cancel");
                vec![Reply::new(prompts::cancelled(prompts::FALLBACK_NAME))]
            }
        }
    }

    /// One-time commit of a completed registration.
    async fn commit(&self, user_id: UserId, pending: PendingProfile) -> Vec<Reply> {
        let Some(profile) = pending.into_profile(user_id, Utc::now()) else {
            error!(user_id, "Commit requested with incomplete pending values");
            return vec![Reply::new(prompts::SAVE_FAILED)];
        };
        match self.store.insert(&profile).await {
            Ok(()) => {
                debug!(user_id, "Profile registered");
                vec![
                    Reply::new(prompts::REGISTRATION_SAVED).with_keyboard(prompts::main_menu()),
                ]
            }
            Err(err) => match FlowError::from_commit(err, user_id) {
                FlowError::DuplicateRegistration(_) => {
                    warn!(user_id, "Duplicate registration attempt");
                    vec![
                        Reply::new(prompts::ALREADY_REGISTERED)
                            .with_keyboard(prompts::main_menu()),
                    ]
                }
                flow_err => {
                    error!(user_id, error = %flow_err, "Commit failed");
                    vec![Reply::new(prompts::SAVE_FAILED)]
                }
            },
        }
    }

    /// Atomic single-field update at edit completion.
    async fn patch(&self, user_id: UserId, field: ProfileField, value: String) -> Vec<Reply> {
        match self.store.update_field(user_id, field, &value).await {
            Ok(()) => {
                debug!(user_id, %field, "Profile field updated");
                vec![Reply::new(prompts::EDIT_SAVED).with_keyboard(prompts::main_menu())]
            }
            Err(err) => match FlowError::from_patch(err, user_id) {
                FlowError::ProfileNotFound(_) => {
                    warn!(user_id, "Edit completed for a user with no profile");
                    vec![Reply::new(prompts::REGISTER_FIRST)]
                }
                flow_err => {
                    error!(user_id, error = %flow_err, "Patch failed");
                    vec![Reply::new(prompts::SAVE_FAILED)]
                }
            },
        }
    }
}
