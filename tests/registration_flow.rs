//! End-to-end dialogue tests: dispatcher + state machine + in-memory store.

use std::sync::Arc;

use enroll_bot::channels::InboundUpdate;
use enroll_bot::dispatch::Dispatcher;
use enroll_bot::flow::event::{ButtonToken, FlowEvent};
use enroll_bot::flow::fields::ProfileField;
use enroll_bot::flow::prompts;
use enroll_bot::store::{LibSqlStore, ProfileStore, UserId};

const FULL_NAME: &str = "علی محمدی";
const NATIONAL_ID: &str = "0499370899";
const STUDENT_ID: &str = "9812345";
const PHONE: &str = "09123456789";

async fn setup() -> (Arc<LibSqlStore>, Dispatcher) {
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let dispatcher = Dispatcher::new(store.clone());
    (store, dispatcher)
}

async fn send(dispatcher: &Dispatcher, user_id: UserId, event: FlowEvent) -> Vec<String> {
    dispatcher
        .handle(InboundUpdate::new(user_id, user_id, event))
        .await
        .into_iter()
        .map(|m| m.text)
        .collect()
}

async fn text(dispatcher: &Dispatcher, user_id: UserId, s: &str) -> Vec<String> {
    send(dispatcher, user_id, FlowEvent::Text(s.into())).await
}

async fn confirm(dispatcher: &Dispatcher, user_id: UserId, field: ProfileField) -> Vec<String> {
    send(
        dispatcher,
        user_id,
        FlowEvent::Button(ButtonToken::Confirm(field)),
    )
    .await
}

/// Drive a user through the whole registration flow.
async fn register(dispatcher: &Dispatcher, user_id: UserId) {
    text(dispatcher, user_id, "/start").await;
    for (&field, value) in ProfileField::ORDER
        .iter()
        .zip([FULL_NAME, NATIONAL_ID, STUDENT_ID, PHONE])
    {
        text(dispatcher, user_id, value).await;
        confirm(dispatcher, user_id, field).await;
    }
}

// ── Registration ────────────────────────────────────────────────────

#[tokio::test]
async fn full_registration_happy_path() {
    let (store, dispatcher) = setup().await;

    let replies = text(&dispatcher, 1, "/start").await;
    assert_eq!(
        replies,
        vec![
            prompts::WELCOME_NEW.to_string(),
            ProfileField::FullName.prompt().to_string(),
        ]
    );

    let replies = text(&dispatcher, 1, FULL_NAME).await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::FullName, FULL_NAME)]
    );

    let replies = confirm(&dispatcher, 1, ProfileField::FullName).await;
    assert_eq!(replies, vec![ProfileField::NationalId.prompt().to_string()]);

    text(&dispatcher, 1, NATIONAL_ID).await;
    confirm(&dispatcher, 1, ProfileField::NationalId).await;
    text(&dispatcher, 1, STUDENT_ID).await;
    let replies = confirm(&dispatcher, 1, ProfileField::StudentId).await;
    assert_eq!(replies, vec![ProfileField::Phone.prompt().to_string()]);

    // The contact share carries the international form; the flow confirms
    // the normalized local form.
    let replies = send(&dispatcher, 1, FlowEvent::Contact("+989123456789".into())).await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::Phone, PHONE)]
    );

    let replies = confirm(&dispatcher, 1, ProfileField::Phone).await;
    assert_eq!(replies, vec![prompts::REGISTRATION_SAVED.to_string()]);

    let profile = store.get(1).await.unwrap().unwrap();
    assert_eq!(profile.full_name, FULL_NAME);
    assert_eq!(profile.national_id, NATIONAL_ID);
    assert_eq!(profile.student_id, STUDENT_ID);
    assert_eq!(profile.phone, PHONE);
}

#[tokio::test]
async fn invalid_value_self_loops_until_valid() {
    let (store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;

    let replies = text(&dispatcher, 1, "علی").await;
    assert_eq!(replies, vec![ProfileField::FullName.error_prompt().to_string()]);

    // Still collecting the same field; nothing was stored.
    let replies = text(&dispatcher, 1, FULL_NAME).await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::FullName, FULL_NAME)]
    );
    assert!(store.get(1).await.unwrap().is_none());
}

#[tokio::test]
async fn stale_confirm_from_another_field_is_ignored() {
    let (_store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;
    text(&dispatcher, 1, FULL_NAME).await;
    confirm(&dispatcher, 1, ProfileField::FullName).await;

    // Now collecting the national id; a press on the old full-name
    // keyboard must not move the flow.
    let replies = confirm(&dispatcher, 1, ProfileField::FullName).await;
    assert!(replies.is_empty());

    let replies = text(&dispatcher, 1, NATIONAL_ID).await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::NationalId, NATIONAL_ID)]
    );
}

#[tokio::test]
async fn retry_reasks_with_the_original_prompt() {
    let (_store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;
    text(&dispatcher, 1, FULL_NAME).await;

    let replies = send(
        &dispatcher,
        1,
        FlowEvent::Button(ButtonToken::Retry(ProfileField::FullName)),
    )
    .await;
    assert_eq!(replies, vec![ProfileField::FullName.prompt().to_string()]);

    // A different value is accepted on the second pass.
    let replies = text(&dispatcher, 1, "رضا احمدی").await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::FullName, "رضا احمدی")]
    );
}

#[tokio::test]
async fn racing_final_confirms_commit_exactly_once() {
    let (store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;
    for (&field, value) in ProfileField::ORDER
        .iter()
        .zip([FULL_NAME, NATIONAL_ID, STUDENT_ID, PHONE])
        .take(3)
    {
        text(&dispatcher, 1, value).await;
        confirm(&dispatcher, 1, field).await;
    }
    text(&dispatcher, 1, PHONE).await;

    // Two presses of the final confirm button racing each other.
    let (a, b) = tokio::join!(
        confirm(&dispatcher, 1, ProfileField::Phone),
        confirm(&dispatcher, 1, ProfileField::Phone),
    );

    let saved = [&a, &b]
        .iter()
        .filter(|r| r.contains(&prompts::REGISTRATION_SAVED.to_string()))
        .count();
    assert_eq!(saved, 1, "exactly one press commits, got {a:?} / {b:?}");
    assert!(a.is_empty() || b.is_empty(), "the loser is ignored");
    assert!(store.get(1).await.unwrap().is_some());
}

#[tokio::test]
async fn second_registration_for_the_same_identity_is_rejected() {
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let first = Dispatcher::new(store.clone());
    let second = Dispatcher::new(store.clone());

    // Both drivers reach the final confirm before either commits.
    for dispatcher in [&first, &second] {
        text(dispatcher, 1, "/start").await;
        for (&field, value) in ProfileField::ORDER
            .iter()
            .zip([FULL_NAME, NATIONAL_ID, STUDENT_ID, PHONE])
            .take(3)
        {
            text(dispatcher, 1, value).await;
            confirm(dispatcher, 1, field).await;
        }
        text(dispatcher, 1, PHONE).await;
    }

    let replies = confirm(&first, 1, ProfileField::Phone).await;
    assert_eq!(replies, vec![prompts::REGISTRATION_SAVED.to_string()]);

    let replies = confirm(&second, 1, ProfileField::Phone).await;
    assert_eq!(replies, vec![prompts::ALREADY_REGISTERED.to_string()]);
}

#[tokio::test]
async fn identities_are_isolated() {
    let (store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    // A second user mid-flow sees their own state, not user 1's.
    text(&dispatcher, 2, "/start").await;
    let replies = text(&dispatcher, 2, "رضا احمدی").await;
    assert_eq!(
        replies,
        vec![prompts::confirm_prompt(ProfileField::FullName, "رضا احمدی")]
    );

    assert!(store.get(1).await.unwrap().is_some());
    assert!(store.get(2).await.unwrap().is_none());
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn start_supersedes_a_live_session() {
    let (_store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;
    text(&dispatcher, 1, FULL_NAME).await;

    // Restart: back at the first field, previous answers gone.
    let replies = text(&dispatcher, 1, "/start").await;
    assert_eq!(
        replies,
        vec![
            prompts::WELCOME_NEW.to_string(),
            ProfileField::FullName.prompt().to_string(),
        ]
    );
}

#[tokio::test]
async fn start_greets_a_registered_user() {
    let (_store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    let replies = text(&dispatcher, 1, "/start").await;
    assert_eq!(replies, vec![prompts::welcome_back(FULL_NAME)]);
}

#[tokio::test]
async fn cancel_mid_registration_discards_everything() {
    let (store, dispatcher) = setup().await;
    text(&dispatcher, 1, "/start").await;
    text(&dispatcher, 1, FULL_NAME).await;

    let replies = text(&dispatcher, 1, "/cancel").await;
    assert_eq!(replies, vec![prompts::CANCEL_INCOMPLETE.to_string()]);
    assert!(store.get(1).await.unwrap().is_none());

    // No session remains; loose text is ignored.
    let replies = text(&dispatcher, 1, NATIONAL_ID).await;
    assert!(replies.is_empty());
}

#[tokio::test]
async fn reset_menu_button_cancels_for_a_registered_user() {
    let (_store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    let replies = text(&dispatcher, 1, prompts::MENU_RESET).await;
    assert_eq!(replies, vec![prompts::cancelled(FULL_NAME)]);
}

#[tokio::test]
async fn text_outside_any_flow_is_ignored() {
    let (_store, dispatcher) = setup().await;
    let replies = text(&dispatcher, 1, "سلام").await;
    assert!(replies.is_empty());
}

// ── Edit flow ───────────────────────────────────────────────────────

#[tokio::test]
async fn edit_flow_patches_one_field() {
    let (store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    let replies = text(&dispatcher, 1, prompts::MENU_EDIT).await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains(NATIONAL_ID));

    let replies = send(
        &dispatcher,
        1,
        FlowEvent::Button(ButtonToken::EditField(ProfileField::NationalId)),
    )
    .await;
    assert_eq!(
        replies,
        vec![prompts::edit_value_prompt(ProfileField::NationalId)]
    );

    // Invalid value self-loops, valid value saves.
    let replies = text(&dispatcher, 1, "123").await;
    assert_eq!(
        replies,
        vec![ProfileField::NationalId.error_prompt().to_string()]
    );
    let replies = text(&dispatcher, 1, "1234567891").await;
    assert_eq!(replies, vec![prompts::EDIT_SAVED.to_string()]);

    let profile = store.get(1).await.unwrap().unwrap();
    assert_eq!(profile.national_id, "1234567891");
    assert_eq!(profile.full_name, FULL_NAME);
    assert_eq!(profile.phone, PHONE);
}

#[tokio::test]
async fn edit_phone_accepts_a_contact_share() {
    let (store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    text(&dispatcher, 1, prompts::MENU_EDIT).await;
    send(
        &dispatcher,
        1,
        FlowEvent::Button(ButtonToken::EditField(ProfileField::Phone)),
    )
    .await;

    let replies = send(&dispatcher, 1, FlowEvent::Contact("+989351234567".into())).await;
    assert_eq!(replies, vec![prompts::EDIT_SAVED.to_string()]);
    assert_eq!(store.get(1).await.unwrap().unwrap().phone, "09351234567");
}

#[tokio::test]
async fn edit_can_be_cancelled_from_the_menu() {
    let (store, dispatcher) = setup().await;
    register(&dispatcher, 1).await;

    text(&dispatcher, 1, prompts::MENU_EDIT).await;
    let replies = send(&dispatcher, 1, FlowEvent::Button(ButtonToken::CancelEdit)).await;
    assert_eq!(replies, vec![prompts::EDIT_CANCELLED.to_string()]);

    // Nothing changed, and the session is gone.
    assert_eq!(store.get(1).await.unwrap().unwrap().full_name, FULL_NAME);
    assert!(text(&dispatcher, 1, "1234567891").await.is_empty());
}

#[tokio::test]
async fn edit_without_a_profile_is_refused() {
    let (_store, dispatcher) = setup().await;

    let replies = text(&dispatcher, 1, prompts::MENU_EDIT).await;
    assert_eq!(replies, vec![prompts::REGISTER_FIRST.to_string()]);

    // No edit session was created.
    let replies = text(&dispatcher, 1, "1234567891").await;
    assert!(replies.is_empty());
}
