//! Telegram transport — long-polls the Bot API for updates.
//!
//! Raw Bot API over reqwest; updates are normalized into `InboundUpdate`
//! before they reach the dispatcher, so flow code never sees Telegram JSON.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::channels::transport::{
    InboundUpdate, Keyboard, OutboundMessage, Transport, UpdateStream,
};
use crate::error::ChannelError;
use crate::flow::event::{ButtonToken, FlowEvent};

/// One Bot API update after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedUpdate {
    inbound: InboundUpdate,
    /// Present for button presses; must be acknowledged with
    /// answerCallbackQuery or the client keeps its spinner.
    callback_query_id: Option<String>,
}

/// Telegram transport — connects to the Bot API via long-polling.
pub struct TelegramTransport {
    bot_token: SecretString,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot_token: SecretString, poll_timeout_secs: u64) -> Self {
        Self {
            bot_token,
            poll_timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }
}

/// Normalize one raw getUpdates entry. Returns `None` for anything the
/// flow cannot act on (joins, stickers, unknown callback data, ...).
fn parse_update(update: &Value) -> Option<ParsedUpdate> {
    if let Some(message) = update.get("message") {
        let user_id = message.get("from")?.get("id")?.as_i64()?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;

        let event = if let Some(contact) = message.get("contact") {
            let phone = contact.get("phone_number")?.as_str()?;
            FlowEvent::Contact(phone.to_string())
        } else {
            let text = message.get("text")?.as_str()?;
            FlowEvent::Text(text.to_string())
        };

        return Some(ParsedUpdate {
            inbound: InboundUpdate::new(user_id, chat_id, event),
            callback_query_id: None,
        });
    }

    if let Some(callback) = update.get("callback_query") {
        let user_id = callback.get("from")?.get("id")?.as_i64()?;
        let chat_id = callback.get("message")?.get("chat")?.get("id")?.as_i64()?;
        let callback_query_id = callback.get("id")?.as_str()?.to_string();
        let token = ButtonToken::parse(callback.get("data")?.as_str()?)?;

        return Some(ParsedUpdate {
            inbound: InboundUpdate::new(user_id, chat_id, FlowEvent::Button(token)),
            callback_query_id: Some(callback_query_id),
        });
    }

    None
}

/// Render a keyboard as Bot API `reply_markup` JSON.
fn keyboard_json(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Inline(rows) => json!({
            "inline_keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(label, token)| {
                            json!({"text": label, "callback_data": token.as_str()})
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
        }),
        Keyboard::Reply { rows, one_time } => json!({
            "keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| {
                            json!({
                                "text": button.label,
                                "request_contact": button.request_contact,
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
            "one_time_keyboard": one_time,
        }),
        Keyboard::Remove => json!({"remove_keyboard": true}),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<UpdateStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let get_updates_url = self.api_url("getUpdates");
        let answer_callback_url = self.api_url("answerCallbackQuery");
        let poll_timeout_secs = self.poll_timeout_secs;
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram transport listening for updates...");

            loop {
                let body = json!({
                    "offset": offset,
                    "timeout": poll_timeout_secs,
                    "allowed_updates": ["message", "callback_query"],
                });

                let resp = match client.post(&get_updates_url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(Value::as_array) {
                    for update in results {
                        // Advance offset past this update even if we drop it.
                        if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                            offset = uid + 1;
                        }

                        let Some(parsed) = parse_update(update) else {
                            continue;
                        };

                        // Acknowledge button presses so the client stops
                        // showing its progress spinner.
                        if let Some(callback_query_id) = &parsed.callback_query_id {
                            let _ = client
                                .post(&answer_callback_url)
                                .json(&json!({"callback_query_id": callback_query_id}))
                                .send()
                                .await;
                        }

                        if tx.send(parsed.inbound).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream =
            futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|u| (u, rx)) });

        Ok(Box::pin(stream))
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError> {
        let mut body = json!({
            "chat_id": message.chat_id,
            "text": message.text,
        });
        if let Some(keyboard) = &message.keyboard {
            body["reply_markup"] = keyboard_json(keyboard);
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {detail}"),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::HealthCheckFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::HealthCheckFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram transport shutting down");
        Ok(())
    }
}
