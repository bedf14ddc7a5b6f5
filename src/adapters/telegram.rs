use crate::domain::model::{ChatEvent, ChatId};
use crate::domain::ports::ChatTransport;
use crate::utils::error::{PriceBotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Extra time the HTTP client allows on top of the long-poll window.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: ChatId,
}

#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
}

/// Telegram Bot API over HTTPS long polling.
///
/// The token is part of every method URL, so request errors are stripped of
/// their URL before they are returned.
pub struct TelegramTransport {
    client: Client,
    method_base: String,
    poll_timeout: Duration,
    next_offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(poll_timeout + REQUEST_GRACE)
            .build()
            .map_err(|e| PriceBotError::HttpError(e.without_url()))?;

        Ok(Self {
            client,
            method_base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
            next_offset: AtomicI64::new(0),
        })
    }

    /// Checks the token with `getMe`.
    pub async fn get_me(&self) -> Result<BotUser> {
        self.call("getMe", &serde_json::json!({})).await
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.method_base, method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| PriceBotError::HttpError(e.without_url()))?;

        let status = response.status();
        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| PriceBotError::HttpError(e.without_url()))?;

        if !envelope.ok {
            return Err(PriceBotError::TelegramApiError {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        envelope
            .result
            .ok_or_else(|| PriceBotError::TelegramApiError {
                method: method.to_string(),
                description: "response carried no result".to_string(),
            })
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn next_events(&self) -> Result<Vec<ChatEvent>> {
        let request = GetUpdatesRequest {
            offset: self.next_offset.load(Ordering::SeqCst),
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        let mut events = Vec::with_capacity(updates.len());
        for update in updates {
            self.next_offset
                .fetch_max(update.update_id + 1, Ordering::SeqCst);

            // Photos, stickers and the like carry no text and are dropped.
            if let Some(Message {
                chat,
                text: Some(text),
            }) = update.message
            {
                events.push(ChatEvent::from_text(chat.id, &text));
            }
        }

        if !events.is_empty() {
            tracing::debug!("Received {} chat events", events.len());
        }
        Ok(events)
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        Ok(())
    }
}
