//! Minimal Telegram Bot API client: long-polling and plain-text replies.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::fmt::Debug;
use tracing::{debug, info, instrument};

use crate::{
    config::{Config, TelegramSettings},
    error::{SendError, TelegramError, preview},
};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Messaging seam used by the dispatch loop.
#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), SendError>;

    /// Long-poll for updates with `update_id >= offset`.
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_url: String,
    token: String,
}

impl TelegramClient {
    /// Build a client whose requests time out shortly after a full long-poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(token: String, settings: &TelegramSettings) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .map_err(TelegramError::Http)?;

        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TelegramError> {
        Self::new(
            config.credentials.bot_token.clone(),
            &config.settings.telegram,
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TelegramError> {
        let res = request
            .send()
            .await
            .map_err(|err| TelegramError::Http(err.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| TelegramError::Http(err.without_url()))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    status: status.as_u16(),
                    description: truncate_body(&body),
                });
            }
            Err(err) => return Err(TelegramError::Decode(err)),
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

impl Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    #[instrument(skip(self, text))]
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), SendError> {
        let request = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));

        self.call::<Value>(request)
            .await
            .map_err(|source| SendError {
                chat_id: chat_id.to_string(),
                text: text.to_string(),
                source,
            })?;

        info!("Message sent");
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        debug!(offset, timeout_secs, "Polling for updates");

        let request = self.http.get(self.method_url("getUpdates")).query(&[
            ("offset", offset.to_string()),
            ("timeout", timeout_secs.to_string()),
        ]);

        self.call(request).await
    }
}

fn truncate_body(body: &str) -> String {
    preview(body, 200)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_strips_trailing_slash() {
        let settings = TelegramSettings {
            api_url: "http://localhost:8081/".into(),
            ..TelegramSettings::default()
        };
        let client = TelegramClient::new("TOKEN".into(), &settings).expect("client");

        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost:8081/botTOKEN/sendMessage"
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let client = TelegramClient::new("123:SECRET".into(), &TelegramSettings::default())
            .expect("client");
        assert!(!format!("{client:?}").contains("SECRET"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "я".repeat(300);
        let out = truncate_body(&long);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn decodes_updates_without_text() {
        let updates: Vec<Update> = serde_json::from_value(json!([
            {"update_id": 1, "message": {"message_id": 5, "chat": {"id": 42}, "text": "Moscow"}},
            {"update_id": 2, "message": {"message_id": 6, "chat": {"id": 42}}},
            {"update_id": 3, "edited_message": {}},
        ]))
        .expect("valid updates");

        assert_eq!(updates[0].message.as_ref().and_then(|m| m.text.as_deref()), Some("Moscow"));
        assert!(updates[1].message.as_ref().is_some_and(|m| m.text.is_none()));
        assert!(updates[2].message.is_none());
    }
}
