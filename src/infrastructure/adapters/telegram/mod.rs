//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Bot API rejects messages longer than 4096 characters
const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Network(format!(
                "Telegram API error: {}",
                self.description.unwrap_or_else(|| "no result".to_string())
            ))),
        }
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                username: name.replace('-', "_"),
                name,
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        data.into_result()
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Empty {}

        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let me: BotInfoResponse = self.call("getMe", &Empty {}).await?;

        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username,
        };

        Ok(())
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .map_or(current, |next| next.max(current))
    }

    /// Publish the command menu; Telegram only accepts `[a-z0-9_]` names
    pub async fn register_commands(&self, commands: &[(String, String)]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct BotCommand {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<BotCommand>,
        }

        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|(name, description)| BotCommand {
                    command: name.replace('-', "_"),
                    description: description.clone(),
                })
                .collect(),
        };

        let _: bool = self.call("setMyCommands", &request).await?;
        tracing::info!("Registered {} bot commands with Telegram", commands.len());
        Ok(())
    }

    /// Poll until `shutdown` resolves, answering each text message with `respond`
    pub async fn run<F>(&self, respond: F, shutdown: impl std::future::Future<Output = ()>) -> Result<(), BotError>
    where
        F: Fn(&str, &str, Option<String>) -> Option<String>,
    {
        let mut offset: i64 = 0;
        let timeout_seconds = 30;
        tokio::pin!(shutdown);

        tracing::info!("Starting message loop...");

        loop {
            let updates = tokio::select! {
                _ = &mut shutdown => break,
                updates = self.get_updates(offset, timeout_seconds) => updates,
            };

            match updates {
                Ok(updates) => {
                    offset = Self::get_next_offset(&updates, offset);
                    for msg in updates.into_iter().filter_map(|u| u.message) {
                        let Some(text) = msg.text else { continue };
                        let chat_id = msg.chat.id.to_string();
                        let sender = msg.from.as_ref().map(User::display_name);

                        let Some(reply) = respond(&chat_id, &text, sender) else { continue };
                        for chunk in split_message(&reply, MAX_MESSAGE_CHARS) {
                            if let Err(e) = self.send_message(&chat_id, &chunk).await {
                                tracing::error!("Failed to send message: {}", e);
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to get updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }

        tracing::info!("Message loop stopped");
        Ok(())
    }
}

/// First characters of the token, for logs
fn token_preview(token: &str) -> String {
    token.chars().take(8).collect()
}

/// Split on line boundaries into pieces of at most `limit` characters.
/// A single line longer than `limit` is cut mid-line. The line break falling
/// between two chunks is dropped; everything else is kept.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut started = false;

    for line in text.split('\n') {
        let mut line: Vec<char> = line.chars().collect();
        let sep = usize::from(started);
        if started && current_len + sep + line.len() > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
            started = false;
        }
        while line.len() > limit {
            let rest = line.split_off(limit);
            chunks.push(line.into_iter().collect());
            line = rest;
        }
        if started {
            current.push('\n');
            current_len += 1;
        }
        current_len += line.len();
        current.extend(line);
        started = true;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", token_preview(&self.token));
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        tracing::debug!("Sending to {}: {}", chat_id, text);
        let result: MessageResult = self.call("sendMessage", &SendMessageRequest { chat_id, text }).await?;
        Ok(result.message_id.to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: i64) -> Update {
        Update { update_id: id, message: None }
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(TelegramAdapter::get_next_offset(&[], 7), 7);
        assert_eq!(TelegramAdapter::get_next_offset(&[update(10), update(12)], 0), 13);
        assert_eq!(TelegramAdapter::get_next_offset(&[update(3)], 9), 9);
    }

    #[test]
    fn test_api_envelope() {
        let ok: ApiResponse<bool> = ApiResponse { ok: true, result: Some(true), description: None };
        assert!(ok.into_result().unwrap());

        let failed: ApiResponse<bool> = ApiResponse {
            ok: false,
            result: None,
            description: Some("Unauthorized".to_string()),
        };
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Network error: Telegram API error: Unauthorized");
    }

    #[test]
    fn test_split_message() {
        assert_eq!(split_message("short", 10), vec!["short"]);
        assert_eq!(split_message("aaaa\nbbbb\ncc", 9), vec!["aaaa\nbbbb", "cc"]);
        assert_eq!(split_message("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        for chunk in split_message(&"line of sales\n".repeat(1000), MAX_MESSAGE_CHARS) {
            assert!(chunk.chars().count() <= MAX_MESSAGE_CHARS);
        }
    }

    #[test]
    fn test_split_message_keeps_blank_lines_within_a_chunk() {
        assert_eq!(split_message("\n\nsales", 20), vec!["\n\nsales"]);
        assert_eq!(split_message("a\n\nb", 20), vec!["a\n\nb"]);
    }

    #[test]
    fn test_token_preview_counts_characters() {
        assert_eq!(token_preview("12345678:ABCDEF"), "12345678");
        assert_eq!(token_preview("토큰토큰토큰토큰토큰"), "토큰토큰토큰토큰");
        assert_eq!(token_preview("abc"), "abc");
    }

    #[test]
    fn test_display_name_falls_back() {
        let user = User { id: 5, username: None, first_name: Some("Min".to_string()) };
        assert_eq!(user.display_name(), "Min");
        let user = User { id: 5, username: None, first_name: None };
        assert_eq!(user.display_name(), "5");
    }
}
