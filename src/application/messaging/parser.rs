//! Message parser - Parses raw messages into structured messages

use crate::domain::entities::{Content, Message};

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<String>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Message::new(chat_id, Content::Empty).with_sender(sender);
        }

        // Check if it's a command
        if let Some(cmd_text) = self.strip_prefix(trimmed) {
            return self.parse_command(chat_id, cmd_text, sender);
        }

        // Regular text message
        Message::new(chat_id, Content::Text(text)).with_sender(sender)
    }

    fn strip_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        if !self.command_prefix.is_empty() {
            if let Some(rest) = text.strip_prefix(self.command_prefix.as_str()) {
                return Some(rest);
            }
        }
        text.strip_prefix('/')
    }

    /// Parse a command message
    fn parse_command(&self, chat_id: String, cmd_text: &str, sender: Option<String>) -> Message {
        // Split command and arguments
        let mut parts = cmd_text.split_whitespace();
        let name = parts.next().unwrap_or("");
        // Group chats address commands as `/name@botname`
        let name = name.split('@').next().unwrap_or(name);
        let args = parts.map(|s| s.to_string()).collect();

        Message::from_command(chat_id, name, args).with_sender(sender)
    }
}
