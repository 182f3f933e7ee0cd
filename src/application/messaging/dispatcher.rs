//! Message dispatcher - Routes messages to command handlers

use crate::application::errors::{CommandError, LedgerError};
use crate::application::services::CommandService;
use crate::domain::entities::{Content, Message};
use super::parser::MessageParser;

/// Message dispatcher - parses text and routes commands to the command service
pub struct MessageDispatcher {
    parser: MessageParser,
    commands: CommandService,
}

impl MessageDispatcher {
    pub fn new(commands: CommandService) -> Self {
        Self {
            parser: MessageParser::new(commands.prefix()),
            commands,
        }
    }

    pub fn commands(&self) -> &CommandService {
        &self.commands
    }

    /// Process a raw text message, returning the reply if one is due
    pub fn process_text(&self, chat_id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.process_from(chat_id, text, None)
    }

    /// Same as `process_text`, tagging the message with its sender
    pub fn process_from(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<String>) -> Option<String> {
        let message = self.parser.parse(chat_id, text, sender);
        self.process(message)
    }

    /// Process a message through the dispatcher
    pub fn process(&self, message: Message) -> Option<String> {
        let Content::Command(request) = &message.content else {
            return None;
        };

        tracing::debug!(
            "[{}] {} from {}: {:?}",
            message.chat_id,
            request.name,
            message.sender.as_deref().unwrap_or("unknown"),
            request.args
        );

        match self.commands.handle(request) {
            Ok(reply) => Some(reply),
            Err(e) => {
                match &e {
                    CommandError::Ledger(LedgerError::StorageUnavailable(cause)) => {
                        tracing::error!("[{}] {} failed: {}", message.chat_id, request.name, cause);
                    }
                    _ => tracing::warn!("[{}] {} rejected: {}", message.chat_id, request.name, e),
                }
                Some(e.to_string())
            }
        }
    }
}
