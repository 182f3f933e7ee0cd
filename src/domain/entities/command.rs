use std::collections::BTreeMap;

use crate::application::errors::CommandError;

/// A tokenized command as handed over by a chat adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Outcome of a command: reply text or a user-readable failure
pub type CommandResult = Result<String, CommandError>;

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&CommandRequest) -> CommandResult + Send + Sync>;

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub handler: Option<CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandRequest) -> CommandResult + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Case-insensitive match on name or alias; `_` and `-` are interchangeable
    /// since some platforms forbid hyphens in command names.
    pub fn matches(&self, input: &str) -> bool {
        let normalize = |s: &str| s.to_lowercase().replace('_', "-");
        let input = normalize(input);
        normalize(&self.name) == input
            || self.aliases.iter().any(|a| normalize(a) == input)
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    /// Lookup by canonical name or alias, case-insensitive
    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands
            .get(input)
            .or_else(|| self.commands.values().find(|c| c.matches(input)))
    }

    /// Commands in name order
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_and_alias() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("total-sales").with_alias("총매출"));
        registry.register(Command::new("reset-all"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("total-sales").map(|c| c.name.as_str()), Some("total-sales"));
        assert_eq!(registry.find("총매출").map(|c| c.name.as_str()), Some("total-sales"));
        assert_eq!(registry.find("RESET-ALL").map(|c| c.name.as_str()), Some("reset-all"));
        assert_eq!(registry.find("total_sales").map(|c| c.name.as_str()), Some("total-sales"));
        assert!(registry.find("missing").is_none());
    }
}
