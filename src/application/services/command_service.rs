use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::services::LedgerService;
use crate::domain::entities::{Command, CommandRegistry, CommandRequest, CommandResult};

const HELP: &str = "help";

/// Service for managing and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        // Answered by get_help, listed here so it shows up in the registry
        self.register(Command::new(HELP)
            .with_description("Show help message")
            .with_usage("help [command]"));

        self.register(Command::new("version")
            .with_description("Show bot version")
            .with_handler(|_| {
                Ok(format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
            }));
    }

    /// Register the sales ledger commands, each with its Korean alias
    pub fn register_ledger_commands(&mut self, ledger: Arc<LedgerService>) {
        let svc = Arc::clone(&ledger);
        self.register(Command::new("record-local-sale")
            .with_alias("원화판매")
            .with_description("Record a sale in the local currency")
            .with_usage("record-local-sale <YYYY-MM-DD> <item>... <amount>")
            .with_handler(move |req| Ok(svc.record_local_sale(&req.args)?)));

        let svc = Arc::clone(&ledger);
        self.register(Command::new("record-foreign-sale")
            .with_alias("달러판매")
            .with_description("Record a sale in the foreign currency")
            .with_usage("record-foreign-sale <YYYY-MM-DD> <item>... <amount>")
            .with_handler(move |req| Ok(svc.record_foreign_sale(&req.args)?)));

        let svc = Arc::clone(&ledger);
        self.register(Command::new("total-sales")
            .with_alias("총매출")
            .with_description("Show all-time totals for both currencies")
            .with_handler(move |_| Ok(svc.total_sales()?)));

        let svc = Arc::clone(&ledger);
        self.register(Command::new("delete-sale")
            .with_alias("삭제")
            .with_description("Delete one sale matching date, items and amount")
            .with_usage("delete-sale <YYYY-MM-DD> <item>... <amount>")
            .with_handler(move |req| Ok(svc.delete_sale(&req.args)?)));

        let svc = Arc::clone(&ledger);
        self.register(Command::new("reset-all")
            .with_alias("초기화")
            .with_description("Delete every sales record")
            .with_handler(move |_| Ok(svc.reset_all()?)));

        let svc = Arc::clone(&ledger);
        self.register(Command::new("list-sales")
            .with_alias("데이터")
            .with_description("List every stored sale")
            .with_handler(move |_| Ok(svc.list_sales()?)));

        let svc = ledger;
        self.register(Command::new("monthly-sales")
            .with_alias("월별매출")
            .with_description("Show totals for one month")
            .with_usage("monthly-sales <year> <month>")
            .with_handler(move |req| Ok(svc.monthly_sales(&req.args)?)));
    }

    pub fn handle(&self, request: &CommandRequest) -> CommandResult {
        let cmd = self.registry.find(&request.name)
            .ok_or_else(|| CommandError::NotFound(request.name.clone()))?;

        if cmd.name == HELP {
            return Ok(self.get_help(request.args.first().map(String::as_str)));
        }

        match &cmd.handler {
            Some(handler) => handler(request),
            None => Ok(format!("Command {} not implemented", cmd.name)),
        }
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if !cmd.aliases.is_empty() {
                    help.push_str(&format!("\nAliases: {}", cmd.aliases.join(", ")));
                }
                if let Some(usage) = &cmd.usage {
                    help.push_str(&format!("\nUsage: {}{}", self.prefix, usage));
                }
                return help;
            }
            return format!("Command {}{} not found", self.prefix, name);
        }

        // List all commands
        let mut help = "Available commands:".to_string();
        for cmd in self.registry.all() {
            help.push_str(&format!("\n  {}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("")));
        }
        help
    }

    /// Canonical command names with their descriptions
    pub fn summaries(&self) -> Vec<(String, String)> {
        self.registry
            .all()
            .map(|c| (c.name.clone(), c.description.clone().unwrap_or_default()))
            .collect()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::LedgerError;
    use crate::domain::entities::Currencies;
    use crate::infrastructure::database::SqliteLedger;

    fn service() -> CommandService {
        let ledger = SqliteLedger::in_memory().expect("in-memory ledger");
        let mut commands = CommandService::new("!");
        commands.register_defaults();
        commands.register_ledger_commands(Arc::new(LedgerService::new(Arc::new(ledger), Currencies::default())));
        commands
    }

    fn request(name: &str, args: &str) -> CommandRequest {
        CommandRequest::new(name, args.split_whitespace().map(String::from).collect())
    }

    #[test]
    fn test_alias_routes_to_same_handler() {
        let commands = service();
        commands.handle(&request("원화판매", "2024-05-01 coffee 100")).unwrap();
        commands.handle(&request("record-local-sale", "2024-05-01 coffee 200")).unwrap();
        assert_eq!(
            commands.handle(&request("총매출", "")).unwrap(),
            "Total sales: 300 KRW, 0.00 USD"
        );
    }

    #[test]
    fn test_unknown_command() {
        let commands = service();
        let err = commands.handle(&request("launch", "")).unwrap_err();
        assert!(matches!(err, CommandError::NotFound(ref name) if name == "launch"));
        assert_eq!(err.to_string(), "Unknown command: launch");
    }

    #[test]
    fn test_ledger_errors_surface_as_command_errors() {
        let commands = service();
        let err = commands.handle(&request("monthly-sales", "2024 0")).unwrap_err();
        assert!(matches!(err, CommandError::Ledger(LedgerError::InvalidMonth(_))));
        assert_eq!(err.to_string(), "Month must be between 1 and 12, got 0");
    }

    #[test]
    fn test_help_lists_and_describes() {
        let commands = service();
        let all = commands.handle(&request("help", "")).unwrap();
        assert!(all.starts_with("Available commands:"));
        assert!(all.contains("!delete-sale"));
        assert!(all.contains("!version"));

        let one = commands.handle(&request("help", "월별매출")).unwrap();
        assert!(one.contains("!monthly-sales - Show totals for one month"));
        assert!(one.contains("Usage: !monthly-sales <year> <month>"));

        assert_eq!(commands.summaries().len(), 9);
    }
}
