//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] LedgerError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    NotFound(String),

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

/// Ledger validation and storage errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Both an item list and a total amount are required")]
    TooFewArguments,

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid amount '{0}': expected {1}")]
    InvalidAmount(String, &'static str),

    #[error("Item description must not be empty")]
    EmptyItem,

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(String),

    #[error("Invalid year '{0}': expected an integer")]
    InvalidYear(String),

    #[error("No matching sale found; check the date, items and amount")]
    RecordNotFound,

    #[error("Sales total is too large to compute")]
    TotalOverflow,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::StorageUnavailable(e.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
