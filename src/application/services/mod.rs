//! Application services - Business logic orchestration

pub mod command_service;
pub mod ledger_service;

pub use command_service::CommandService;
pub use ledger_service::LedgerService;
