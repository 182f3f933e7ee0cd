//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Ledger command handling and the command registry
//! - Validation: Token parsing for ledger commands
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and dispatching

pub mod errors;
pub mod messaging;
pub mod services;
pub mod validation;
