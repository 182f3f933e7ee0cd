//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (SaleRecord, Money, Message, Command)
//! - Traits: Abstractions for infrastructure (Bot, SalesLedger)

pub mod entities;
pub mod traits;
