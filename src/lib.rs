//! Chat-driven sales ledger recording sales in a local and a foreign currency.

pub mod application;
pub mod domain;
pub mod infrastructure;
