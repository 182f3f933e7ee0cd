//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod message;
pub mod sale;

pub use command::{Command, CommandHandler, CommandRegistry, CommandRequest, CommandResult};
pub use message::{Content, Message};
pub use sale::{Currencies, Money, SaleRecord, SalesTotals};
