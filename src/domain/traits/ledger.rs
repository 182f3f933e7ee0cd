use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::application::errors::LedgerError;
use crate::domain::entities::{Money, SaleRecord, SalesTotals};

/// SalesLedger trait - abstraction for the persistent record set.
///
/// Every method is atomic on its own; implementations serialize writers so
/// no caller observes a partially applied mutation.
pub trait SalesLedger: Send + Sync {
    /// Insert a new sale and return it with its assigned id
    fn record(&self, date: NaiveDate, item: &str, money: Money) -> Result<SaleRecord, LedgerError>;

    /// Remove the lowest-id record whose date, item and amount all match
    fn delete_exact(&self, date: NaiveDate, item: &str, amount: Decimal) -> Result<SaleRecord, LedgerError>;

    fn sum_all(&self) -> Result<SalesTotals, LedgerError>;

    /// Sums over `[year-month-01, next-month-01)`
    fn sum_for_month(&self, year: i32, month: u32) -> Result<SalesTotals, LedgerError>;

    /// All records in insertion order
    fn list_all(&self) -> Result<Vec<SaleRecord>, LedgerError>;

    /// Delete every record, returning how many were removed
    fn reset(&self) -> Result<usize, LedgerError>;

    fn record_local_sale(&self, date: NaiveDate, item: &str, amount: i64) -> Result<SaleRecord, LedgerError> {
        self.record(date, item, Money::Local(amount))
    }

    fn record_foreign_sale(&self, date: NaiveDate, item: &str, amount: Decimal) -> Result<SaleRecord, LedgerError> {
        self.record(date, item, Money::Foreign(amount))
    }
}
