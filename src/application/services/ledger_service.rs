use std::sync::Arc;

use crate::application::errors::LedgerError;
use crate::application::validation::{self, AmountKind};
use crate::domain::entities::{Currencies, SaleRecord};
use crate::domain::traits::SalesLedger;

/// Runs ledger commands end to end: validate tokens, call the store once,
/// render the outcome as reply text.
pub struct LedgerService {
    ledger: Arc<dyn SalesLedger>,
    currencies: Currencies,
}

impl LedgerService {
    pub fn new(ledger: Arc<dyn SalesLedger>, currencies: Currencies) -> Self {
        Self { ledger, currencies }
    }

    fn record_sale(&self, args: &[String], kind: AmountKind) -> Result<String, LedgerError> {
        let (date_token, trailing) = args.split_first().ok_or(LedgerError::TooFewArguments)?;
        let sale = validation::validate_sale_args(date_token, trailing, kind)?;
        let saved = self.ledger.record(sale.date, &sale.item, sale.money)?;
        Ok(format!(
            "Recorded on {}: {} - {} total",
            saved.date.format("%Y-%m-%d"),
            saved.item,
            self.currencies.format(&saved.money)
        ))
    }

    /// `date item... amount` with an integer amount in the local currency
    pub fn record_local_sale(&self, args: &[String]) -> Result<String, LedgerError> {
        self.record_sale(args, AmountKind::Integer)
    }

    /// `date item... amount` with a decimal amount in the foreign currency
    pub fn record_foreign_sale(&self, args: &[String]) -> Result<String, LedgerError> {
        self.record_sale(args, AmountKind::Decimal)
    }

    pub fn total_sales(&self) -> Result<String, LedgerError> {
        let totals = self.ledger.sum_all()?;
        Ok(format!("Total sales: {}", self.currencies.format_totals(&totals)))
    }

    pub fn delete_sale(&self, args: &[String]) -> Result<String, LedgerError> {
        let (date_token, trailing) = args.split_first().ok_or(LedgerError::TooFewArguments)?;
        let target = validation::validate_delete_args(date_token, trailing)?;
        let deleted = self.ledger.delete_exact(target.date, &target.item, target.amount)?;
        Ok(format!(
            "Deleted sale on {}: {} - {} total",
            deleted.date.format("%Y-%m-%d"),
            deleted.item,
            self.currencies.format(&deleted.money)
        ))
    }

    pub fn reset_all(&self) -> Result<String, LedgerError> {
        let removed = self.ledger.reset()?;
        tracing::info!("Ledger reset, {} sales removed", removed);
        Ok("All sales records have been reset.".to_string())
    }

    pub fn list_sales(&self) -> Result<String, LedgerError> {
        let records = self.ledger.list_all()?;
        if records.is_empty() {
            return Ok("No sales records stored.".to_string());
        }
        Ok(records
            .iter()
            .map(SaleRecord::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn monthly_sales(&self, args: &[String]) -> Result<String, LedgerError> {
        let (year, month) = validation::parse_month_tokens(args)?;
        let totals = self.ledger.sum_for_month(year, month)?;
        Ok(format!(
            "Sales for {}-{:02}: {}",
            year,
            month,
            self.currencies.format_totals(&totals)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::SqliteLedger;

    fn service() -> LedgerService {
        let ledger = SqliteLedger::in_memory().expect("in-memory ledger");
        LedgerService::new(Arc::new(ledger), Currencies::default())
    }

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_record_and_total_messages() {
        let svc = service();
        assert_eq!(
            svc.record_local_sale(&args("2024-05-01 coffee cake 15000")).unwrap(),
            "Recorded on 2024-05-01: coffee cake - 15000 KRW total"
        );
        assert_eq!(
            svc.record_foreign_sale(&args("2024-05-02 tea 3.5")).unwrap(),
            "Recorded on 2024-05-02: tea - 3.50 USD total"
        );
        assert_eq!(svc.total_sales().unwrap(), "Total sales: 15000 KRW, 3.50 USD");
    }

    #[test]
    fn test_missing_date_is_too_few_arguments() {
        let svc = service();
        assert_eq!(svc.record_local_sale(&[]), Err(LedgerError::TooFewArguments));
        assert_eq!(svc.delete_sale(&[]), Err(LedgerError::TooFewArguments));
    }

    #[test]
    fn test_invalid_amount_does_not_touch_ledger() {
        let svc = service();
        assert_eq!(
            svc.record_local_sale(&args("2024-05-01 coffee abc")),
            Err(LedgerError::InvalidAmount("abc".to_string(), validation::POSITIVE_AMOUNT))
        );
        assert_eq!(svc.list_sales().unwrap(), "No sales records stored.");
    }

    #[test]
    fn test_delete_and_list_messages() {
        let svc = service();
        svc.record_local_sale(&args("2024-05-01 coffee cake 15000")).unwrap();
        svc.record_foreign_sale(&args("2024-05-02 tea 3.50")).unwrap();

        assert_eq!(
            svc.list_sales().unwrap(),
            "Date: 2024-05-01, Item: coffee cake, Local: 15000, Foreign: -\n\
             Date: 2024-05-02, Item: tea, Local: -, Foreign: 3.50"
        );
        assert_eq!(
            svc.delete_sale(&args("2024-05-02 tea 3.5")).unwrap(),
            "Deleted sale on 2024-05-02: tea - 3.50 USD total"
        );
        assert_eq!(svc.delete_sale(&args("2024-05-02 tea 3.5")), Err(LedgerError::RecordNotFound));
    }

    #[test]
    fn test_monthly_and_reset_messages() {
        let svc = service();
        svc.record_local_sale(&args("2024-12-31 cake 100")).unwrap();
        assert_eq!(svc.monthly_sales(&args("2024 12")).unwrap(), "Sales for 2024-12: 100 KRW, 0.00 USD");
        assert_eq!(svc.monthly_sales(&args("2025 1")).unwrap(), "Sales for 2025-01: 0 KRW, 0.00 USD");
        assert_eq!(svc.monthly_sales(&args("2024 13")), Err(LedgerError::InvalidMonth("13".to_string())));

        assert_eq!(svc.reset_all().unwrap(), "All sales records have been reset.");
        assert_eq!(svc.total_sales().unwrap(), "Total sales: 0 KRW, 0.00 USD");
    }
}
