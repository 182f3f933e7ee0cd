//! Argument validation for ledger commands
//!
//! Pure functions turning raw chat tokens into typed values. Nothing here
//! touches the store; every rejection happens before a mutation is attempted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::application::errors::LedgerError;
use crate::domain::entities::Money;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What a sale amount must look like
pub const POSITIVE_AMOUNT: &str = "a number greater than zero";
/// What a delete amount must look like
pub const ANY_AMOUNT: &str = "a number";

/// Numeric form a sale amount must take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    Integer,
    Decimal,
}

/// Validated arguments of a record-sale command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleArgs {
    pub date: NaiveDate,
    pub item: String,
    pub money: Money,
}

/// Validated arguments of a delete command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    pub date: NaiveDate,
    pub item: String,
    pub amount: Decimal,
}

pub fn parse_date(token: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .map_err(|_| LedgerError::InvalidDate(token.to_string()))
}

/// Splits `item... amount` into the joined item text and the amount token
fn split_item_and_amount(trailing: &[String]) -> Result<(&[String], &str), LedgerError> {
    match trailing.split_last() {
        Some((amount, items)) if !items.is_empty() => Ok((items, amount.as_str())),
        _ => Err(LedgerError::TooFewArguments),
    }
}

fn join_item(tokens: &[String]) -> Result<String, LedgerError> {
    let item = tokens.join(" ").trim().to_string();
    if item.is_empty() {
        return Err(LedgerError::EmptyItem);
    }
    Ok(item)
}

fn parse_positive_amount(token: &str, kind: AmountKind) -> Result<Money, LedgerError> {
    let invalid = || LedgerError::InvalidAmount(token.to_string(), POSITIVE_AMOUNT);
    match kind {
        AmountKind::Integer => {
            let amount = token.parse::<i64>().map_err(|_| invalid())?;
            if amount <= 0 {
                return Err(invalid());
            }
            Ok(Money::Local(amount))
        }
        AmountKind::Decimal => {
            let amount = Decimal::from_str(token).map_err(|_| invalid())?;
            if amount <= Decimal::ZERO {
                return Err(invalid());
            }
            Ok(Money::Foreign(amount))
        }
    }
}

/// Validate `date item... amount` for a record-sale command.
///
/// Checks run in order: argument count, date, amount, item.
pub fn validate_sale_args(
    date_token: &str,
    trailing: &[String],
    kind: AmountKind,
) -> Result<SaleArgs, LedgerError> {
    let (items, amount_token) = split_item_and_amount(trailing)?;
    let date = parse_date(date_token)?;
    let money = parse_positive_amount(amount_token, kind)?;
    let item = join_item(items)?;
    Ok(SaleArgs { date, item, money })
}

/// Validate `date item... amount` for a delete command. The amount only has
/// to be numeric; it is compared against whatever value was stored.
pub fn validate_delete_args(date_token: &str, trailing: &[String]) -> Result<DeleteArgs, LedgerError> {
    let (items, amount_token) = split_item_and_amount(trailing)?;
    let date = parse_date(date_token)?;
    let amount = Decimal::from_str(amount_token)
        .map_err(|_| LedgerError::InvalidAmount(amount_token.to_string(), ANY_AMOUNT))?;
    let item = join_item(items)?;
    Ok(DeleteArgs { date, item, amount })
}

/// Range-check a year/month pair for monthly aggregation
pub fn validate_month_args(year: i64, month: i64) -> Result<(i32, u32), LedgerError> {
    if !(1..=12).contains(&month) {
        return Err(LedgerError::InvalidMonth(month.to_string()));
    }
    let year = i32::try_from(year).map_err(|_| LedgerError::InvalidYear(year.to_string()))?;
    Ok((year, month as u32))
}

/// Parse `year month` tokens and validate them
pub fn parse_month_tokens(tokens: &[String]) -> Result<(i32, u32), LedgerError> {
    let [year, month, ..] = tokens else {
        return Err(LedgerError::TooFewArguments);
    };
    let year_value = year
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidYear(year.clone()))?;
    let month_value = month
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidMonth(month.clone()))?;
    validate_month_args(year_value, month_value)
}
