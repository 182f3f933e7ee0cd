use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Amount of a single sale, in exactly one of the two currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Money {
    Local(i64),
    Foreign(Decimal),
}

impl Money {
    pub fn local(&self) -> Option<i64> {
        match self {
            Money::Local(amount) => Some(*amount),
            Money::Foreign(_) => None,
        }
    }

    pub fn foreign(&self) -> Option<Decimal> {
        match self {
            Money::Local(_) => None,
            Money::Foreign(amount) => Some(*amount),
        }
    }

    /// Numeric comparison used by exact-match deletes: `15000` matches
    /// `Local(15000)` and `3.5` matches `Foreign(3.50)`.
    pub fn matches(&self, amount: Decimal) -> bool {
        match self {
            Money::Local(value) => Decimal::from(*value) == amount,
            Money::Foreign(value) => *value == amount,
        }
    }
}

/// One persisted sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub item: String,
    pub money: Money,
}

/// Aggregated sums for both currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesTotals {
    pub local: i64,
    pub foreign: Decimal,
}

impl SalesTotals {
    /// Adds one sale to the matching currency; `None` when that sum overflows
    pub fn checked_add(self, money: &Money) -> Option<Self> {
        match money {
            Money::Local(amount) => Some(Self {
                local: self.local.checked_add(*amount)?,
                ..self
            }),
            Money::Foreign(amount) => Some(Self {
                foreign: self.foreign.checked_add(*amount)?,
                ..self
            }),
        }
    }
}

/// Display names for the two currencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currencies {
    pub local: String,
    pub foreign: String,
}

impl Currencies {
    pub fn new(local: impl Into<String>, foreign: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            foreign: foreign.into(),
        }
    }

    pub fn format(&self, money: &Money) -> String {
        match money {
            Money::Local(amount) => format!("{} {}", amount, self.local),
            Money::Foreign(amount) => format!("{} {}", two_places(*amount), self.foreign),
        }
    }

    pub fn format_totals(&self, totals: &SalesTotals) -> String {
        format!(
            "{} {}, {} {}",
            totals.local,
            self.local,
            two_places(totals.foreign),
            self.foreign
        )
    }
}

/// Renders a decimal with exactly two fractional digits
pub fn two_places(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

impl Default for Currencies {
    fn default() -> Self {
        Self::new("KRW", "USD")
    }
}

impl fmt::Display for SaleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self
            .money
            .local()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let foreign = self
            .money
            .foreign()
            .map(two_places)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "Date: {}, Item: {}, Local: {}, Foreign: {}",
            self.date.format("%Y-%m-%d"),
            self.item,
            local,
            foreign
        )
    }
}
