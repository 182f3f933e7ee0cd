use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use crate::application::errors::LedgerError;
use crate::domain::entities::{Money, SaleRecord, SalesTotals};
use crate::domain::traits::SalesLedger;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw `sales` row before the currency columns are folded into `Money`
type SaleRow = (i64, String, String, Option<i64>, Option<String>);

/// SQLite-backed sales ledger
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LedgerError> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_tables()?;
        Ok(db)
    }

    fn init_tables(&self) -> Result<(), LedgerError> {
        self.lock()?.execute(
            "CREATE TABLE IF NOT EXISTS sales (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                item TEXT NOT NULL,
                price_in_local INTEGER,
                price_in_foreign TEXT,
                CHECK ((price_in_local IS NULL) <> (price_in_foreign IS NULL))
            )",
            [],
        )?;

        self.lock()?.execute(
            "CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(date)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::StorageUnavailable("Lock poisoned".to_string()))
    }

    fn money_from_columns(id: i64, local: Option<i64>, foreign: Option<String>) -> Result<Money, LedgerError> {
        match (local, foreign) {
            (Some(amount), None) => Ok(Money::Local(amount)),
            (None, Some(text)) => Decimal::from_str(&text)
                .map(Money::Foreign)
                .map_err(|e| LedgerError::StorageUnavailable(format!("sale {} has unreadable amount: {}", id, e))),
            _ => Err(LedgerError::StorageUnavailable(format!(
                "sale {} does not carry exactly one currency",
                id
            ))),
        }
    }

    fn record_from_row(row: SaleRow) -> Result<SaleRecord, LedgerError> {
        let (id, date, item, local, foreign) = row;
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| LedgerError::StorageUnavailable(format!("sale {} has unreadable date: {}", id, e)))?;
        Ok(SaleRecord {
            id,
            date,
            item,
            money: Self::money_from_columns(id, local, foreign)?,
        })
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SaleRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    /// Sum amounts of rows whose date lies in `[from, until)`; open ends are NULL
    fn sum_between(&self, from: Option<String>, until: Option<String>) -> Result<SalesTotals, LedgerError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, price_in_local, price_in_foreign FROM sales
             WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date < ?2)",
        )?;

        let rows = stmt.query_map(params![from, until], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?, row.get::<_, Option<String>>(2)?))
        })?;

        let mut totals = SalesTotals::default();
        for row in rows {
            let (id, local, foreign) = row?;
            let money = Self::money_from_columns(id, local, foreign)?;
            totals = totals.checked_add(&money).ok_or(LedgerError::TotalOverflow)?;
        }
        Ok(totals)
    }
}

/// First day of the month and of the following month, formatted for comparison
fn month_bounds(year: i32, month: u32) -> Option<(String, Option<String>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    Some((
        start.format(DATE_FORMAT).to_string(),
        next.map(|d| d.format(DATE_FORMAT).to_string()),
    ))
}

impl SalesLedger for SqliteLedger {
    fn record(&self, date: NaiveDate, item: &str, money: Money) -> Result<SaleRecord, LedgerError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sales (date, item, price_in_local, price_in_foreign) VALUES (?1, ?2, ?3, ?4)",
            params![
                date.format(DATE_FORMAT).to_string(),
                item,
                money.local(),
                money.foreign().map(|d| d.to_string())
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!("Inserted sale {} ({} {})", id, date, item);

        Ok(SaleRecord {
            id,
            date,
            item: item.to_string(),
            money,
        })
    }

    fn delete_exact(&self, date: NaiveDate, item: &str, amount: Decimal) -> Result<SaleRecord, LedgerError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let candidates = {
            let mut stmt = tx.prepare(
                "SELECT id, date, item, price_in_local, price_in_foreign FROM sales
                 WHERE date = ?1 AND item = ?2 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string(), item], Self::read_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut target = None;
        for row in candidates {
            let record = Self::record_from_row(row)?;
            if record.money.matches(amount) {
                target = Some(record);
                break;
            }
        }
        let record = target.ok_or(LedgerError::RecordNotFound)?;

        tx.execute("DELETE FROM sales WHERE id = ?1", [record.id])?;
        tx.commit()?;
        tracing::debug!("Deleted sale {}", record.id);

        Ok(record)
    }

    fn sum_all(&self) -> Result<SalesTotals, LedgerError> {
        self.sum_between(None, None)
    }

    fn sum_for_month(&self, year: i32, month: u32) -> Result<SalesTotals, LedgerError> {
        match month_bounds(year, month) {
            Some((start, end)) => self.sum_between(Some(start), end),
            None => Ok(SalesTotals::default()),
        }
    }

    fn list_all(&self) -> Result<Vec<SaleRecord>, LedgerError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, date, item, price_in_local, price_in_foreign FROM sales ORDER BY id",
        )?;

        let rows = stmt.query_map([], Self::read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::record_from_row(row?)?);
        }
        Ok(records)
    }

    fn reset(&self) -> Result<usize, LedgerError> {
        let removed = self.lock()?.execute("DELETE FROM sales", [])?;
        tracing::debug!("Reset ledger, removed {} sales", removed);
        Ok(removed)
    }
}
