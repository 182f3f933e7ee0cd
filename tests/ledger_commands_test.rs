//! Ledger command integration tests
//! Run with: cargo test --test ledger_commands_test

use std::sync::{Arc, Once};

use rust_decimal_macros::dec;
use sales_ledger_bot::application::messaging::MessageDispatcher;
use sales_ledger_bot::application::services::{CommandService, LedgerService};
use sales_ledger_bot::domain::entities::{Currencies, Money, SalesTotals};
use sales_ledger_bot::domain::traits::SalesLedger;
use sales_ledger_bot::infrastructure::database::SqliteLedger;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn dispatcher_for(ledger: Arc<dyn SalesLedger>) -> MessageDispatcher {
    let mut commands = CommandService::new("!");
    commands.register_defaults();
    commands.register_ledger_commands(Arc::new(LedgerService::new(ledger, Currencies::default())));
    MessageDispatcher::new(commands)
}

fn send(dispatcher: &MessageDispatcher, text: &str) -> String {
    dispatcher.process_text("test-chat", text).expect("command should be answered")
}

#[test]
fn test_record_total_delete_scenario() {
    ensure_init();

    let ledger: Arc<dyn SalesLedger> = Arc::new(SqliteLedger::in_memory().expect("ledger"));
    let bot = dispatcher_for(Arc::clone(&ledger));

    send(&bot, "!record-local-sale 2024-05-01 coffee cake 15000");
    send(&bot, "!record-foreign-sale 2024-05-02 tea 3.50");
    assert_eq!(send(&bot, "!total-sales"), "Total sales: 15000 KRW, 3.50 USD");
    assert_eq!(ledger.sum_all().unwrap(), SalesTotals { local: 15000, foreign: dec!(3.50) });

    assert_eq!(
        send(&bot, "!delete-sale 2024-05-01 coffee cake 15000"),
        "Deleted sale on 2024-05-01: coffee cake - 15000 KRW total"
    );
    assert_eq!(send(&bot, "!total-sales"), "Total sales: 0 KRW, 3.50 USD");

    assert_eq!(
        send(&bot, "!delete-sale 2024-05-01 coffee cake 15000"),
        "No matching sale found; check the date, items and amount"
    );
    assert_eq!(ledger.list_all().unwrap().len(), 1);
}

#[test]
fn test_invalid_amount_leaves_ledger_unchanged() {
    ensure_init();

    let ledger: Arc<dyn SalesLedger> = Arc::new(SqliteLedger::in_memory().expect("ledger"));
    let bot = dispatcher_for(Arc::clone(&ledger));

    send(&bot, "!record-local-sale 2024-05-01 bread 3000");
    assert_eq!(
        send(&bot, "!record-local-sale 2024-05-01 coffee abc"),
        "Invalid amount 'abc': expected a number greater than zero"
    );
    assert_eq!(
        send(&bot, "!record-local-sale 05-01-2024 coffee 10"),
        "Invalid date '05-01-2024': expected YYYY-MM-DD"
    );
    assert_eq!(ledger.list_all().unwrap().len(), 1);
}

#[test]
fn test_korean_aliases_and_monthly_totals() {
    ensure_init();

    let ledger: Arc<dyn SalesLedger> = Arc::new(SqliteLedger::in_memory().expect("ledger"));
    let bot = dispatcher_for(Arc::clone(&ledger));

    send(&bot, "!원화판매 2024-12-31 cake 100");
    send(&bot, "!달러판매 2025-01-01 tea 2");
    send(&bot, "!원화판매 2025-01-15 bread 250");

    assert_eq!(send(&bot, "!월별매출 2024 12"), "Sales for 2024-12: 100 KRW, 0.00 USD");
    assert_eq!(send(&bot, "!월별매출 2025 1"), "Sales for 2025-01: 250 KRW, 2.00 USD");
    assert_eq!(send(&bot, "!월별매출 2025 13"), "Month must be between 1 and 12, got 13");

    let listing = send(&bot, "!데이터");
    assert_eq!(listing.lines().count(), 3);
    assert!(listing.starts_with("Date: 2024-12-31, Item: cake, Local: 100, Foreign: -"));

    assert_eq!(send(&bot, "!초기화"), "All sales records have been reset.");
    assert_eq!(send(&bot, "!총매출"), "Total sales: 0 KRW, 0.00 USD");
    assert_eq!(send(&bot, "!데이터"), "No sales records stored.");
}

#[test]
fn test_overflowing_totals_reply_with_error() {
    ensure_init();

    let ledger: Arc<dyn SalesLedger> = Arc::new(SqliteLedger::in_memory().expect("ledger"));
    let bot = dispatcher_for(Arc::clone(&ledger));

    send(&bot, "!record-foreign-sale 2024-05-01 gold 79228162514264337593543950335");
    send(&bot, "!record-foreign-sale 2024-05-02 gold 79228162514264337593543950335");
    assert_eq!(send(&bot, "!total-sales"), "Sales total is too large to compute");
    assert_eq!(send(&bot, "!monthly-sales 2024 5"), "Sales total is too large to compute");

    send(&bot, "!record-local-sale 2024-06-01 land 9223372036854775807");
    send(&bot, "!record-local-sale 2024-06-02 land 1");
    assert_eq!(send(&bot, "!monthly-sales 2024 6"), "Sales total is too large to compute");

    // later commands are still served by the same store
    assert_eq!(send(&bot, "!reset-all"), "All sales records have been reset.");
    send(&bot, "!record-local-sale 2024-07-01 tea 500");
    assert_eq!(send(&bot, "!total-sales"), "Total sales: 500 KRW, 0.00 USD");
}

#[test]
fn test_storage_failure_is_reported_and_recovers() {
    ensure_init();

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("sales.db");
    let ledger: Arc<dyn SalesLedger> = Arc::new(SqliteLedger::new(&path).expect("open ledger"));
    let bot = dispatcher_for(Arc::clone(&ledger));
    send(&bot, "!record-local-sale 2024-05-01 bread 3000");

    let other = rusqlite::Connection::open(&path).expect("second connection");
    other.execute("DROP TABLE sales", []).expect("drop table");

    let reply = send(&bot, "!total-sales");
    assert!(reply.starts_with("Storage unavailable:"), "unexpected reply: {reply}");
    let reply = send(&bot, "!record-local-sale 2024-05-02 milk 1200");
    assert!(reply.starts_with("Storage unavailable:"), "unexpected reply: {reply}");
    assert_eq!(send(&bot, "!version"), format!("sales-ledger-bot v{}", env!("CARGO_PKG_VERSION")));

    // reopening recreates the table; the first handle keeps working
    drop(SqliteLedger::new(&path).expect("recreate schema"));
    assert_eq!(
        send(&bot, "!record-local-sale 2024-05-02 milk 1200"),
        "Recorded on 2024-05-02: milk - 1200 KRW total"
    );
    assert_eq!(send(&bot, "!total-sales"), "Total sales: 1200 KRW, 0.00 USD");
}

#[test]
fn test_ledger_survives_reopen() {
    ensure_init();

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("sales.db");
    let first_id = {
        let ledger = SqliteLedger::new(&path).expect("open ledger");
        let saved = ledger
            .record_foreign_sale(chrono_date(2024, 3, 1), "honey", dec!(7.10))
            .unwrap();
        ledger.reset().unwrap();
        ledger
            .record_local_sale(chrono_date(2024, 3, 2), "milk", 1200)
            .unwrap();
        saved.id
    };

    let ledger = SqliteLedger::new(&path).expect("reopen ledger");
    let records = ledger.list_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].money, Money::Local(1200));
    assert!(records[0].id > first_id);
}

fn chrono_date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
