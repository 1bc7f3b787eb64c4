// Report engine: filters, ordering and encodings over the in-memory store


use chrono::{Duration, Utc};
use std::sync::Arc;
use test_helpers::*;
use wallet_ledger_api::error::LedgerError;
use wallet_ledger_api::export::ExportFormat;
use wallet_ledger_api::models::WalletId;
use wallet_ledger_api::services::{ReportEngine, ReportQuery, WalletLedger};
use wallet_ledger_api::storage::LedgerStore;

struct Fixture {
    reports: ReportEngine,
    a: WalletId,
    b: WalletId,
}

/// a: deposit 11.99$, then a transfer of 1.00$ to b.
async fn fixture() -> Fixture {
    let store: Arc<dyn LedgerStore> = memory_store();
    let ledger = WalletLedger::new(store.clone(), TEST_TIMEOUT);
    let a = create_test_wallet(&ledger, 1199).await;
    let b = create_test_wallet(&ledger, 0).await;
    ledger.transfer(&a, &b, 100).await.unwrap();

    Fixture {
        reports: ReportEngine::new(store, TEST_TIMEOUT),
        a,
        b,
    }
}

fn query(
    wallet: &WalletId,
    from: Option<String>,
    to: Option<String>,
    op: Option<&str>,
) -> ReportQuery {
    ReportQuery {
        wallet_id: wallet.to_string(),
        operation_type: op.map(Into::into),
        from_date: from,
        to_date: to,
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn tomorrow() -> String {
    (Utc::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_newest_first() {
    let f = fixture().await;
    let ops = f.reports.query(&ReportQuery::for_wallet(f.a.as_str())).await.unwrap();

    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].operation_type.as_str(), "withdraw");
    assert_eq!(ops[1].operation_type.as_str(), "deposit");
    assert!(ops[0].created_at >= ops[1].created_at);
    assert!(ops[0].id > ops[1].id);
}

#[tokio::test]
async fn test_type_filter() {
    let f = fixture().await;
    let ops = f
        .reports
        .query(&query(&f.a, None, None, Some("deposit")))
        .await
        .unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].amount, 1199);

    let ops = f
        .reports
        .query(&query(&f.b, None, None, Some("withdraw")))
        .await
        .unwrap();
    assert!(ops.is_empty());
}

#[tokio::test]
async fn test_same_day_range_includes_today() {
    let f = fixture().await;
    let ops = f
        .reports
        .query(&query(&f.a, Some(today()), Some(today()), None))
        .await
        .unwrap();
    assert_eq!(ops.len(), 2);
}

#[tokio::test]
async fn test_range_starting_tomorrow_is_empty() {
    let f = fixture().await;
    let ops = f
        .reports
        .query(&query(&f.a, Some(tomorrow()), None, None))
        .await
        .unwrap();
    assert!(ops.is_empty());
}

#[tokio::test]
async fn test_tomorrow_only_range_is_empty() {
    let f = fixture().await;
    for wallet in [&f.a, &f.b] {
        let ops = f
            .reports
            .query(&query(wallet, Some(tomorrow()), Some(tomorrow()), None))
            .await
            .unwrap();
        assert!(ops.is_empty());
    }
}

#[tokio::test]
async fn test_open_ended_ranges() {
    let f = fixture().await;
    let until_tomorrow = f
        .reports
        .query(&query(&f.a, None, Some(tomorrow()), None))
        .await
        .unwrap();
    assert_eq!(until_tomorrow.len(), 2);

    let from_today = f
        .reports
        .query(&query(&f.a, Some(today()), None, Some("withdraw")))
        .await
        .unwrap();
    assert_eq!(from_today.len(), 1);
}

#[tokio::test]
async fn test_invalid_filters() {
    let f = fixture().await;

    assert!(matches!(
        f.reports.query(&query(&f.a, Some(tomorrow()), Some(today()), None)).await,
        Err(LedgerError::InvalidDateRange)
    ));
    assert!(matches!(
        f.reports.query(&query(&f.a, Some("yesterday".into()), None, None)).await,
        Err(LedgerError::InvalidDateFormat { field: "from_date" })
    ));
    assert!(matches!(
        f.reports.query(&query(&f.a, None, None, Some("refund"))).await,
        Err(LedgerError::InvalidOperationType(_))
    ));
}

#[tokio::test]
async fn test_unknown_wallet_has_empty_report() {
    let f = fixture().await;
    let ops = f.reports.query(&ReportQuery::for_wallet("nobody")).await.unwrap();
    assert!(ops.is_empty());
}

#[tokio::test]
async fn test_csv_export() {
    let f = fixture().await;
    let bytes = f
        .reports
        .export(&ReportQuery::for_wallet(f.a.as_str()), ExportFormat::Csv)
        .await
        .unwrap();

    let expected = format!(
        "wallet_id,operation_id,amount,date\n{a},withdraw,1.00$,{d}\n{a},deposit,11.99$,{d}\n",
        a = f.a,
        d = today()
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[tokio::test]
async fn test_json_export() {
    let f = fixture().await;
    let bytes = f
        .reports
        .export(&ReportQuery::for_wallet(f.b.as_str()), ExportFormat::Json)
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "wallet_id": f.b.to_string(),
            "operation_type": "deposit",
            "amount": "1.00$",
            "date": today(),
        }])
    );
}

#[tokio::test]
async fn test_empty_exports() {
    let f = fixture().await;
    let filtered = query(&f.a, Some(tomorrow()), None, None);

    let csv = f.reports.export(&filtered, ExportFormat::Csv).await.unwrap();
    assert!(csv.is_empty());

    let json = f.reports.export(&filtered, ExportFormat::Json).await.unwrap();
    assert_eq!(json, b"[]");
}
