mod common;

use common::{draft, engine_with_store, seed_header};
use pos_service::error::PosError;
use pos_service::services::{PosEngine, ReprintOutcome, ReprintState};
use pos_service::store::{paths, MemoryStore, RecordStore};
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Numbering bootstrap
// =============================================================================

#[tokio::test]
async fn empty_store_starts_at_invoice_one() {
    let (engine, _store) = engine_with_store().await;

    assert_eq!(engine.invoice_no(), 1);
    assert!(engine.cart().is_empty());
    assert!(engine.cached_history().is_empty());
}

#[tokio::test]
async fn bootstrap_continues_after_highest_invoice() {
    let store = Arc::new(MemoryStore::new());
    for no in [3, 5, 7] {
        seed_header(&store, no, 10).await;
    }

    let engine = PosEngine::start(store.clone() as Arc<dyn RecordStore>)
        .await
        .expect("Failed to start engine");

    assert_eq!(engine.invoice_no(), 8);
    let history: Vec<u64> = engine
        .cached_history()
        .iter()
        .map(|h| h.invoice_no)
        .collect();
    assert_eq!(history, vec![7, 5, 3]);
}

// =============================================================================
// Commit
// =============================================================================

#[tokio::test]
async fn commit_writes_header_and_detail_records() {
    let (mut engine, store) = engine_with_store().await;
    engine
        .add_line(&draft("Rice 5kg", "100", "2", "10"))
        .expect("line should be accepted");

    let receipt = engine.checkout("200").await.expect("commit should succeed");

    assert_eq!(receipt.invoice_no, 1);
    assert_eq!(receipt.detail_count, 1);
    assert_eq!(receipt.header.total_price, Decimal::from(190));
    assert_eq!(receipt.header.balance, Decimal::from(10));

    let header = store
        .snapshot(&paths::header_path(1))
        .await
        .expect("header should be stored");
    assert_eq!(header["InvoiceNo"].as_u64(), Some(1));
    assert_eq!(header["TotalPrice"].as_f64(), Some(190.0));
    assert_eq!(header["PaidAmount"].as_f64(), Some(200.0));
    assert_eq!(header["Balance"].as_f64(), Some(10.0));
    assert_eq!(header["DiscountPrice"].as_f64(), Some(10.0));
    assert_eq!(header["ProductCount"].as_u64(), Some(1));
    assert_eq!(header["IsPrinted"], false);
    assert_eq!(header["IsHold"], false);
    assert!(header["InvoiceSysDate"]
        .as_str()
        .is_some_and(|s| s.ends_with('Z')));

    let detail = store
        .snapshot(&paths::detail_path(1, 1))
        .await
        .expect("detail should be stored");
    assert_eq!(detail["ProductName"], "Rice 5kg");
    assert_eq!(detail["ProductTotalPrice"].as_f64(), Some(190.0));
    assert_eq!(detail["ProductQty"].as_f64(), Some(2.0));

    // Cart advanced to the next invoice
    assert_eq!(engine.invoice_no(), 2);
    assert!(engine.cart().is_empty());
    assert_eq!(engine.cart().next_line_id(), 1);
}

#[tokio::test]
async fn committed_invoice_heads_history() {
    let (mut engine, _store) = engine_with_store().await;

    for paid in ["50", "75"] {
        engine
            .add_line(&draft("Soap", "25", "2", ""))
            .expect("line should be accepted");
        engine.checkout(paid).await.expect("commit should succeed");
    }

    let history = engine.list_history().await.expect("history should load");
    let numbers: Vec<u64> = history.iter().map(|h| h.invoice_no).collect();
    assert_eq!(numbers, vec![2, 1]);
    assert_eq!(history[0].paid_amount, Decimal::from(75));
    assert_eq!(history[0].line_count, 1);
    assert!(!history[0].is_printed);
}

#[tokio::test]
async fn invalid_paid_amount_leaves_cart_and_store_untouched() {
    let (mut engine, store) = engine_with_store().await;
    engine
        .add_line(&draft("Tea", "40", "1", "0"))
        .expect("line should be accepted");

    for paid in ["", "abc", "0", "-5"] {
        let err = engine.checkout(paid).await.unwrap_err();
        assert!(matches!(err, PosError::Validation(_)), "paid {:?}", paid);
    }

    assert_eq!(engine.invoice_no(), 1);
    assert_eq!(engine.cart().line_count(), 1);
    assert_eq!(store.full_write_count(), 0);
}

#[tokio::test]
async fn empty_cart_commits_zero_total_invoice() {
    let (mut engine, store) = engine_with_store().await;

    let receipt = engine.checkout("5").await.expect("commit should succeed");

    assert_eq!(receipt.detail_count, 0);
    assert_eq!(receipt.header.total_price, Decimal::ZERO);
    assert_eq!(receipt.header.balance, Decimal::from(5));
    assert!(store.snapshot(&paths::detail_collection_path(1)).await.is_none());
    assert_eq!(engine.invoice_no(), 2);
}

#[tokio::test]
async fn retry_after_partial_failure_converges() {
    let (mut engine, store) = engine_with_store().await;
    engine
        .add_line(&draft("Milk", "30", "2", "0"))
        .expect("line should be accepted");
    engine
        .add_line(&draft("Bread", "45", "1", "5"))
        .expect("line should be accepted");

    // Header lands, first detail fails
    store.fail_nth_write(2);
    let err = engine.checkout("200").await.unwrap_err();
    assert!(matches!(err, PosError::Store(_)));

    assert!(store.snapshot(&paths::header_path(1)).await.is_some());
    assert!(store.snapshot(&paths::detail_path(1, 1)).await.is_none());

    // Cart is kept intact for the retry
    assert_eq!(engine.invoice_no(), 1);
    assert_eq!(engine.cart().line_count(), 2);

    store.clear_failure();
    let receipt = engine.checkout("200").await.expect("retry should succeed");
    assert_eq!(receipt.invoice_no, 1);

    let details = store
        .snapshot(&paths::detail_collection_path(1))
        .await
        .expect("details should be stored");
    let keys: Vec<&String> = details.as_object().expect("object").keys().collect();
    assert_eq!(keys.len(), 2);
    assert!(details.get("item1").is_some());
    assert!(details.get("item2").is_some());

    let header = store.snapshot(&paths::header_path(1)).await.unwrap();
    assert_eq!(header["TotalPrice"].as_f64(), Some(100.0));
    assert_eq!(header["ProductCount"].as_u64(), Some(2));
}

#[tokio::test]
async fn failed_history_refresh_does_not_undo_commit() {
    let (mut engine, store) = engine_with_store().await;
    engine
        .add_line(&draft("Oil", "120", "1", "0"))
        .expect("line should be accepted");

    // Commit only writes; the first read is the history refresh afterwards.
    store.fail_nth_read(1);
    let receipt = engine.checkout("150").await.expect("commit should succeed");

    assert_eq!(receipt.invoice_no, 1);
    assert!(store.snapshot(&paths::header_path(1)).await.is_some());
    assert_eq!(engine.invoice_no(), 2);
    assert!(engine.cart().is_empty());
    assert!(engine
        .cached_history()
        .iter()
        .all(|h| h.invoice_no != 1));

    // The next refresh catches up
    let history = engine.list_history().await.expect("history should load");
    assert_eq!(history[0].invoice_no, 1);
}

// =============================================================================
// Cart operations through the engine
// =============================================================================

#[tokio::test]
async fn draft_add_clears_only_on_success() {
    let (mut engine, _store) = engine_with_store().await;

    *engine.draft_mut() = draft("Sugar", "oops", "1", "0");
    let err = engine.add_draft_line().unwrap_err();
    assert!(matches!(err, PosError::Validation(_)));
    assert_eq!(engine.draft().name, "Sugar");
    assert_eq!(engine.cart().next_line_id(), 1);

    engine.draft_mut().rate = "12.50".to_string();
    let line = engine.add_draft_line().expect("line should be accepted");
    assert_eq!(line.id(), 1);
    assert_eq!(engine.draft().name, "");
    assert_eq!(engine.draft().qty, "1");
    assert_eq!(engine.total_price(), line.amount());
}

#[tokio::test]
async fn totals_track_edits_and_deletes() {
    let (mut engine, _store) = engine_with_store().await;
    engine.add_line(&draft("A", "10", "3", "0")).unwrap();
    engine.add_line(&draft("B", "20", "1", "5")).unwrap();
    engine.add_line(&draft("C", "7", "2", "0")).unwrap();

    engine.edit_line(2, "20", "2", "0").unwrap();
    assert!(engine.delete_line(3));
    assert!(!engine.delete_line(3));

    let sum: Decimal = engine.cart().lines().iter().map(|l| l.amount()).sum();
    assert_eq!(engine.total_price(), sum);
    assert_eq!(engine.total_price(), Decimal::from(70));
    assert_eq!(engine.balance(Decimal::from(100)).unwrap(), Decimal::from(30));

    let err = engine.edit_line(9, "1", "1", "0").unwrap_err();
    assert!(matches!(err, PosError::NotFound(_)));
}

// =============================================================================
// View and reprint
// =============================================================================

#[tokio::test]
async fn view_invoice_loads_sorted_details() {
    let (mut engine, _store) = engine_with_store().await;
    engine.add_line(&draft("First", "1", "1", "0")).unwrap();
    engine.add_line(&draft("Second", "2", "1", "0")).unwrap();
    engine.checkout("10").await.unwrap();

    let view = engine.view_invoice(1).await.expect("invoice should open");

    assert_eq!(view.header.invoice_no, 1);
    let ids: Vec<u32> = view.details.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(view.details[1].product_name, "Second");
    assert_eq!(
        engine.reprint_state(),
        ReprintState::Viewing { invoice_no: 1 }
    );
}

#[tokio::test]
async fn view_invoice_without_details_is_empty() {
    let store = Arc::new(MemoryStore::new());
    seed_header(&store, 4, 20).await;
    let mut engine = PosEngine::start(store.clone() as Arc<dyn RecordStore>)
        .await
        .unwrap();

    let view = engine.view_invoice(4).await.expect("invoice should open");
    assert!(view.details.is_empty());
}

#[tokio::test]
async fn view_picks_up_invoices_committed_elsewhere() {
    let (mut engine, store) = engine_with_store().await;
    seed_header(&store, 9, 20).await;

    let view = engine.view_invoice(9).await.expect("refresh should find it");
    assert_eq!(view.header.invoice_no, 9);
}

#[tokio::test]
async fn view_unknown_invoice_is_not_found() {
    let (mut engine, _store) = engine_with_store().await;

    let err = engine.view_invoice(42).await.unwrap_err();
    assert!(matches!(err, PosError::NotFound(_)));
    assert_eq!(engine.reprint_state(), ReprintState::Idle);
}

#[tokio::test]
async fn reprint_writes_once_per_view() {
    let (mut engine, store) = engine_with_store().await;
    engine.add_line(&draft("Pen", "5", "1", "0")).unwrap();
    engine.checkout("5").await.unwrap();

    engine.view_invoice(1).await.unwrap();

    let first = engine.request_reprint().await.unwrap();
    assert_eq!(first, ReprintOutcome::Marked(1));
    assert_eq!(store.field_write_count(), 1);

    let second = engine.request_reprint().await.unwrap();
    assert_eq!(second, ReprintOutcome::Ignored);
    assert_eq!(store.field_write_count(), 1);
    assert_eq!(
        engine.reprint_state(),
        ReprintState::Reprinted { invoice_no: 1 }
    );

    let header = store.snapshot(&paths::header_path(1)).await.unwrap();
    assert_eq!(header["IsPrinted"], true);
    // Partial update keeps the rest of the header
    assert_eq!(header["TotalPrice"].as_f64(), Some(5.0));

    // Re-opening re-arms the guard and shows the new flag
    let view = engine.view_invoice(1).await.unwrap();
    assert!(view.header.is_printed);
    assert_eq!(
        engine.request_reprint().await.unwrap(),
        ReprintOutcome::Marked(1)
    );
    assert_eq!(store.field_write_count(), 2);
}

#[tokio::test]
async fn reprint_without_open_invoice_is_ignored() {
    let (mut engine, store) = engine_with_store().await;

    assert_eq!(
        engine.request_reprint().await.unwrap(),
        ReprintOutcome::Ignored
    );

    seed_header(&store, 1, 10).await;
    engine.view_invoice(1).await.unwrap();
    engine.close_view();
    assert_eq!(
        engine.request_reprint().await.unwrap(),
        ReprintOutcome::Ignored
    );
    assert_eq!(store.field_write_count(), 0);
}

#[tokio::test]
async fn failed_reprint_stays_viewing() {
    let (mut engine, store) = engine_with_store().await;
    seed_header(&store, 1, 10).await;
    engine.view_invoice(1).await.unwrap();

    store.fail_nth_write(1);
    let err = engine.request_reprint().await.unwrap_err();
    assert!(matches!(err, PosError::Store(_)));
    assert_eq!(
        engine.reprint_state(),
        ReprintState::Viewing { invoice_no: 1 }
    );

    store.clear_failure();
    assert_eq!(
        engine.request_reprint().await.unwrap(),
        ReprintOutcome::Marked(1)
    );
}
