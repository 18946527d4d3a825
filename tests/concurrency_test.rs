mod common;

use {
    common::*,
    rust_decimal::Decimal,
    std::{sync::Arc, time::Duration},
    tokio::sync::watch,
    webhook_gate::{
        adapters::bold::payload::parse,
        domain::money::Currency,
        infra::memory::InMemoryLedger,
        services::{
            dispatcher::LedgerStep,
            worker::{DispatchQueue, run_dispatcher},
        },
    },
};

// 50 distinct tips to one performer at once. No credit may be lost.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tips_to_same_performer_all_land() {
    let ledger = Arc::new(InMemoryLedger::new());
    let (dispatcher, _registry) = dispatcher_with(ledger.clone());

    let mut handles = Vec::new();
    for i in 0..50 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let e = parse(&payload(
                "transaction.approved",
                &format!("txn_conc_{i}"),
                "tip_perf_luna_001",
            ))
            .unwrap();
            dispatcher.dispatch(&e).await
        }));
    }

    for h in handles {
        assert!(matches!(h.await.unwrap().ledger, LedgerStep::Applied));
    }

    let cop = Currency::try_from("COP").unwrap();
    assert_eq!(
        ledger.earnings("perf_luna_001", &cop),
        Decimal::new(50 * 50000, 0)
    );
}

// 10 concurrent redeliveries of one transaction. Exactly one credit.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redeliveries_credit_once() {
    let ledger = Arc::new(InMemoryLedger::new());
    let (dispatcher, _registry) = dispatcher_with(ledger.clone());

    let mut handles = Vec::new();
    for _ in 0..10 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let e = parse(&payload(
                "transaction.approved",
                "txn_same",
                "tokens_user7_100",
            ))
            .unwrap();
            dispatcher.dispatch(&e).await
        }));
    }

    let mut applied = 0;
    let mut duplicates = 0;
    for h in handles {
        match h.await.unwrap().ledger {
            LedgerStep::Applied => applied += 1,
            LedgerStep::Duplicate => duplicates += 1,
            other => panic!("unexpected ledger step: {other:?}"),
        }
    }

    assert_eq!(applied, 1, "exactly 1 applied");
    assert_eq!(duplicates, 9, "9 duplicates");
    assert_eq!(ledger.token_balance("user7"), 100);
}

// Events queued before shutdown are still dispatched.

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_drains_queue_on_shutdown() {
    let ledger = Arc::new(InMemoryLedger::new());
    let (dispatcher, _registry) = dispatcher_with(ledger.clone());
    let (queue, rx) = DispatchQueue::new(dispatcher.clone(), 64);

    for i in 0..20 {
        queue.submit(
            parse(&payload(
                "transaction.approved",
                &format!("txn_drain_{i}"),
                "tokens_user9_1",
            ))
            .unwrap(),
        );
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();
    run_dispatcher(dispatcher, rx, shutdown_rx).await;

    assert_eq!(ledger.token_balance("user9"), 20);
}

// A full queue falls back to an overflow task instead of dropping the event.

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_queue_still_dispatches() {
    let ledger = Arc::new(InMemoryLedger::new());
    let (dispatcher, _registry) = dispatcher_with(ledger.clone());
    let (queue, _rx) = DispatchQueue::new(dispatcher, 1);

    for i in 0..3 {
        queue.submit(
            parse(&payload(
                "transaction.approved",
                &format!("txn_full_{i}"),
                "tokens_user3_1",
            ))
            .unwrap(),
        );
    }

    // One event sits in the unconsumed queue; the other two overflow.
    queue.drain_overflow().await;
    assert_eq!(ledger.token_balance("user3"), 2);
    assert_eq!(queue.overflow_len(), 0);
}

// Overflow credits still in flight at shutdown are awaited, not cancelled.

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_waits_for_overflow_credits() {
    let ledger = Arc::new(InMemoryLedger::new());
    let slow = Arc::new(SlowLedger {
        inner: ledger.clone(),
        delay: Duration::from_millis(200),
    });
    let (dispatcher, _registry) = dispatcher_with(slow);
    let (queue, rx) = DispatchQueue::new(dispatcher.clone(), 1);

    for i in 0..3 {
        queue.submit(
            parse(&payload(
                "transaction.approved",
                &format!("txn_late_{i}"),
                "tokens_user5_1",
            ))
            .unwrap(),
        );
    }
    assert_eq!(queue.overflow_len(), 2);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(run_dispatcher(dispatcher, rx, shutdown_rx));
    shutdown_tx.send(true).unwrap();
    worker.await.unwrap();
    queue.drain_overflow().await;

    assert_eq!(ledger.token_balance("user5"), 3);
    assert_eq!(queue.overflow_len(), 0);
}
