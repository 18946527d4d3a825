#![allow(dead_code)]

use {
    axum::{Router, body::Body, http::Request},
    std::{sync::Arc, time::Duration},
    tokio::sync::mpsc,
    webhook_gate::{
        AppState,
        adapters::bold::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, expected_signature},
        config::Environment,
        domain::{
            error::LedgerError,
            event::PaymentEvent,
            id::TransactionId,
            ledger::{Ledger, LedgerFuture, LedgerOutcome},
            money::Money,
        },
        services::{
            dispatcher::Dispatcher,
            notifier::{ChannelListener, ListenerRegistry, Notifier},
            worker::DispatchQueue,
        },
    },
};

pub const SECRET: &str = "bold_test_secret";

pub fn payload(event: &str, transaction_id: &str, reference: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": event,
        "data": {
            "id": transaction_id,
            "status": "APPROVED",
            "amount": 50000,
            "currency": "COP",
            "reference": reference,
        }
    }))
    .unwrap()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `(x-bold-signature, x-bold-timestamp)` for `body` signed at `ts`.
pub fn sign(body: &[u8], ts: i64) -> (String, String) {
    let ts = ts.to_string();
    let sig = expected_signature(SECRET, &ts, body);
    (format!("t={ts},v1={sig}"), ts)
}

pub fn signed_request(body: Vec<u8>) -> Request<Body> {
    let (sig, ts) = sign(&body, now());
    Request::builder()
        .method("POST")
        .uri("/webhook/bold")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sig)
        .header(TIMESTAMP_HEADER, ts)
        .body(Body::from(body))
        .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub queue: mpsc::Receiver<PaymentEvent>,
    pub dispatcher: Dispatcher,
    pub registry: Arc<ListenerRegistry>,
}

pub fn test_app(ledger: Arc<dyn Ledger>, secret: Option<&str>) -> TestApp {
    let registry = Arc::new(ListenerRegistry::new());
    let dispatcher = Dispatcher::new(ledger, Notifier::new(Arc::clone(&registry)));
    let (dispatch, queue) = DispatchQueue::new(dispatcher.clone(), 16);
    let state = AppState {
        webhook_secret: secret.map(Arc::from),
        environment: Environment::Development,
        dispatch,
        registry: Arc::clone(&registry),
    };
    TestApp {
        router: webhook_gate::router(state, 64 * 1024),
        queue,
        dispatcher,
        registry,
    }
}

pub fn listen(registry: &ListenerRegistry) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    registry.register(Arc::new(ChannelListener::new(tx)));
    rx
}

pub fn dispatcher_with(ledger: Arc<dyn Ledger>) -> (Dispatcher, Arc<ListenerRegistry>) {
    let registry = Arc::new(ListenerRegistry::new());
    (
        Dispatcher::new(ledger, Notifier::new(Arc::clone(&registry))),
        registry,
    )
}

async fn unavailable() -> Result<LedgerOutcome, LedgerError> {
    Err(LedgerError::Unavailable("connection refused".into()))
}

async fn explode() -> Result<LedgerOutcome, LedgerError> {
    panic!("ledger exploded")
}

pub struct FailingLedger;

impl Ledger for FailingLedger {
    fn credit_tip<'a>(
        &'a self,
        _performer_id: &'a str,
        _money: &'a Money,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(unavailable())
    }

    fn activate_subscription<'a>(
        &'a self,
        _user_id: &'a str,
        _plan_type: &'a str,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(unavailable())
    }

    fn credit_tokens<'a>(
        &'a self,
        _user_id: &'a str,
        _amount: u64,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(unavailable())
    }
}

/// Delegates to `inner` after a delay, so a credit is still in flight when
/// the caller starts shutting down.
pub struct SlowLedger<L> {
    pub inner: Arc<L>,
    pub delay: Duration,
}

impl<L: Ledger> Ledger for SlowLedger<L> {
    fn credit_tip<'a>(
        &'a self,
        performer_id: &'a str,
        money: &'a Money,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.credit_tip(performer_id, money, transaction_id).await
        })
    }

    fn activate_subscription<'a>(
        &'a self,
        user_id: &'a str,
        plan_type: &'a str,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner
                .activate_subscription(user_id, plan_type, transaction_id)
                .await
        })
    }

    fn credit_tokens<'a>(
        &'a self,
        user_id: &'a str,
        amount: u64,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.credit_tokens(user_id, amount, transaction_id).await
        })
    }
}

pub struct PanickingLedger;

impl Ledger for PanickingLedger {
    fn credit_tip<'a>(
        &'a self,
        _performer_id: &'a str,
        _money: &'a Money,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(explode())
    }

    fn activate_subscription<'a>(
        &'a self,
        _user_id: &'a str,
        _plan_type: &'a str,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(explode())
    }

    fn credit_tokens<'a>(
        &'a self,
        _user_id: &'a str,
        _amount: u64,
        _transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(explode())
    }
}
