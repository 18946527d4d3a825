use {
    crate::{
        domain::{
            broadcast::BroadcastMessage,
            error::HandlerFailure,
            event::{EventKind, PaymentEvent},
            ledger::{Ledger, LedgerOutcome},
            reference::{self, Intent, PaymentReference},
        },
        services::notifier::Notifier,
    },
    futures::FutureExt,
    std::{any::Any, panic::AssertUnwindSafe, sync::Arc},
};

/// What happened to the ledger while handling one event.
#[derive(Debug)]
pub enum LedgerStep {
    /// Only `approved` events touch the ledger.
    NotApplicable,
    Applied,
    /// Transaction id already credited by an earlier delivery.
    Duplicate,
    /// Reference intent unrecognised; nothing to credit.
    Skipped,
    Failed(HandlerFailure),
}

impl LedgerStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "not_applicable",
            Self::Applied => "applied",
            Self::Duplicate => "duplicate",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub struct Dispatched {
    pub kind: EventKind,
    pub ledger: LedgerStep,
    pub notified: usize,
}

/// Routes a verified event to its handler. Handlers never fail outward:
/// ledger errors are logged and the broadcast still goes out.
#[derive(Clone)]
pub struct Dispatcher {
    ledger: Arc<dyn Ledger>,
    notifier: Notifier,
}

impl Dispatcher {
    pub fn new(ledger: Arc<dyn Ledger>, notifier: Notifier) -> Self {
        Self { ledger, notifier }
    }

    #[tracing::instrument(
        name = "dispatch",
        skip_all,
        fields(event = %event.kind(), transaction_id = %event.transaction_id())
    )]
    pub async fn dispatch(&self, event: &PaymentEvent) -> Dispatched {
        let ledger = match event.kind() {
            EventKind::Approved => self.on_approved(event).await,
            EventKind::Failed => {
                let reference = reference::decode(event.reference());
                tracing::info!(
                    intent = %reference.intent,
                    reason = event.status_reason().unwrap_or("unknown"),
                    "transaction failed"
                );
                LedgerStep::NotApplicable
            }
            EventKind::Pending | EventKind::Rejected | EventKind::Voided => {
                tracing::info!(reference = %event.reference(), "transaction {}", event.kind());
                LedgerStep::NotApplicable
            }
            EventKind::Unknown => {
                tracing::info!(event_name = %event.event_name(), "unhandled event, ignoring");
                metrics::counter!("webhook_dispatch_total", "event" => "unknown", "outcome" => "ignored")
                    .increment(1);
                return Dispatched {
                    kind: EventKind::Unknown,
                    ledger: LedgerStep::NotApplicable,
                    notified: 0,
                };
            }
        };

        let notified = BroadcastMessage::for_event(event)
            .map(|message| self.notifier.broadcast(&message))
            .unwrap_or_default();

        metrics::counter!(
            "webhook_dispatch_total",
            "event" => event.kind().as_str(),
            "outcome" => ledger.as_str()
        )
        .increment(1);

        Dispatched {
            kind: event.kind(),
            ledger,
            notified,
        }
    }

    async fn on_approved(&self, event: &PaymentEvent) -> LedgerStep {
        let reference = reference::decode(event.reference());
        tracing::info!(
            amount = %event.money(),
            intent = %reference.intent,
            target_id = %reference.target_id,
            "transaction approved"
        );

        let credit = AssertUnwindSafe(self.apply_credit(event, &reference))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerFailure::Panicked(panic_message(panic.as_ref()))));

        match credit {
            Ok(Some(LedgerOutcome::Applied)) => LedgerStep::Applied,
            Ok(Some(LedgerOutcome::Duplicate)) => {
                tracing::warn!("transaction already credited, duplicate delivery ignored");
                LedgerStep::Duplicate
            }
            Ok(None) => LedgerStep::Skipped,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    intent = %reference.intent,
                    target_id = %reference.target_id,
                    "ledger update failed, needs reconciliation"
                );
                LedgerStep::Failed(e)
            }
        }
    }

    async fn apply_credit(
        &self,
        event: &PaymentEvent,
        reference: &PaymentReference,
    ) -> Result<Option<LedgerOutcome>, HandlerFailure> {
        let txn = event.transaction_id();
        let outcome = match reference.intent {
            Intent::Tip => {
                self.ledger
                    .credit_tip(&reference.target_id, event.money(), txn)
                    .await?
            }
            Intent::Subscription => {
                self.ledger
                    .activate_subscription(&reference.target_id, reference.plan_type(), txn)
                    .await?
            }
            Intent::Tokens => {
                let amount = reference.token_count()?;
                self.ledger
                    .credit_tokens(&reference.target_id, amount, txn)
                    .await?
            }
            Intent::Unrecognized => {
                tracing::warn!(
                    reference = %reference.target_id,
                    "unrecognised payment reference, ledger update skipped"
                );
                return Ok(None);
            }
        };
        Ok(Some(outcome))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".into())
}
