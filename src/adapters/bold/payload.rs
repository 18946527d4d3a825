use {
    crate::domain::{
        error::ParseError,
        event::{EventKind, PaymentEvent, PaymentEventParams},
        id::TransactionId,
        money::{Currency, Money},
    },
    rust_decimal::Decimal,
    serde::Deserialize,
};

#[derive(Debug, Deserialize)]
struct BoldWebhook {
    event: String,
    data: BoldTransaction,
}

#[derive(Debug, Deserialize)]
struct BoldTransaction {
    id: String,
    status: String,
    amount: Decimal,
    currency: String,
    reference: String,
    #[serde(default)]
    status_reason: Option<String>,
}

pub const SUPPORTED_EVENTS: [&str; 5] = [
    "transaction.approved",
    "transaction.failed",
    "transaction.pending",
    "transaction.rejected",
    "transaction.voided",
];

pub fn event_kind(event: &str) -> EventKind {
    match event {
        "transaction.approved" => EventKind::Approved,
        "transaction.failed" => EventKind::Failed,
        "transaction.pending" => EventKind::Pending,
        "transaction.rejected" => EventKind::Rejected,
        "transaction.voided" => EventKind::Voided,
        _ => EventKind::Unknown,
    }
}

/// Decode a verified Bold payload. Unknown event names are not an error.
pub fn parse(raw_body: &[u8]) -> Result<PaymentEvent, ParseError> {
    let webhook: BoldWebhook = serde_json::from_slice(raw_body)?;
    let data = webhook.data;

    let kind = event_kind(&webhook.event);
    if kind == EventKind::Unknown {
        tracing::info!(event = %webhook.event, "unrecognised event name");
    }

    let currency = Currency::try_from(data.currency.as_str())?;

    Ok(PaymentEvent::new(PaymentEventParams {
        kind,
        event_name: webhook.event,
        transaction_id: TransactionId::new(data.id)?,
        status: data.status,
        money: Money::new(data.amount, currency)?,
        reference: data.reference,
        status_reason: data.status_reason,
    }))
}
