use {
    super::{
        event::{EventKind, PaymentEvent},
        id::TransactionId,
    },
    chrono::{DateTime, Utc},
    rust_decimal::Decimal,
    serde::Serialize,
};

/// Envelope pushed to every real-time listener.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    #[serde(rename = "data")]
    pub payload: PaymentUpdate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentUpdate {
    #[serde(rename = "type")]
    pub update_type: &'static str,
    pub transaction_id: TransactionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BroadcastMessage {
    pub const PAYMENT_UPDATE: &'static str = "payment_update";

    /// Normalised update for a handled event kind; `None` for unknown kinds.
    pub fn for_event(event: &PaymentEvent) -> Option<Self> {
        let update_type = match event.kind() {
            EventKind::Approved => "payment_success",
            EventKind::Failed => "payment_failed",
            EventKind::Pending => "payment_pending",
            EventKind::Rejected => "payment_rejected",
            EventKind::Voided => "payment_voided",
            EventKind::Unknown => return None,
        };

        let approved = event.kind() == EventKind::Approved;
        let payload = PaymentUpdate {
            update_type,
            transaction_id: event.transaction_id().clone(),
            amount: approved.then(|| event.money().amount()),
            currency: approved.then(|| event.money().currency().to_string()),
            reference: event.reference().to_string(),
            reason: match event.kind() {
                EventKind::Failed => event.status_reason().map(str::to_string),
                _ => None,
            },
        };

        Some(Self {
            message_type: Self::PAYMENT_UPDATE,
            payload,
            timestamp: Utc::now(),
        })
    }
}
