use {
    super::{id::TransactionId, money::Money},
    axum::{body::Bytes, http::HeaderMap},
    chrono::{DateTime, Utc},
    serde::Serialize,
    std::{collections::BTreeMap, fmt},
};

/// One inbound delivery exactly as it arrived. Header names are lower-cased.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    raw_body: Bytes,
    headers: BTreeMap<String, String>,
    received_at: DateTime<Utc>,
}

impl WebhookEnvelope {
    pub fn new(raw_body: Bytes, headers: BTreeMap<String, String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            raw_body,
            headers,
            received_at: Utc::now(),
        }
    }

    /// Non-UTF-8 header values are dropped, which reads as "header absent".
    pub fn from_http(headers: &HeaderMap, raw_body: Bytes) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self::new(raw_body, headers)
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Approved,
    Failed,
    Pending,
    Rejected,
    Voided,
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Voided => "voided",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A verified, decoded payment-state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    kind: EventKind,
    event_name: String,
    transaction_id: TransactionId,
    status: String,
    money: Money,
    reference: String,
    status_reason: Option<String>,
}

pub struct PaymentEventParams {
    pub kind: EventKind,
    pub event_name: String,
    pub transaction_id: TransactionId,
    pub status: String,
    pub money: Money,
    pub reference: String,
    pub status_reason: Option<String>,
}

impl PaymentEvent {
    pub fn new(p: PaymentEventParams) -> Self {
        Self {
            kind: p.kind,
            event_name: p.event_name,
            transaction_id: p.transaction_id,
            status: p.status,
            money: p.money,
            reference: p.reference,
            status_reason: p.status_reason,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The provider's event name as sent, e.g. `transaction.approved`.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }
}
