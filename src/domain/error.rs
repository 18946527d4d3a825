use thiserror::Error;

/// Rejections raised before the payload is trusted. All of them fail closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<&'static str>),

    #[error("malformed signature header")]
    MalformedSignature,

    #[error("timestamp {timestamp} is {skew}s away from now")]
    StaleTimestamp { timestamp: i64, skew: i64 },

    #[error("signature mismatch")]
    SignatureMismatch,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

/// Everything that can stop a delivery before it is acknowledged.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("verification: {0}")]
    Verification(#[from] VerificationError),

    #[error("parse: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("validation: {0}")]
    Validation(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid token amount: {raw:?}")]
pub struct InvalidTokenAmount {
    pub raw: String,
}

/// Failure inside a dispatch handler. Logged, never surfaced to the provider.
#[derive(Debug, Error)]
pub enum HandlerFailure {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    InvalidTokenAmount(#[from] InvalidTokenAmount),

    #[error("ledger panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("listener disconnected")]
    Closed,

    #[error("listener rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOLD_WEBHOOK_SECRET must be set when APP_ENV=production")]
    MissingSecret,

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
