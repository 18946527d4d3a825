use {
    derive_more::Display,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use super::error::ParseError;

/// Provider-side transaction identifier (`data.id` in the Bold payload).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Result<Self, ParseError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParseError::MalformedPayload(
                "transaction id must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Handle for one connected real-time listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}
