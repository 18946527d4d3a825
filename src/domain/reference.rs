//! Decoding of the opaque payment reference the initiating side chose at
//! checkout time (`tip_<performer>_<ts>`, `sub_<user>_<plan>`,
//! `tokens_<user>_<count>`).
//!
//! Decoding never fails. A reference we cannot interpret becomes
//! [`Intent::Unrecognized`] so that one odd reference only disables its own
//! domain handling.

use {
    super::error::InvalidTokenAmount,
    serde::Serialize,
    std::fmt,
};

const DELIMITER: char = '_';

/// Trailing tip tokens at least this long and all digits are creation
/// timestamps appended by the checkout page, not part of the performer id.
const TIMESTAMP_MIN_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Tip,
    Subscription,
    Tokens,
    Unrecognized,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Subscription => "subscription",
            Self::Tokens => "tokens",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReference {
    pub intent: Intent,
    pub target_id: String,
    pub extra: Option<String>,
}

impl PaymentReference {
    fn unrecognized(reference: &str) -> Self {
        Self {
            intent: Intent::Unrecognized,
            target_id: reference.to_string(),
            extra: None,
        }
    }

    /// Token count of a `tokens_` reference.
    pub fn token_count(&self) -> Result<u64, InvalidTokenAmount> {
        let raw = self.extra.as_deref().unwrap_or_default();
        raw.parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| InvalidTokenAmount {
                raw: raw.to_string(),
            })
    }

    /// Subscription plan, `monthly` unless the reference names one.
    pub fn plan_type(&self) -> &str {
        self.extra.as_deref().unwrap_or("monthly")
    }
}

fn is_timestamp(token: &str) -> bool {
    token.len() >= TIMESTAMP_MIN_DIGITS && token.bytes().all(|b| b.is_ascii_digit())
}

pub fn decode(reference: &str) -> PaymentReference {
    let tokens: Vec<&str> = reference.split(DELIMITER).collect();

    let decoded = match tokens.as_slice() {
        ["tip", rest @ ..] => {
            let id_tokens = match rest {
                [head @ .., last] if !head.is_empty() && is_timestamp(last) => head,
                all => all,
            };
            Some(PaymentReference {
                intent: Intent::Tip,
                target_id: id_tokens.join("_"),
                extra: None,
            })
        }
        ["sub", user, rest @ ..] => Some(PaymentReference {
            intent: Intent::Subscription,
            target_id: user.to_string(),
            extra: rest.first().filter(|s| !s.is_empty()).map(|s| s.to_string()),
        }),
        ["tokens", user, rest @ ..] => Some(PaymentReference {
            intent: Intent::Tokens,
            target_id: user.to_string(),
            extra: rest.first().map(|s| s.to_string()),
        }),
        _ => None,
    };

    match decoded {
        Some(r) if !r.target_id.is_empty() => r,
        _ => PaymentReference::unrecognized(reference),
    }
}
