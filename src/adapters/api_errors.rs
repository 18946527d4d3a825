use crate::domain::error::{ParseError, VerificationError, WebhookError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub struct ApiError(pub WebhookError);

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        Self(err.into())
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WebhookError::Verification(VerificationError::SignatureMismatch) => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::Verification(_) => StatusCode::BAD_REQUEST,
            WebhookError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match &self.0 {
            WebhookError::Verification(e @ VerificationError::MissingHeaders(_)) => {
                ("missing_headers", e.to_string())
            }
            WebhookError::Verification(VerificationError::MalformedSignature) => {
                ("malformed_signature", "invalid signature format".to_string())
            }
            WebhookError::Verification(VerificationError::StaleTimestamp { .. }) => {
                ("stale_timestamp", "webhook timestamp outside the allowed window".to_string())
            }
            WebhookError::Verification(VerificationError::SignatureMismatch) => {
                ("invalid_signature", "invalid signature".to_string())
            }
            WebhookError::Parse(ParseError::MalformedPayload(_)) => {
                ("internal_error", "internal error processing webhook".to_string())
            }
        };

        let mut body = serde_json::json!({
            "error_code": error_code,
            "message": message,
            "timestamp": chrono::Utc::now(),
        });
        if let WebhookError::Verification(VerificationError::MissingHeaders(missing)) = &self.0 {
            body["missing"] = serde_json::json!(missing);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_rejection_kind() {
        let cases = [
            (
                WebhookError::from(VerificationError::MissingHeaders(vec!["x-bold-timestamp"])),
                StatusCode::BAD_REQUEST,
            ),
            (
                VerificationError::MalformedSignature.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                VerificationError::StaleTimestamp {
                    timestamp: 0,
                    skew: 301,
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                VerificationError::SignatureMismatch.into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ParseError::MalformedPayload("eof".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
