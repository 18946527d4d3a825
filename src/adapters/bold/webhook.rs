use {
    super::{payload, signature},
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            error::WebhookError,
            event::{PaymentEvent, WebhookEnvelope},
        },
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
    chrono::{DateTime, Utc},
    serde::Serialize,
};

#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub message: &'static str,
    pub event: String,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Header check, signature check and parse. Whatever this returns decides
/// the HTTP response; nothing after it can change that.
pub fn accept(
    envelope: &WebhookEnvelope,
    secret: Option<&str>,
) -> Result<PaymentEvent, WebhookError> {
    let (signature_header, timestamp_header) = signature::required_headers(envelope)
        .inspect_err(|e| tracing::warn!(error = %e, "rejecting webhook without provider headers"))?;

    signature::verify(envelope.raw_body(), signature_header, timestamp_header, secret)
        .inspect_err(|e| tracing::warn!(error = %e, "webhook signature verification failed"))?;

    let event = payload::parse(envelope.raw_body()).inspect_err(|e| {
        tracing::error!(error = %e, "verified webhook payload could not be parsed")
    })?;

    tracing::info!(
        event = %event.event_name(),
        transaction_id = %event.transaction_id(),
        status = %event.status(),
        amount = %event.money(),
        reference = %event.reference(),
        "webhook accepted"
    );
    Ok(event)
}

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event = tracing::field::Empty, transaction_id = tracing::field::Empty)
)]
pub async fn bold_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Acknowledgement>, ApiError> {
    let envelope = WebhookEnvelope::from_http(&headers, body);

    let event = match accept(&envelope, state.webhook_secret.as_deref()) {
        Ok(event) => event,
        Err(e) => {
            let err = ApiError(e);
            metrics::counter!("webhook_requests_total", "outcome" => err.status().as_str().to_string())
                .increment(1);
            return Err(err);
        }
    };

    tracing::Span::current()
        .record("event", tracing::field::display(event.event_name()))
        .record("transaction_id", tracing::field::display(event.transaction_id()));

    let ack = Acknowledgement {
        message: "Bold webhook processed successfully",
        event: event.event_name().to_string(),
        transaction_id: event.transaction_id().to_string(),
        timestamp: envelope.received_at(),
    };

    state.dispatch.submit(event);
    metrics::counter!("webhook_requests_total", "outcome" => "200").increment(1);

    Ok(Json(ack))
}
