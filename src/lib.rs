pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    config::Environment,
    services::{notifier::ListenerRegistry, worker::DispatchQueue},
    std::sync::Arc,
};

#[derive(Clone)]
pub struct AppState {
    pub webhook_secret: Option<Arc<str>>,
    pub environment: Environment,
    pub dispatch: DispatchQueue,
    pub registry: Arc<ListenerRegistry>,
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            adapters::bold::WEBHOOK_PATH,
            post(adapters::bold::webhook::bold_webhook_handler),
        )
        .route("/webhook/bold/test", get(adapters::bold::status_handler))
        .route("/ws", get(adapters::ws::ws_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
