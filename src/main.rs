use {
    axum::http::StatusCode,
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::{signal, sync::watch},
    tower_http::{timeout::TimeoutLayer, trace::TraceLayer},
    tracing_subscriber::EnvFilter,
    webhook_gate::{
        AppState,
        config::Config,
        domain::ledger::Ledger,
        infra::{memory::InMemoryLedger, postgres::PgLedger},
        services::{
            dispatcher::Dispatcher,
            notifier::{ListenerRegistry, Notifier},
            worker::{DispatchQueue, run_dispatcher},
        },
    },
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("invalid configuration");
    if config.webhook_secret.is_none() {
        tracing::warn!(
            environment = config.environment.as_str(),
            "BOLD_WEBHOOK_SECRET not set, webhook signatures will NOT be verified"
        );
    }

    let ledger: Arc<dyn Ledger> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(20)
                .acquire_timeout(Duration::from_secs(3))
                .connect(url)
                .await
                .expect("failed to connect to database");
            let ledger = PgLedger::new(pool);
            ledger.migrate().await.expect("failed to run migrations");
            tracing::info!("using postgres ledger");
            Arc::new(ledger)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory ledger");
            Arc::new(InMemoryLedger::new())
        }
    };

    let registry = Arc::new(ListenerRegistry::new());
    let dispatcher = Dispatcher::new(ledger, Notifier::new(Arc::clone(&registry)));
    let (dispatch, queue) = DispatchQueue::new(dispatcher.clone(), config.dispatch_queue_capacity);

    let overflow = dispatch.clone();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(run_dispatcher(dispatcher, queue, shutdown_rx));

    let state = AppState {
        webhook_secret: config.webhook_secret.as_deref().map(Arc::from),
        environment: config.environment,
        dispatch,
        registry,
    };

    let app = webhook_gate::router(state, config.body_limit)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    let _ = shutdown_tx.send(true);
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "dispatch worker panicked");
    }
    overflow.drain_overflow().await;
    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
