use {
    crate::{domain::event::PaymentEvent, services::dispatcher::Dispatcher},
    std::sync::{Arc, Mutex, PoisonError},
    tokio::{
        sync::{mpsc, watch},
        task::JoinSet,
    },
};

/// Hand-off from the acknowledging request to background dispatch.
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<PaymentEvent>,
    dispatcher: Dispatcher,
    overflow: Arc<Mutex<JoinSet<()>>>,
}

impl DispatchQueue {
    pub fn new(dispatcher: Dispatcher, capacity: usize) -> (Self, mpsc::Receiver<PaymentEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let queue = Self {
            tx,
            dispatcher,
            overflow: Arc::new(Mutex::new(JoinSet::new())),
        };
        (queue, rx)
    }

    /// Never blocks and never drops: a full or closed queue falls back to an
    /// overflow task that [`DispatchQueue::drain_overflow`] waits for.
    pub fn submit(&self, event: PaymentEvent) {
        let event = match self.tx.try_send(event) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(transaction_id = %event.transaction_id(), "dispatch queue full, dispatching on overflow task");
                event
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::warn!(transaction_id = %event.transaction_id(), "dispatch queue closed, dispatching on overflow task");
                event
            }
        };

        let mut overflow = self.overflow.lock().unwrap_or_else(PoisonError::into_inner);
        while overflow.try_join_next().is_some() {}
        overflow.spawn(supervise(self.dispatcher.clone(), event));
    }

    /// Number of overflow tasks not yet reaped.
    pub fn overflow_len(&self) -> usize {
        self.overflow.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn take_overflow(&self) -> JoinSet<()> {
        std::mem::take(&mut *self.overflow.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Wait for every overflow task, including ones spawned while waiting.
    pub async fn drain_overflow(&self) {
        loop {
            let mut pending = self.take_overflow();
            if pending.is_empty() {
                break;
            }
            tracing::info!(tasks = pending.len(), "waiting for overflow dispatches");
            while pending.join_next().await.is_some() {}
        }
    }
}

/// Run one event in its own task so a panic stays inside it.
pub async fn supervise(dispatcher: Dispatcher, event: PaymentEvent) {
    let transaction_id = event.transaction_id().clone();
    let kind = event.kind();

    match tokio::spawn(async move { dispatcher.dispatch(&event).await }).await {
        Ok(dispatched) => tracing::info!(
            transaction_id = %transaction_id,
            event = %dispatched.kind,
            ledger = dispatched.ledger.as_str(),
            notified = dispatched.notified,
            "event dispatched"
        ),
        Err(e) => tracing::error!(
            transaction_id = %transaction_id,
            event = %kind,
            error = %e,
            "dispatch task failed"
        ),
    }
}

/// Drain the queue, one supervised task per event. On shutdown, stop
/// accepting, finish what is queued and wait for in-flight dispatches.
pub async fn run_dispatcher(
    dispatcher: Dispatcher,
    mut rx: mpsc::Receiver<PaymentEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("dispatch worker started");
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            received = rx.recv() => match received {
                Some(event) => {
                    in_flight.spawn(supervise(dispatcher.clone(), event));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    rx.close();
    while let Some(event) = rx.recv().await {
        in_flight.spawn(supervise(dispatcher.clone(), event));
    }
    while in_flight.join_next().await.is_some() {}

    tracing::info!("dispatch worker stopped");
}
