use {
    crate::domain::{broadcast::BroadcastMessage, error::DeliveryError, id::ListenerId},
    dashmap::DashMap,
    std::sync::Arc,
    tokio::sync::mpsc,
};

/// One connected real-time consumer.
pub trait Listener: Send + Sync {
    fn deliver(&self, message: &str) -> Result<(), DeliveryError>;
}

/// Listener backed by a channel drained by the connection's own task.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl Listener for ChannelListener {
    fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(message.to_string())
            .map_err(|_| DeliveryError::Closed)
    }
}

/// Connected listeners. Created once at start-up and shared by handle.
///
/// Connect and disconnect may run concurrently with a broadcast: iteration
/// works on a snapshot, so no lock is held while delivering.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<ListenerId, Arc<dyn Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId::generate();
        self.listeners.insert(id, listener);
        tracing::debug!(listener_id = %id, total = self.listeners.len(), "listener connected");
        id
    }

    pub fn unregister(&self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            tracing::debug!(listener_id = %id, total = self.listeners.len(), "listener disconnected");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn for_each_listener(&self, mut f: impl FnMut(ListenerId, &dyn Listener)) {
        let snapshot: Vec<(ListenerId, Arc<dyn Listener>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        for (id, listener) in &snapshot {
            f(*id, listener.as_ref());
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    registry: Arc<ListenerRegistry>,
}

impl Notifier {
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self { registry }
    }

    /// Best-effort fan-out. Returns how many listeners accepted the message.
    pub fn broadcast(&self, message: &BroadcastMessage) -> usize {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialise broadcast message");
                return 0;
            }
        };

        let mut delivered = 0;
        self.registry.for_each_listener(|id, listener| match listener.deliver(&text) {
            Ok(()) => delivered += 1,
            Err(e) => {
                metrics::counter!("broadcast_deliveries_total", "outcome" => "failed").increment(1);
                tracing::warn!(listener_id = %id, error = %e, "broadcast delivery failed");
            }
        });

        metrics::counter!("broadcast_deliveries_total", "outcome" => "delivered")
            .increment(delivered as u64);
        tracing::info!(
            update = message.payload.update_type,
            transaction_id = %message.payload.transaction_id,
            delivered,
            "broadcast payment update"
        );
        delivered
    }
}
