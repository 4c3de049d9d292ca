//! Alert notification fan-out
//!
//! Observers and the persistence sink are best-effort: a failure in one is
//! logged and never propagates, blocks the remaining observers, or affects
//! the alert returned to the caller that triggered creation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::types::AlertDto;

/// Receives every newly created alert
pub trait AlertObserver: Send + Sync {
    fn notify(&self, alert: &AlertDto) -> Result<(), NotifyError>;
}

/// Optional persistence hook, called fire-and-forget per creation
pub trait AlertSink: Send + Sync {
    fn save(&self, alert: &AlertDto) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification queue full")]
    QueueFull,

    #[error("Notification channel closed")]
    Closed,

    #[error("Observer error: {0}")]
    Observer(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Observer registry with per-observer failure isolation
pub struct Dispatcher {
    observers: RwLock<Vec<Arc<dyn AlertObserver>>>,
    sink: RwLock<Option<Arc<dyn AlertSink>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            sink: RwLock::new(None),
        }
    }

    pub fn register(&self, observer: Arc<dyn AlertObserver>) {
        self.observers.write().push(observer);
    }

    pub fn set_sink(&self, sink: Arc<dyn AlertSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Fan an alert out to every observer, then the sink
    ///
    /// Each observer is isolated individually, so one failure never skips
    /// the rest of the fan-out.
    pub fn dispatch(&self, alert: &AlertDto) {
        let observers = self.observers.read().clone();
        for observer in &observers {
            if let Err(e) = observer.notify(alert) {
                tracing::error!(alert_id = %alert.id, error = %e, "Alert observer failed");
            }
        }

        let sink = self.sink.read().clone();
        if let Some(sink) = sink {
            if let Err(e) = sink.save(alert) {
                tracing::warn!(alert_id = %alert.id, error = %e, "Failed to persist alert");
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every alert through tracing at a level matching its severity
pub struct LogObserver;

impl AlertObserver for LogObserver {
    fn notify(&self, alert: &AlertDto) -> Result<(), NotifyError> {
        tracing::warn!(
            alert_id = %alert.id,
            kind = alert.kind.as_str(),
            severity = alert.severity.as_str(),
            "Alert: {} - {}",
            alert.title,
            alert.message
        );
        Ok(())
    }
}

/// Posts alerts to an HTTP webhook from a background worker
///
/// `notify` only enqueues; the POST happens on a separate tokio task so a
/// slow or unreachable endpoint can never stall the ingestion path. When
/// the bounded queue is full the alert is dropped with a warning.
pub struct WebhookObserver {
    tx: mpsc::Sender<AlertDto>,
}

impl WebhookObserver {
    const QUEUE_CAPACITY: usize = 64;

    /// Spawn the delivery worker and return the observer handle
    pub fn spawn(
        url: String,
        headers: HashMap<String, String>,
    ) -> (Arc<Self>, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<AlertDto>(Self::QUEUE_CAPACITY);
        let client = reqwest::Client::new();

        let handle = tokio::spawn(async move {
            tracing::info!(url = %url, "Webhook delivery worker started");
            while let Some(alert) = rx.recv().await {
                if let Err(e) = Self::deliver(&client, &url, &headers, &alert).await {
                    tracing::error!(
                        alert_id = %alert.id,
                        url = %url,
                        error = %e,
                        "Webhook delivery failed"
                    );
                }
            }
            tracing::info!("Webhook delivery worker stopped");
        });

        (Arc::new(Self { tx }), handle)
    }

    async fn deliver(
        client: &reqwest::Client,
        url: &str,
        headers: &HashMap<String, String>,
        alert: &AlertDto,
    ) -> Result<(), NotifyError> {
        let mut request = client.post(url).json(alert);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Observer(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifyError::Observer(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(alert_id = %alert.id, url = %url, "Webhook notification sent");
        Ok(())
    }
}

impl AlertObserver for WebhookObserver {
    fn notify(&self, alert: &AlertDto) -> Result<(), NotifyError> {
        self.tx
            .try_send(alert.clone())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => NotifyError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => NotifyError::Closed,
            })
    }
}
