//! Change notifications.

use crate::error::Result;
use async_trait::async_trait;
use folio_model::{Author, ExpandedItem, Series};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A change event for subscribers of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Notification {
    /// An item was persisted with at least one changed field.
    ItemUpdated(ExpandedItem),
    /// Authors were created inline while resolving a payload.
    AuthorsAdded(Vec<Author>),
    /// Series were created inline while resolving a payload.
    SeriesAdded(Vec<Series>),
}
impl Notification {
    /// The event name subscribers see on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemUpdated(_) => "item_updated",
            Self::AuthorsAdded(_) => "authors_added",
            Self::SeriesAdded(_) => "series_added",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, notification: Notification) -> Result<()>;
}

pub type NotifierHandle = Arc<dyn Notifier + Send + Sync>;

/// Publish without letting a failure escape: notifications are best-effort
/// once the mutation they describe is durable.
pub(crate) async fn publish_best_effort(notifier: &NotifierHandle, notification: Notification) {
    let event = notification.name();
    if let Err(err) = notifier.publish(notification).await {
        tracing::warn!(event, error = %err, "failed to publish notification");
    }
}

/// In-process [`Notifier`] fanning events out to every current subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}
impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, notification: Notification) -> Result<()> {
        let event = notification.name();
        match self.sender.send(notification) {
            Ok(receivers) => tracing::debug!(event, receivers, "published notification"),
            // Nobody listening is not a failure.
            Err(_) => tracing::debug!(event, "no subscribers for notification"),
        }
        Ok(())
    }
}

/// [`Notifier`] that remembers every event, for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: std::sync::Mutex<Vec<Notification>>,
    fail: std::sync::atomic::AtomicBool,
}
#[cfg(any(test, feature = "mock"))]
impl RecordingNotifier {
    /// Make every subsequent publish fail (after recording the attempt).
    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(Notification::name).collect()
    }
}
#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, notification: Notification) -> Result<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(notification);
        }
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            exn::bail!(crate::error::ErrorKind::Notify);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::timestamp;

    fn author() -> Author {
        Author::new("aut_1", "B", timestamp::from_millis(1_000).unwrap())
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Notification::AuthorsAdded(vec![author()])).unwrap();
        assert_eq!(json["event"], "authors_added");
        assert_eq!(json["data"][0]["id"], "aut_1");
        let json = serde_json::to_value(Notification::SeriesAdded(vec![])).unwrap();
        assert_eq!(json["event"], "series_added");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers() {
        let notifier = BroadcastNotifier::default();
        notifier.publish(Notification::AuthorsAdded(vec![])).await.unwrap();
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let notifier = BroadcastNotifier::new(4);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();
        notifier.publish(Notification::AuthorsAdded(vec![author()])).await.unwrap();
        assert_eq!(first.recv().await.unwrap().name(), "authors_added");
        assert_eq!(second.recv().await.unwrap(), Notification::AuthorsAdded(vec![author()]));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failures() {
        let recorder = Arc::new(RecordingNotifier::default());
        recorder.fail_publishes(true);
        let handle: NotifierHandle = recorder.clone();
        publish_best_effort(&handle, Notification::SeriesAdded(vec![])).await;
        assert_eq!(recorder.names(), vec!["series_added"]);
    }
}
