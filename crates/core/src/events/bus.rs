use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::SiteEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SiteEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: SiteEvent) -> Result<usize, broadcast::error::SendError<SiteEvent>> {
        self.sender.send(event)
    }

    /// Publish without caring whether anyone is listening.
    pub fn emit(&self, event: SiteEvent) {
        if self.sender.receiver_count() > 0 {
            let _ = self.sender.send(event);
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::ContentKind;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SiteEvent::content(ContentKind::Seo, "home", false))
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            SiteEvent::ContentUpdated(ref e) if e.kind == ContentKind::Seo && e.key == "home"
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(SiteEvent::LeadCaptured(SiteEvent::lead("a@b.com", None)))
            .unwrap();

        assert!(matches!(rx1.recv().await.unwrap(), SiteEvent::LeadCaptured(_)));
        assert!(matches!(rx2.recv().await.unwrap(), SiteEvent::LeadCaptured(_)));
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit(SiteEvent::content(ContentKind::Document, "about", false));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
