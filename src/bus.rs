use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because the simulation thread publishes into async tasks.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to current subscribers. Returns how many received it.
    pub fn publish(&self, msg: T) -> usize {
        self.tx.send(Arc::new(msg)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let topic: Topic<u32> = Topic::new(4);
        assert_eq!(topic.publish(1), 0);
    }

    #[test]
    fn test_subscribers_see_later_messages() {
        let topic: Topic<u32> = Topic::new(4);
        let mut rx = topic.subscribe();
        assert_eq!(topic.publish(7), 1);
        assert_eq!(*rx.try_recv().unwrap(), 7);
    }
}
