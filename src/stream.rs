use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Payload queued for delivery on a push stream
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage(pub Value);

impl PushMessage {
    pub fn new<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self)
    }
}

/// Live push streams keyed by session id. Each `GET /sse` connection holds
/// one unbounded FIFO here until its [`Subscription`] is dropped.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    subscribers: Arc<DashMap<Uuid, mpsc::UnboundedSender<PushMessage>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session and returns its receiving half
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        tracing::debug!(session = %id, "Subscriber registered");

        Subscription {
            id,
            rx,
            registry: self.clone(),
        }
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Queues a message on one session. Returns false if the session is gone.
    pub fn send_to(&self, id: &Uuid, message: PushMessage) -> bool {
        let delivered = match self.subscribers.get(id) {
            Some(tx) => tx.send(message).is_ok(),
            None => return false,
        };
        if !delivered {
            self.unsubscribe(id);
        }
        delivered
    }

    /// Queues a message on every live session and returns how many took it
    pub fn broadcast(&self, message: PushMessage) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();
        for entry in self.subscribers.iter() {
            if entry.value().send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*entry.key());
            }
        }
        // Removal must wait until the iterator has released its shard locks
        for id in closed {
            self.unsubscribe(&id);
        }
        delivered
    }

    fn unsubscribe(&self, id: &Uuid) {
        if self.subscribers.remove(id).is_some() {
            tracing::debug!(session = %id, "Subscriber removed");
        }
    }
}

/// Receiving half of one push stream; unregisters itself on drop
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<PushMessage>,
    registry: SubscriberRegistry,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn recv(&mut self) -> Option<PushMessage> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(&self.id);
    }
}

/// One unit of output on a push stream, before wire framing
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Where the client should POST its messages for this session
    Endpoint(String),
    Message(PushMessage),
    KeepAlive,
}

/// Yields the endpoint frame, then each queued message in order. After
/// `idle` passes with nothing queued it yields one keepalive and ends.
pub fn frames(
    subscription: Subscription,
    endpoint: String,
    idle: Duration,
) -> impl Stream<Item = Frame> + Send {
    let session = subscription.id();
    let messages = stream::unfold(Some(subscription), move |state| async move {
        let mut subscription = state?;
        match tokio::time::timeout(idle, subscription.recv()).await {
            Ok(Some(message)) => Some((Frame::Message(message), Some(subscription))),
            Ok(None) => None,
            Err(_) => {
                tracing::debug!(session = %subscription.id(), "Stream idle, closing after keepalive");
                Some((Frame::KeepAlive, None))
            }
        }
    });

    tracing::debug!(session = %session, "Stream opened");
    stream::once(async move { Frame::Endpoint(endpoint) }).chain(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn broadcast_fans_out_to_every_subscriber() {
        let registry = SubscriberRegistry::new();
        let mut first = registry.subscribe();
        let mut second = registry.subscribe();

        let delivered = registry.broadcast(PushMessage(json!({"n": 1})));
        assert_eq!(delivered, 2);
        assert_eq!(first.recv().await, Some(PushMessage(json!({"n": 1}))));
        assert_eq!(second.recv().await, Some(PushMessage(json!({"n": 1}))));
    }

    #[tokio::test]
    async fn messages_arrive_in_fifo_order() {
        let registry = SubscriberRegistry::new();
        let mut subscription = registry.subscribe();
        for n in 0..5 {
            assert!(registry.send_to(&subscription.id(), PushMessage(json!(n))));
        }
        for n in 0..5 {
            assert_eq!(subscription.recv().await, Some(PushMessage(json!(n))));
        }
    }

    #[test]
    fn dropping_subscription_unregisters_it() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe();
        let id = subscription.id();
        assert!(registry.contains(&id));

        drop(subscription);
        assert!(registry.is_empty());
        assert!(!registry.send_to(&id, PushMessage(json!("late"))));
        assert_eq!(registry.broadcast(PushMessage(json!("late"))), 0);
    }

    #[tokio::test]
    async fn stream_delivers_then_keeps_alive_once_and_ends() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe();
        let id = subscription.id();
        registry.send_to(&id, PushMessage(json!("first")));
        registry.send_to(&id, PushMessage(json!("second")));

        let collected: Vec<Frame> = frames(
            subscription,
            format!("/messages?session_id={id}"),
            Duration::from_millis(50),
        )
        .collect()
        .await;

        assert_eq!(
            collected,
            vec![
                Frame::Endpoint(format!("/messages?session_id={id}")),
                Frame::Message(PushMessage(json!("first"))),
                Frame::Message(PushMessage(json!("second"))),
                Frame::KeepAlive,
            ]
        );
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn idle_stream_emits_exactly_one_keepalive() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe();

        let collected: Vec<Frame> =
            frames(subscription, "/messages".into(), Duration::from_millis(20))
                .collect()
                .await;

        let keepalives = collected.iter().filter(|f| **f == Frame::KeepAlive).count();
        assert_eq!(keepalives, 1);
        assert_eq!(collected.last(), Some(&Frame::KeepAlive));
    }

    #[tokio::test]
    async fn dropped_stream_abandons_wait_and_unregisters() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe();
        let mut stream = Box::pin(frames(
            subscription,
            "/messages".into(),
            Duration::from_secs(30),
        ));

        assert!(matches!(stream.next().await, Some(Frame::Endpoint(_))));
        let pending =
            tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(pending.is_err());
        assert_eq!(registry.len(), 1);

        drop(stream);
        assert!(registry.is_empty());
    }
}
