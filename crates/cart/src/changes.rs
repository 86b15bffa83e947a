//! Cart change notifications.

use std::pin::Pin;

use common::{CartLineId, UserId};
use futures_core::Stream;
use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// What happened to a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartChangeKind {
    LineAdded { line_id: CartLineId },
    QuantityChanged { line_id: CartLineId, quantity: u32 },
    LineRemoved { line_id: CartLineId },
    LinesRemoved { count: usize },
    Cleared,
}

/// A committed mutation of one user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartChange {
    pub user_id: UserId,
    pub kind: CartChangeKind,
}

impl CartChange {
    pub fn new(user_id: UserId, kind: CartChangeKind) -> Self {
        Self { user_id, kind }
    }
}

/// A stream of cart changes.
pub type CartChangeStream = Pin<Box<dyn Stream<Item = CartChange> + Send>>;

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out of cart changes to any number of subscribers.
#[derive(Debug, Clone)]
pub(crate) struct ChangeNotifier {
    sender: broadcast::Sender<CartChange>,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub(crate) fn publish(&self, change: CartChange) {
        // Err only means nobody is subscribed.
        if self.sender.send(change).is_err() {
            tracing::trace!("cart change published with no subscribers");
        }
    }

    /// Subscribes to changes committed after this call.
    ///
    /// A subscriber that falls behind skips the notifications it missed
    /// instead of ending the stream.
    pub(crate) fn subscribe(&self) -> CartChangeStream {
        let receiver = self.sender.subscribe();
        Box::pin(stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => return Some((change, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "cart change subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_subscribers_receive_changes_in_order() {
        let notifier = ChangeNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        let user = UserId::new("ann");
        notifier.publish(CartChange::new(user.clone(), CartChangeKind::Cleared));
        notifier.publish(CartChange::new(
            user.clone(),
            CartChangeKind::LinesRemoved { count: 2 },
        ));

        assert_eq!(first.next().await.unwrap().kind, CartChangeKind::Cleared);
        assert_eq!(
            first.next().await.unwrap().kind,
            CartChangeKind::LinesRemoved { count: 2 }
        );
        assert_eq!(second.next().await.unwrap().user_id, user);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_harmless() {
        let notifier = ChangeNotifier::new();
        notifier.publish(CartChange::new(UserId::new("ann"), CartChangeKind::Cleared));
    }

    #[tokio::test]
    async fn test_stream_ends_when_notifier_dropped() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        drop(notifier);
        assert!(changes.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_ahead() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        let user = UserId::new("ann");

        for count in 0..CHANNEL_CAPACITY + 10 {
            notifier.publish(CartChange::new(
                user.clone(),
                CartChangeKind::LinesRemoved { count },
            ));
        }

        let change = changes.next().await.unwrap();
        assert_eq!(change.kind, CartChangeKind::LinesRemoved { count: 10 });
    }
}
