//! In-process fan-out of newly inserted messages.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

use crate::models::Message;

/// A stored message plus the two users of its match.
#[derive(Debug, Clone)]
struct Delivery {
    message: Message,
    participants: [String; 2],
}

#[derive(Clone)]
pub struct MessageHub {
    tx: broadcast::Sender<Delivery>,
}

impl MessageHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    /// Fans `message` out to subscribers who are one of `participants`.
    pub fn publish(&self, message: &Message, participants: [&str; 2]) {
        let delivery = Delivery {
            message: message.clone(),
            participants: participants.map(str::to_owned),
        };
        // no receivers is fine, nobody is watching
        let receivers = self.tx.send(delivery).unwrap_or(0);
        tracing::trace!(message_id = %message.id, receivers, "published message");
    }

    /// New subscription for `user_id`, seeing only messages of that user's
    /// matches and optionally narrowed to one match. Dropping it unsubscribes.
    pub fn subscribe(&self, user_id: &str, match_id: Option<Uuid>) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            user_id: user_id.to_owned(),
            match_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new(256)
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<Delivery>,
    user_id: String,
    match_id: Option<Uuid>,
}

impl Subscription {
    fn wants(&self, delivery: &Delivery) -> bool {
        delivery.participants.iter().any(|p| *p == self.user_id)
            && self.match_id.is_none_or(|id| id == delivery.message.match_id)
    }

    /// Waits for the next message passing the filter. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.rx.recv().await {
                Ok(delivery) if self.wants(&delivery) => return Some(delivery.message),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "message subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered message passing the filter, without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        loop {
            match self.rx.try_recv() {
                Ok(delivery) if self.wants(&delivery) => return Some(delivery.message),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "message subscription lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
