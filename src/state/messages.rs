use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::DbError,
    models::{Conversation, Message, MessageType, NewMessage},
    realtime::Subscription,
    store::Store,
};

use super::LoadStatus;

/// Messages of one match (or every match, when `match_id` is `None`) plus the
/// conversation list.
///
/// Every arrival goes through [`MessageState::apply`], keyed by message id, so
/// a row confirmed by `send_message` and then pushed again by the
/// subscription is only stored once.
pub struct MessageState {
    store: Store,
    user: CurrentUser,
    match_id: Option<Uuid>,
    messages: Vec<Message>,
    index: HashMap<Uuid, usize>,
    pub conversations: Vec<Conversation>,
    pub status: LoadStatus,
}

impl MessageState {
    pub fn new(store: Store, user: CurrentUser, match_id: Option<Uuid>) -> Self {
        Self {
            store,
            user,
            match_id,
            messages: Vec::new(),
            index: HashMap::new(),
            conversations: Vec::new(),
            status: LoadStatus::default(),
        }
    }

    /// Ascending by creation time.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, message_id: Uuid) -> Option<&Message> {
        self.index.get(&message_id).map(|&i| &self.messages[i])
    }

    /// Subscription to the caller's matches, narrowed like this state.
    /// Dropping it tears it down.
    pub fn subscribe(&self) -> Subscription {
        self.store.hub.subscribe(&self.user.id, self.match_id)
    }

    pub async fn load_messages(&mut self) -> Result<(), DbError> {
        let Some(match_id) = self.match_id else {
            return Ok(());
        };

        self.status.begin();
        let result = self.store.messages.for_match(match_id).await;
        self.status.finish(&result, "messages");

        self.messages = result?;
        self.reindex(0);
        Ok(())
    }

    pub async fn load_conversations(&mut self) -> Result<(), DbError> {
        self.status.begin();
        let result = self.store.messages.conversations(&self.user.id).await;
        self.status.finish(&result, "conversations");
        self.conversations = result?;
        Ok(())
    }

    pub async fn send_message(
        &mut self,
        match_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Message, DbError> {
        let new = NewMessage {
            content: content.to_owned(),
            message_type,
        };
        let sent = self
            .store
            .messages
            .send(&self.user.id, match_id, &new)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %match_id, "sending message failed"))?;
        self.apply(sent.clone());
        Ok(sent)
    }

    /// Marks a message from the other side as read. Returns `false` when the
    /// message is the caller's own or already read.
    pub async fn mark_as_read(&mut self, message_id: Uuid) -> Result<bool, DbError> {
        let changed = self.store.messages.mark_as_read(&self.user.id, message_id).await?;
        if !changed {
            return Ok(false);
        }

        let now = Utc::now();
        let match_id = match self.index.get(&message_id) {
            Some(&i) => {
                self.messages[i].read_at.get_or_insert(now);
                self.messages[i].match_id
            }
            None => self.store.messages.get(message_id).await?.match_id,
        };
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.match_id == match_id) {
            conversation.unread_count = (conversation.unread_count - 1).max(0);
            if let Some(last) = conversation.last_message.as_mut().filter(|m| m.id == message_id) {
                last.read_at.get_or_insert(now);
            }
        }
        Ok(true)
    }

    /// Inserts `message` in creation order unless its id is already known.
    /// Returns whether anything was added.
    pub fn apply(&mut self, message: Message) -> bool {
        if self.index.contains_key(&message.id) {
            return false;
        }
        if self.match_id.is_some_and(|id| id != message.match_id) {
            return false;
        }

        self.touch_conversation(&message);

        let at = self
            .messages
            .partition_point(|m| (m.created_at, m.id) <= (message.created_at, message.id));
        self.messages.insert(at, message);
        self.reindex(at);
        true
    }

    fn reindex(&mut self, from: usize) {
        if from == 0 {
            self.index.clear();
        }
        for (i, message) in self.messages.iter().enumerate().skip(from) {
            self.index.insert(message.id, i);
        }
    }

    /// Applies everything already waiting on `subscription`, returning how
    /// many messages were new.
    pub fn drain(&mut self, subscription: &mut Subscription) -> usize {
        let mut added = 0;
        while let Some(message) = subscription.try_recv() {
            if self.apply(message) {
                added += 1;
            }
        }
        added
    }

    fn touch_conversation(&mut self, message: &Message) {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.match_id == message.match_id) else {
            return;
        };
        // anything not newer than the summary is already counted in it
        let newer = conversation
            .last_message
            .as_ref()
            .is_none_or(|last| (last.created_at, last.id) < (message.created_at, message.id));
        if !newer {
            return;
        }
        if message.sender_id != self.user.id && message.read_at.is_none() {
            conversation.unread_count += 1;
        }
        conversation.last_message = Some(message.clone());
    }
}
