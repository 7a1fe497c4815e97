//! Two-party conversations with live delivery.
//!
//! Message bodies are ciphertext produced by clients; the server stores and
//! relays them without looking inside.

use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use waterline_core::ConversationId;

use super::ServiceError;
use crate::models::{
    Conversation, Message, NewMessage, OpenConversationInput, RequestContext, SendMessageInput,
};
use crate::store::Store;

/// Buffered messages per subscriber before it starts skipping.
pub const HUB_CAPACITY: usize = 256;

/// In-process fan-out of newly stored messages.
///
/// Delivery is best-effort: a subscriber that falls more than
/// [`HUB_CAPACITY`] messages behind skips the ones it missed.
#[derive(Debug, Clone)]
pub struct MessageHub {
    sender: broadcast::Sender<Message>,
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new(HUB_CAPACITY)
    }
}

impl MessageHub {
    /// A hub that buffers up to `capacity` messages per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a stored message. Having no subscribers is not an error.
    pub fn publish(&self, message: Message) {
        if let Ok(receivers) = self.sender.send(message) {
            debug!(receivers, "Message published");
        }
    }

    /// Receive every message published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }
}

/// Messaging operations.
pub struct MessagingService<'a> {
    store: &'a dyn Store,
    hub: &'a MessageHub,
}

impl<'a> MessagingService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, hub: &'a MessageHub) -> Self {
        Self { store, hub }
    }

    /// Return the conversation between the caller and `input.user_id`,
    /// creating it on first contact.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when addressing oneself and
    /// `ServiceError::NotFound` if the other user does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn open(
        &self,
        ctx: &RequestContext,
        input: OpenConversationInput,
    ) -> Result<Conversation, ServiceError> {
        if input.user_id == ctx.user_id {
            return Err(ServiceError::validation(
                "cannot open a conversation with yourself",
            ));
        }
        if self.store.get_user(input.user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }

        Ok(self
            .store
            .find_or_create_conversation(ctx.user_id, input.user_id)
            .await?)
    }

    /// Conversations the caller takes part in.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn conversations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Conversation>, ServiceError> {
        Ok(self.store.list_conversations_for(ctx.user_id).await?)
    }

    /// Store a message and hand it to live subscribers.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown conversation,
    /// `ServiceError::Forbidden` if the caller is not a participant, and
    /// `ServiceError::Validation` for an empty body.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn send(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        input: SendMessageInput,
    ) -> Result<Message, ServiceError> {
        self.participant_of(ctx, conversation_id).await?;
        if input.body.trim().is_empty() {
            return Err(ServiceError::validation("message must not be empty"));
        }

        let message = self
            .store
            .insert_message(&NewMessage {
                conversation_id,
                sender_id: ctx.user_id,
                body: input.body,
            })
            .await?;

        info!(message_id = %message.id, %conversation_id, "Message sent");
        self.hub.publish(message.clone());
        Ok(message)
    }

    /// Messages of a conversation, oldest first. Participants only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown conversation and
    /// `ServiceError::Forbidden` if the caller is not a participant.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn messages(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ServiceError> {
        self.participant_of(ctx, conversation_id).await?;
        Ok(self.store.list_messages(conversation_id).await?)
    }

    /// Subscribe to new messages after checking the caller may read the
    /// conversation. The receiver sees every conversation; callers filter
    /// on `conversation_id`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::messages`].
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn subscribe(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> Result<broadcast::Receiver<Message>, ServiceError> {
        self.participant_of(ctx, conversation_id).await?;
        Ok(self.hub.subscribe())
    }

    async fn participant_of(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> Result<Conversation, ServiceError> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or(ServiceError::NotFound("conversation"))?;
        if !conversation.includes(ctx.user_id) {
            return Err(ServiceError::Forbidden);
        }
        Ok(conversation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use waterline_core::{UserRole, Username};

    use super::*;
    use crate::models::NewUser;
    use crate::store::UserStore;
    use crate::store::memory::InMemoryStore;

    async fn user(store: &InMemoryStore, name: &str) -> RequestContext {
        let user = store
            .insert_user(&NewUser {
                username: Username::parse(name).unwrap(),
                full_name: name.to_string(),
                password_hash: "unused".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap();
        RequestContext::new(user.id, user.role)
    }

    #[tokio::test]
    async fn test_open_is_idempotent_per_pair() {
        let store = InMemoryStore::new();
        let hub = MessageHub::default();
        let service = MessagingService::new(&store, &hub);
        let ana = user(&store, "ana").await;
        let ben = user(&store, "ben").await;

        let first = service
            .open(&ana, OpenConversationInput { user_id: ben.user_id })
            .await
            .unwrap();
        let second = service
            .open(&ben, OpenConversationInput { user_id: ana.user_id })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(service.conversations(&ana).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_self_and_unknown() {
        let store = InMemoryStore::new();
        let hub = MessageHub::default();
        let service = MessagingService::new(&store, &hub);
        let ana = user(&store, "ana").await;

        assert!(matches!(
            service
                .open(&ana, OpenConversationInput { user_id: ana.user_id })
                .await
                .unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            service
                .open(&ana, OpenConversationInput { user_id: waterline_core::UserId::new(404) })
                .await
                .unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_send_publishes_and_outsiders_are_forbidden() {
        let store = InMemoryStore::new();
        let hub = MessageHub::default();
        let service = MessagingService::new(&store, &hub);
        let ana = user(&store, "ana").await;
        let ben = user(&store, "ben").await;
        let eve = user(&store, "eve").await;

        let conversation = service
            .open(&ana, OpenConversationInput { user_id: ben.user_id })
            .await
            .unwrap();
        let mut inbox = service.subscribe(&ben, conversation.id).await.unwrap();

        let sent = service
            .send(&ana, conversation.id, SendMessageInput { body: "b64:cipher".to_string() })
            .await
            .unwrap();
        assert_eq!(inbox.recv().await.unwrap(), sent);

        assert!(matches!(
            service.messages(&eve, conversation.id).await.unwrap_err(),
            ServiceError::Forbidden
        ));
        assert!(matches!(
            service
                .send(&eve, conversation.id, SendMessageInput { body: "hi".to_string() })
                .await
                .unwrap_err(),
            ServiceError::Forbidden
        ));
        assert!(matches!(
            service.subscribe(&eve, conversation.id).await.unwrap_err(),
            ServiceError::Forbidden
        ));

        let history = service.messages(&ben, conversation.id).await.unwrap();
        assert_eq!(history, vec![sent]);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let store = InMemoryStore::new();
        let hub = MessageHub::default();
        let service = MessagingService::new(&store, &hub);
        let ana = user(&store, "ana").await;
        let ben = user(&store, "ben").await;
        let conversation = service
            .open(&ana, OpenConversationInput { user_id: ben.user_id })
            .await
            .unwrap();

        assert!(matches!(
            service
                .send(&ana, conversation.id, SendMessageInput { body: "  ".to_string() })
                .await
                .unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let hub = MessageHub::new(4);
        hub.publish(Message {
            id: waterline_core::MessageId::new(1),
            conversation_id: ConversationId::new(1),
            sender_id: waterline_core::UserId::new(1),
            body: "x".to_string(),
            created_at: chrono::Utc::now(),
        });
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_zero_capacity_hub_panics() {
        let _ = MessageHub::new(0);
    }
}
