//! Database operations for conversations and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{ConversationId, MessageId, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{Conversation, Message, NewMessage};
use crate::store::MessageStore;

const CONVERSATION_COLUMNS: &str = "id, participant_low, participant_high, created_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, body, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i32,
    participant_low: i32,
    participant_high: i32,
    created_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: ConversationId::new(row.id),
            participant_low: UserId::new(row.participant_low),
            participant_high: UserId::new(row.participant_high),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    conversation_id: i32,
    sender_id: i32,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            conversation_id: ConversationId::new(row.conversation_id),
            sender_id: UserId::new(row.sender_id),
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn find_or_create_conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Conversation, RepositoryError> {
        let (low, high) = Conversation::ordered_pair(a, b);

        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "INSERT INTO waterline.conversation (participant_low, participant_high)
             VALUES ($1, $2)
             ON CONFLICT (participant_low, participant_high)
             DO UPDATE SET participant_low = EXCLUDED.participant_low
             RETURNING {CONVERSATION_COLUMNS}"
        ))
        .bind(low)
        .bind(high)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "participant does not exist"))?;

        Ok(row.into())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM waterline.conversation WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_conversations_for(
        &self,
        user: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM waterline.conversation
             WHERE participant_low = $1 OR participant_high = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO waterline.message (conversation_id, sender_id, body)
             VALUES ($1, $2, $3)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.body)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "conversation does not exist"))?;

        Ok(row.into())
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM waterline.message
             WHERE conversation_id = $1
             ORDER BY created_at, id"
        ))
        .bind(conversation_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
