//! Conversation and message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{ConversationId, MessageId, UserId};

/// A two-party conversation.
///
/// Participants are stored in ascending id order so each pair of users has
/// exactly one conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_low: UserId,
    pub participant_high: UserId,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Whether `user` is one of the two participants.
    #[must_use]
    pub fn includes(&self, user: UserId) -> bool {
        self.participant_low == user || self.participant_high == user
    }

    /// Order a pair of users the way conversations store them.
    #[must_use]
    pub fn ordered_pair(a: UserId, b: UserId) -> (UserId, UserId) {
        if a.as_i32() <= b.as_i32() { (a, b) } else { (b, a) }
    }
}

/// A message. The body is ciphertext produced by the client and is opaque here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Input for opening (or reopening) a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenConversationInput {
    pub user_id: UserId,
}

/// Input for sending a message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageInput {
    pub body: String,
}

/// Validated message handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: String,
}
