//! Conversation and message models.

use collabbridge_core::messaging::MessageType;
use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: DbId,
    pub participant_low: DbId,
    pub participant_high: DbId,
    pub last_message_id: Option<DbId>,
    pub last_message_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Conversation {
    pub fn has_participant(&self, user_id: DbId) -> bool {
        self.participant_low == user_id || self.participant_high == user_id
    }

    pub fn other_participant(&self, user_id: DbId) -> DbId {
        if self.participant_low == user_id {
            self.participant_high
        } else {
            self.participant_low
        }
    }
}

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub content: String,
    pub message_type: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A message joined with sender and recipient display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetails {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub content: String,
    pub message_type: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub recipient_name: String,
    pub recipient_avatar: Option<String>,
}

/// Flat row behind [`ConversationSummary`].
#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: DbId,
    pub created_at: Timestamp,
    pub last_message_at: Option<Timestamp>,
    pub other_id: DbId,
    pub other_name: String,
    pub other_username: Option<String>,
    pub other_avatar: Option<String>,
    pub other_role: String,
    pub last_message_id: Option<DbId>,
    pub last_message_content: Option<String>,
    pub last_message_type: Option<String>,
    pub last_message_sender_id: Option<DbId>,
    pub last_message_created_at: Option<Timestamp>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: DbId,
    pub name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub id: DbId,
    pub content: String,
    pub message_type: String,
    pub sender_id: DbId,
    pub created_at: Timestamp,
}

/// One entry of a user's conversation list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: DbId,
    pub participant: Participant,
    pub last_message: Option<LastMessage>,
    pub last_message_at: Option<Timestamp>,
    pub unread_count: i64,
    pub created_at: Timestamp,
}

impl From<ConversationRow> for ConversationSummary {
    fn from(row: ConversationRow) -> Self {
        let last_message = match (
            row.last_message_id,
            row.last_message_content,
            row.last_message_type,
            row.last_message_sender_id,
            row.last_message_created_at,
        ) {
            (Some(id), Some(content), Some(message_type), Some(sender_id), Some(created_at)) => {
                Some(LastMessage {
                    id,
                    content,
                    message_type,
                    sender_id,
                    created_at,
                })
            }
            _ => None,
        };
        Self {
            id: row.id,
            participant: Participant {
                id: row.other_id,
                name: row.other_name,
                username: row.other_username,
                avatar: row.other_avatar,
                role: row.other_role,
            },
            last_message,
            last_message_at: row.last_message_at,
            unread_count: row.unread_count,
            created_at: row.created_at,
        }
    }
}

/// DTO for `POST /messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub recipient_id: DbId,
    pub content: String,
    pub message_type: Option<MessageType>,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for `POST /messages/conversations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversation {
    pub user_id: DbId,
}

/// Validated insert for a message row.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub content: String,
    pub message_type: MessageType,
    pub metadata: Option<serde_json::Value>,
}
