//! Repository for `conversations` and `messages`.
//!
//! Deleted messages (`deleted_at IS NOT NULL`) are excluded from every read.

use collabbridge_core::messaging::ParticipantPair;
use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::messaging::{Conversation, ConversationRow, Message, MessageDetails, NewMessage};

/// Column list for `conversations` queries.
const CONVERSATION_COLUMNS: &str = "\
    id, participant_low, participant_high, last_message_id, last_message_at, \
    created_at, updated_at";

/// Column list for `messages` queries.
const MESSAGE_COLUMNS: &str = "\
    id, conversation_id, sender_id, recipient_id, content, message_type, metadata, \
    is_read, read_at, created_at";

/// Message joined with sender and recipient display fields.
const DETAILS_SELECT: &str = "\
    SELECT m.id, m.conversation_id, m.sender_id, m.recipient_id, m.content, \
           m.message_type, m.metadata, m.is_read, m.read_at, m.created_at, \
           s.name AS sender_name, s.avatar AS sender_avatar, \
           r.name AS recipient_name, r.avatar AS recipient_avatar \
    FROM messages m \
    JOIN users s ON s.id = m.sender_id \
    JOIN users r ON r.id = m.recipient_id";

/// Upsert for the unordered pair. The no-op update makes `RETURNING` yield
/// the existing row on conflict.
const UPSERT_CONVERSATION: &str = "\
    INSERT INTO conversations (participant_low, participant_high) \
    VALUES ($1, $2) \
    ON CONFLICT ON CONSTRAINT uq_conversations_participants \
    DO UPDATE SET participant_low = EXCLUDED.participant_low \
    RETURNING ";

/// Provides conversation and message persistence.
pub struct MessageRepo;

impl MessageRepo {
    // -----------------------------------------------------------------------
    // Conversations
    // -----------------------------------------------------------------------

    /// Return the conversation for a participant pair, creating it if needed.
    pub async fn get_or_create_conversation(
        pool: &PgPool,
        pair: ParticipantPair,
    ) -> Result<Conversation, sqlx::Error> {
        let query = format!("{UPSERT_CONVERSATION}{CONVERSATION_COLUMNS}");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(pair.low)
            .bind(pair.high)
            .fetch_one(pool)
            .await
    }

    pub async fn find_conversation(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's conversations, most recent activity first (ties by id desc),
    /// with the other participant, last visible message, and the user's
    /// unread count.
    pub async fn list_conversations(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationRow>, sqlx::Error> {
        sqlx::query_as::<_, ConversationRow>(
            "SELECT c.id, c.created_at, c.last_message_at, \
                    u.id AS other_id, u.name AS other_name, u.username AS other_username, \
                    u.avatar AS other_avatar, u.role AS other_role, \
                    lm.id AS last_message_id, lm.content AS last_message_content, \
                    lm.message_type AS last_message_type, \
                    lm.sender_id AS last_message_sender_id, \
                    lm.created_at AS last_message_created_at, \
                    (SELECT COUNT(*) FROM messages um \
                     WHERE um.conversation_id = c.id AND um.recipient_id = $1 \
                       AND um.is_read = false AND um.deleted_at IS NULL) AS unread_count \
             FROM conversations c \
             JOIN users u ON u.id = CASE WHEN c.participant_low = $1 \
                                         THEN c.participant_high ELSE c.participant_low END \
             LEFT JOIN LATERAL ( \
                 SELECT id, content, message_type, sender_id, created_at FROM messages \
                 WHERE conversation_id = c.id AND deleted_at IS NULL \
                 ORDER BY created_at DESC, id DESC LIMIT 1 \
             ) lm ON true \
             WHERE c.participant_low = $1 OR c.participant_high = $1 \
             ORDER BY COALESCE(c.last_message_at, c.created_at) DESC, c.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_conversations(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM conversations \
             WHERE participant_low = $1 OR participant_high = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Persist a message and bump its conversation in one transaction.
    ///
    /// The conversation is created on first contact. Returns the stored
    /// message joined with sender/recipient display fields.
    pub async fn send(pool: &PgPool, input: &NewMessage) -> Result<MessageDetails, sqlx::Error> {
        let pair = ParticipantPair {
            low: input.sender_id.min(input.recipient_id),
            high: input.sender_id.max(input.recipient_id),
        };

        let mut tx = pool.begin().await?;

        let conversation_id: DbId = sqlx::query_scalar(&format!("{UPSERT_CONVERSATION}id"))
            .bind(pair.low)
            .bind(pair.high)
            .fetch_one(&mut *tx)
            .await?;

        let message = sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages \
                (conversation_id, sender_id, recipient_id, content, message_type, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(conversation_id)
        .bind(input.sender_id)
        .bind(input.recipient_id)
        .bind(&input.content)
        .bind(input.message_type.as_str())
        .bind(&input.metadata)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE conversations SET last_message_id = $2, last_message_at = $3 \
             WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(message.id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        let details = sqlx::query_as::<_, MessageDetails>(&format!("{DETAILS_SELECT} WHERE m.id = $1"))
            .bind(message.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(details)
    }

    /// A non-deleted message by id.
    pub async fn find_message(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a conversation's history.
    ///
    /// Page 1 (`offset = 0`) is the newest window; rows within the page are
    /// returned oldest to newest, ties broken by id.
    pub async fn list_messages(
        pool: &PgPool,
        conversation_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageDetails>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM ( \
                {DETAILS_SELECT} \
                WHERE m.conversation_id = $1 AND m.deleted_at IS NULL \
                ORDER BY m.created_at DESC, m.id DESC \
                LIMIT $2 OFFSET $3 \
             ) page \
             ORDER BY page.created_at ASC, page.id ASC"
        );
        sqlx::query_as::<_, MessageDetails>(&query)
            .bind(conversation_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_messages(pool: &PgPool, conversation_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1 AND deleted_at IS NULL",
        )
        .bind(conversation_id)
        .fetch_one(pool)
        .await
    }

    /// Mark every unread message addressed to `user_id` in the conversation
    /// as read. Returns how many changed; a repeat call returns 0.
    pub async fn mark_read(
        pool: &PgPool,
        conversation_id: DbId,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = true, read_at = NOW() \
             WHERE conversation_id = $1 AND recipient_id = $2 \
               AND is_read = false AND deleted_at IS NULL",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft-delete a message owned by `sender_id`.
    ///
    /// The conversation's `last_message_*` is recomputed from the remaining
    /// visible messages in the same transaction.
    pub async fn soft_delete(pool: &PgPool, id: DbId, sender_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let conversation_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE messages SET deleted_at = NOW() \
             WHERE id = $1 AND sender_id = $2 AND deleted_at IS NULL \
             RETURNING conversation_id",
        )
        .bind(id)
        .bind(sender_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(conversation_id) = conversation_id else {
            return Ok(false);
        };

        sqlx::query(
            "UPDATE conversations c \
             SET last_message_id = lm.id, last_message_at = lm.created_at \
             FROM (SELECT $1::BIGINT AS conversation_id) target \
             LEFT JOIN LATERAL ( \
                 SELECT id, created_at FROM messages \
                 WHERE conversation_id = $1 AND deleted_at IS NULL \
                 ORDER BY created_at DESC, id DESC LIMIT 1 \
             ) lm ON true \
             WHERE c.id = target.conversation_id",
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Unread messages addressed to the user across all conversations.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE recipient_id = $1 AND is_read = false AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Case-insensitive substring search over the user's conversations.
    ///
    /// `pattern` must already be a `LIKE` pattern with wildcards escaped
    /// using `\`.
    pub async fn search(
        pool: &PgPool,
        user_id: DbId,
        pattern: &str,
        conversation_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<MessageDetails>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} \
             JOIN conversations c ON c.id = m.conversation_id \
             WHERE (c.participant_low = $1 OR c.participant_high = $1) \
               AND m.deleted_at IS NULL \
               AND m.content ILIKE $2 ESCAPE '\\' \
               AND ($3::BIGINT IS NULL OR m.conversation_id = $3) \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, MessageDetails>(&query)
            .bind(user_id)
            .bind(pattern)
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
