//! Direct messaging between two users.
//!
//! Writes go through [`MessageRepo`]; afterwards the service pushes live
//! frames to connected participants and publishes `message.received` for
//! recipients who are not looking at the conversation.

use std::sync::Arc;

use collabbridge_core::error::CoreError;
use collabbridge_core::messaging::{
    like_pattern, normalize_content, ParticipantPair, MAX_MESSAGE_SEARCH_RESULTS,
    MIN_MESSAGE_SEARCH_LENGTH,
};
use collabbridge_core::pagination::{PageRequest, Pagination};
use collabbridge_core::types::DbId;
use collabbridge_db::models::messaging::{
    Conversation, ConversationSummary, MessageDetails, NewMessage, SendMessage,
};
use collabbridge_db::repositories::{MessageRepo, UserRepo};
use collabbridge_db::DbPool;
use collabbridge_events::{names, EventBus, PlatformEvent};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::ws::WsManager;

/// Live frame pushed to the recipient of a new message.
pub const FRAME_NEW_MESSAGE: &str = "new_message";
/// Live frame pushed to the sender when the recipient reads.
pub const FRAME_MESSAGES_READ: &str = "messages_read";
/// Live frame pushed to the recipient when a message is deleted.
pub const FRAME_MESSAGE_DELETED: &str = "message_deleted";

pub struct MessagingService {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    ws_manager: Arc<WsManager>,
}

impl MessagingService {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>, ws_manager: Arc<WsManager>) -> Self {
        Self {
            pool,
            event_bus,
            ws_manager,
        }
    }

    /// Send a message, creating the conversation on first contact.
    pub async fn send_message(
        &self,
        sender_id: DbId,
        input: SendMessage,
    ) -> AppResult<MessageDetails> {
        ParticipantPair::new(sender_id, input.recipient_id)
            .map_err(|_| CoreError::Validation("Cannot send a message to yourself".into()))?;

        let message_type = input.message_type.unwrap_or_default();
        let content = normalize_content(&input.content, message_type)?;
        if content.is_empty() && input.metadata.is_none() {
            return Err(CoreError::Validation(format!(
                "{message_type} messages need content or attachment metadata"
            ))
            .into());
        }

        if UserRepo::find_active(&self.pool, input.recipient_id)
            .await?
            .is_none()
        {
            return Err(CoreError::not_found("User", input.recipient_id).into());
        }

        let message = MessageRepo::send(
            &self.pool,
            &NewMessage {
                sender_id,
                recipient_id: input.recipient_id,
                content,
                message_type,
                metadata: input.metadata,
            },
        )
        .await?;

        tracing::info!(
            message_id = message.id,
            conversation_id = message.conversation_id,
            sender_id,
            "Message sent",
        );

        self.ws_manager
            .send_event(message.recipient_id, FRAME_NEW_MESSAGE, &message)
            .await;

        if !self
            .ws_manager
            .has_conversation_open(message.recipient_id, message.conversation_id)
            .await
        {
            self.event_bus.publish(
                PlatformEvent::new(names::MESSAGE_RECEIVED)
                    .with_source("message", message.id)
                    .with_actor(sender_id)
                    .with_payload(json!({
                        "recipientId": message.recipient_id,
                        "senderName": message.sender_name,
                        "content": message.content,
                        "conversationId": message.conversation_id,
                    })),
            );
        }

        Ok(message)
    }

    /// Find or open the conversation between two users.
    pub async fn get_or_create_conversation(
        &self,
        user_id: DbId,
        other_user_id: DbId,
    ) -> AppResult<Conversation> {
        let pair = ParticipantPair::new(user_id, other_user_id)?;
        if UserRepo::find_active(&self.pool, other_user_id)
            .await?
            .is_none()
        {
            return Err(CoreError::not_found("User", other_user_id).into());
        }
        Ok(MessageRepo::get_or_create_conversation(&self.pool, pair).await?)
    }

    /// The user's conversations, most recently active first.
    pub async fn get_conversations(
        &self,
        user_id: DbId,
        page: PageRequest,
    ) -> AppResult<(Vec<ConversationSummary>, Pagination)> {
        let rows =
            MessageRepo::list_conversations(&self.pool, user_id, page.limit, page.offset()).await?;
        let total = MessageRepo::count_conversations(&self.pool, user_id).await?;
        Ok((
            rows.into_iter().map(ConversationSummary::from).collect(),
            page.paginate(total),
        ))
    }

    /// One page of a conversation. Page 1 is the newest window, rendered
    /// oldest to newest.
    pub async fn get_messages(
        &self,
        conversation_id: DbId,
        user_id: DbId,
        page: PageRequest,
    ) -> AppResult<(Vec<MessageDetails>, Pagination)> {
        self.participant_conversation(conversation_id, user_id)
            .await?;
        let messages =
            MessageRepo::list_messages(&self.pool, conversation_id, page.limit, page.offset())
                .await?;
        let total = MessageRepo::count_messages(&self.pool, conversation_id).await?;
        Ok((messages, page.paginate(total)))
    }

    /// Mark messages addressed to the user as read. Returns how many
    /// changed; the other participant is told when any did.
    pub async fn mark_messages_as_read(&self, conversation_id: DbId, user_id: DbId) -> AppResult<u64> {
        let conversation = self
            .participant_conversation(conversation_id, user_id)
            .await?;
        let marked = MessageRepo::mark_read(&self.pool, conversation_id, user_id).await?;

        if marked > 0 {
            self.ws_manager
                .send_event(
                    conversation.other_participant(user_id),
                    FRAME_MESSAGES_READ,
                    &json!({
                        "conversationId": conversation_id,
                        "readerId": user_id,
                        "count": marked,
                    }),
                )
                .await;
        }
        Ok(marked)
    }

    /// Soft-delete a message. Only its sender may delete it.
    pub async fn delete_message(&self, message_id: DbId, user_id: DbId) -> AppResult<bool> {
        let message = MessageRepo::find_message(&self.pool, message_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Message", message_id))?;
        if message.sender_id != user_id {
            return Err(CoreError::Forbidden("You can only delete your own messages".into()).into());
        }

        if !MessageRepo::soft_delete(&self.pool, message_id, user_id).await? {
            return Err(CoreError::not_found("Message", message_id).into());
        }

        self.ws_manager
            .send_event(
                message.recipient_id,
                FRAME_MESSAGE_DELETED,
                &json!({
                    "conversationId": message.conversation_id,
                    "messageId": message_id,
                }),
            )
            .await;
        Ok(true)
    }

    pub async fn get_unread_count(&self, user_id: DbId) -> AppResult<i64> {
        Ok(MessageRepo::unread_count(&self.pool, user_id).await?)
    }

    /// Substring search over the user's messages, newest first.
    pub async fn search_messages(
        &self,
        user_id: DbId,
        query: &str,
        conversation_id: Option<DbId>,
    ) -> AppResult<Vec<MessageDetails>> {
        let query = query.trim();
        if query.chars().count() < MIN_MESSAGE_SEARCH_LENGTH {
            return Err(CoreError::Validation(format!(
                "Search query must be at least {MIN_MESSAGE_SEARCH_LENGTH} characters"
            ))
            .into());
        }
        if let Some(conversation_id) = conversation_id {
            self.participant_conversation(conversation_id, user_id)
                .await?;
        }

        Ok(MessageRepo::search(
            &self.pool,
            user_id,
            &like_pattern(query),
            conversation_id,
            MAX_MESSAGE_SEARCH_RESULTS,
        )
        .await?)
    }

    async fn participant_conversation(
        &self,
        conversation_id: DbId,
        user_id: DbId,
    ) -> AppResult<Conversation> {
        let conversation = MessageRepo::find_conversation(&self.pool, conversation_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Conversation", conversation_id))?;
        if !conversation.has_participant(user_id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "You are not a participant in this conversation".into(),
            )));
        }
        Ok(conversation)
    }
}

