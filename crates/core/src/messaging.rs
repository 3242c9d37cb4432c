//! Messaging rules: conversation identity, content limits, search escaping.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum message body length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Maximum number of rows returned by message search.
pub const MAX_MESSAGE_SEARCH_RESULTS: i64 = 50;

/// Minimum query length for message search.
pub const MIN_MESSAGE_SEARCH_LENGTH: usize = 2;

text_enum! {
    MessageType("message type") {
        Text => "TEXT",
        Image => "IMAGE",
        File => "FILE",
        BookingRequest => "BOOKING_REQUEST",
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

/// The unordered participant pair identifying a conversation, stored with
/// the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    pub low: DbId,
    pub high: DbId,
}

impl ParticipantPair {
    /// Normalize two user ids into a pair. A user cannot converse with
    /// themself.
    pub fn new(a: DbId, b: DbId) -> Result<Self, CoreError> {
        if a == b {
            return Err(CoreError::Validation(
                "Cannot start a conversation with yourself".into(),
            ));
        }
        Ok(Self {
            low: a.min(b),
            high: a.max(b),
        })
    }

    pub fn contains(&self, user_id: DbId) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The participant that is not `user_id`, if `user_id` participates.
    pub fn other(&self, user_id: DbId) -> Option<DbId> {
        if self.low == user_id {
            Some(self.high)
        } else if self.high == user_id {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Validate and trim a message body.
///
/// Text messages need visible content. Attachment-style messages may carry
/// an empty caption as long as their metadata points at the payload, which
/// the caller checks.
pub fn normalize_content(content: &str, message_type: MessageType) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    if trimmed.is_empty() && message_type == MessageType::Text {
        return Err(CoreError::Validation("Message content is required".into()));
    }
    Ok(trimmed.to_string())
}

/// Escape `%`, `_` and `\` so user input matches literally inside a
/// `LIKE`/`ILIKE` pattern, then wrap it for substring matching.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pair_is_order_independent() {
        assert_eq!(
            ParticipantPair::new(9, 4).unwrap(),
            ParticipantPair::new(4, 9).unwrap()
        );
    }

    #[test]
    fn pair_rejects_self_conversation() {
        assert_matches!(ParticipantPair::new(3, 3), Err(CoreError::Validation(_)));
    }

    #[test]
    fn other_participant() {
        let pair = ParticipantPair::new(1, 2).unwrap();
        assert_eq!(pair.other(1), Some(2));
        assert_eq!(pair.other(2), Some(1));
        assert_eq!(pair.other(3), None);
        assert!(!pair.contains(3));
    }

    #[test]
    fn text_message_requires_content() {
        assert!(normalize_content("   ", MessageType::Text).is_err());
        assert_eq!(normalize_content("  hi ", MessageType::Text).unwrap(), "hi");
        assert_eq!(normalize_content("", MessageType::Image).unwrap(), "");
    }

    #[test]
    fn overlong_message_is_rejected() {
        let body = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(normalize_content(&body, MessageType::Text).is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("hi"), "%hi%");
    }
}
