//! Shared response envelope for API handlers.
//!
//! Every success body is `{ "success": true, "data"?, "message"?,
//! "pagination"? }`. Errors use the same shape with `success: false` (see
//! [`crate::error::AppError`]).

use collabbridge_core::pagination::Pagination;
use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    /// A page of results with its pagination block.
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// A body carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "Deleted"}));
    }

    #[test]
    fn paginated_body_carries_pagination() {
        let json =
            serde_json::to_value(ApiResponse::paginated(vec![1, 2], Pagination::new(1, 2, 5)))
                .unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["pages"], 3);
        assert_eq!(json["pagination"]["hasNext"], true);
    }
}
