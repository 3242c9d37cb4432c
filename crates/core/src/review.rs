//! Review rating rules.

use crate::error::CoreError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Maximum length of a review comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

/// Trim a comment; blank comments are stored as `None`.
pub fn normalize_comment(comment: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(trimmed) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "comment must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert_matches!(validate_rating(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_rating(6), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_comment_becomes_none() {
        assert_eq!(normalize_comment(Some("   ")).unwrap(), None);
        assert_eq!(normalize_comment(Some(" Great work ")).unwrap().as_deref(), Some("Great work"));
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(normalize_comment(Some(&long)).is_err());
    }
}
