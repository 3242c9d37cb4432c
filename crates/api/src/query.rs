//! Shared query parameter types for API handlers.

use collabbridge_core::error::CoreError;
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::search::{parse_date_bound, DateBound};
use collabbridge_core::types::Timestamp;
use serde::Deserialize;

/// Page/limit pagination parameters (`?page=&limit=`).
///
/// Values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Optional `?from=&to=` bounds for analytics endpoints (RFC 3339 or
/// `YYYY-MM-DD`).
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRangeParams {
    /// Parse both bounds; a bare `to` date covers the whole day.
    pub fn bounds(&self) -> Result<(Option<Timestamp>, Option<Timestamp>), CoreError> {
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_date_bound(raw, DateBound::Start))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_date_bound(raw, DateBound::End))
            .transpose()?;
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn date_range_bounds_parse_both_forms() {
        let params = DateRangeParams {
            from: Some("2025-01-01".into()),
            to: Some("2025-01-31T12:00:00Z".into()),
        };
        let (from, to) = params.bounds().unwrap();
        assert_eq!(from.unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(to.unwrap().to_rfc3339(), "2025-01-31T12:00:00+00:00");
    }

    #[test]
    fn garbage_date_is_a_validation_error() {
        let params = DateRangeParams {
            from: Some("last tuesday".into()),
            to: None,
        };
        assert_matches!(params.bounds(), Err(CoreError::Validation(_)));
    }
}
