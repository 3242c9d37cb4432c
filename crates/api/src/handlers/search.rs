//! Handlers for `/search`: discovery of professionals and events,
//! autocomplete, facets, and suggestions.
//!
//! Query strings are parsed into the typed filters of
//! [`collabbridge_db::models::search`]. Every professional and event search
//! is logged to `search_queries`; a logging failure never fails the search.

use axum::extract::{Query, State};
use axum::Json;
use collabbridge_core::error::CoreError;
use collabbridge_core::event::EventType;
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::search::{
    clamp_limit, normalize_query, parse_date_bound, parse_list, parse_tag_list, rank_suggestions,
    DateBound, EventSort, ProfessionalSort, Suggestion, SuggestionCandidate, SuggestionKind,
    DEFAULT_CATEGORY_LIMIT, DEFAULT_SUGGESTED_LIMIT, DEFAULT_SUGGESTION_LIMIT, MAX_CATEGORY_LIMIT,
    MAX_SUGGESTED_LIMIT, MAX_SUGGESTION_LIMIT, MIN_SUGGESTION_QUERY_LENGTH,
};
use collabbridge_db::models::search::{
    CategoryCount, EventFilters, EventResult, ProfessionalFilters, ProfessionalResult,
    SearchFacets, SearchLogEntry,
};
use collabbridge_db::repositories::SearchRepo;
use collabbridge_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalSearchParams {
    pub q: Option<String>,
    /// Comma-separated category tags.
    pub categories: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rate: Option<f64>,
    pub available: Option<bool>,
    /// Comma-separated skills.
    pub skills: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProfessionalSearchParams {
    pub fn filters(&self) -> Result<ProfessionalFilters, CoreError> {
        let sort_by = match self.sort_by.as_deref() {
            Some(raw) => raw.parse::<ProfessionalSort>()?,
            None => ProfessionalSort::default(),
        };
        Ok(ProfessionalFilters {
            q: normalize_query(self.q.as_deref()),
            categories: parse_tag_list(self.categories.as_deref()),
            location: normalize_query(self.location.as_deref()),
            min_rating: self.min_rating,
            max_rate: self.max_rate,
            available: self.available,
            skills: parse_list(self.skills.as_deref()),
            sort_by,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSearchParams {
    pub q: Option<String>,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    /// Comma-separated role tags.
    pub required_roles: Option<String>,
    pub featured: Option<bool>,
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl EventSearchParams {
    pub fn filters(&self) -> Result<EventFilters, CoreError> {
        let event_type = match self.event_type.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.to_uppercase().parse::<EventType>()?),
            _ => None,
        };
        let date_from = self
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound(raw, DateBound::Start))
            .transpose()?;
        let date_to = self
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound(raw, DateBound::End))
            .transpose()?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if to < from {
                return Err(CoreError::Validation("dateTo must not precede dateFrom".into()));
            }
        }
        let sort_by = match self.sort_by.as_deref() {
            Some(raw) => raw.parse::<EventSort>()?,
            None => EventSort::default(),
        };
        Ok(EventFilters {
            q: normalize_query(self.q.as_deref()),
            event_type: event_type.map(|t| t.as_str().to_string()),
            location: normalize_query(self.location.as_deref()),
            date_from,
            date_to,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            required_roles: parse_tag_list(self.required_roles.as_deref()),
            featured: self.featured,
            sort_by,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// Search results with the applied filters echoed back.
#[derive(Debug, Serialize)]
pub struct SearchResults<T: Serialize, F: Serialize> {
    pub results: Vec<T>,
    pub filters: F,
}

/// GET /api/search/professionals
pub async fn search_professionals(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Query(params): Query<ProfessionalSearchParams>,
) -> AppResult<Json<ApiResponse<SearchResults<ProfessionalResult, ProfessionalFilters>>>> {
    let filters = params.filters()?;
    let page = PageRequest::new(params.page, params.limit);

    let results =
        SearchRepo::search_professionals(&state.pool, &filters, page.limit, page.offset()).await?;
    let total = SearchRepo::count_professionals(&state.pool, &filters).await?;

    log_search(
        &state.pool,
        SearchLogEntry {
            user_id: auth.map(|a| a.user_id),
            search_type: "professionals",
            query_text: filters.q.clone(),
            filters: serde_json::to_value(&filters).unwrap_or_default(),
            result_count: total,
        },
    );

    Ok(Json(ApiResponse::paginated(
        SearchResults { results, filters },
        page.paginate(total),
    )))
}

/// GET /api/search/events
pub async fn search_events(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Query(params): Query<EventSearchParams>,
) -> AppResult<Json<ApiResponse<SearchResults<EventResult, EventFilters>>>> {
    let filters = params.filters()?;
    let page = PageRequest::new(params.page, params.limit);

    let results = SearchRepo::search_events(&state.pool, &filters, page.limit, page.offset()).await?;
    let total = SearchRepo::count_events(&state.pool, &filters).await?;

    log_search(
        &state.pool,
        SearchLogEntry {
            user_id: auth.map(|a| a.user_id),
            search_type: "events",
            query_text: filters.q.clone(),
            filters: serde_json::to_value(&filters).unwrap_or_default(),
            result_count: total,
        },
    );

    Ok(Json(ApiResponse::paginated(
        SearchResults { results, filters },
        page.paginate(total),
    )))
}

/// GET /api/search/categories
pub async fn popular_categories(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<ApiResponse<Vec<CategoryCount>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_CATEGORY_LIMIT, MAX_CATEGORY_LIMIT);
    let categories = SearchRepo::popular_categories(&state.pool, limit).await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/search/suggestions
///
/// Queries shorter than two characters return an empty list.
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> AppResult<Json<ApiResponse<Vec<Suggestion>>>> {
    let Some(q) = normalize_query(params.q.as_deref())
        .filter(|q| q.chars().count() >= MIN_SUGGESTION_QUERY_LENGTH)
    else {
        return Ok(Json(ApiResponse::ok(Vec::new())));
    };
    let limit = clamp_limit(params.limit, DEFAULT_SUGGESTION_LIMIT, MAX_SUGGESTION_LIMIT);

    let rows = SearchRepo::suggestion_candidates(&state.pool, &q, limit).await?;
    let candidates = rows
        .into_iter()
        .filter_map(|row| {
            let kind = row.kind.parse::<SuggestionKind>().ok()?;
            Some(SuggestionCandidate {
                kind,
                text: row.text,
                entity_id: row.entity_id,
            })
        })
        .collect();

    let ranked = rank_suggestions(&q, candidates, usize::try_from(limit).unwrap_or(0));
    Ok(Json(ApiResponse::ok(ranked)))
}

/// GET /api/search/facets
pub async fn facets(
    State(state): State<AppState>,
    Query(params): Query<ProfessionalSearchParams>,
) -> AppResult<Json<ApiResponse<SearchFacets>>> {
    let filters = params.filters()?;
    let facets = SearchRepo::professional_facets(&state.pool, &filters).await?;
    Ok(Json(ApiResponse::ok(facets)))
}

/// GET /api/search/suggested
pub async fn suggested_professionals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<ApiResponse<Vec<ProfessionalResult>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_SUGGESTED_LIMIT, MAX_SUGGESTED_LIMIT);
    let results = SearchRepo::suggested_professionals(&state.pool, auth.user_id, limit).await?;
    Ok(Json(ApiResponse::ok(results)))
}

/// Record a search off the request path.
fn log_search(pool: &DbPool, entry: SearchLogEntry) {
    let pool = pool.clone();
    tokio::spawn(async move {
        if let Err(e) = SearchRepo::log_search(&pool, &entry).await {
            tracing::warn!(error = %e, search_type = entry.search_type, "Failed to log search");
        }
    });
}
