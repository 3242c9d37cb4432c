//! Repository for search & discovery.
//!
//! Provides filtered professional and event search, popular categories,
//! typeahead candidates, facet counts, suggested professionals, and the
//! search analytics log. Free-text matching is `ILIKE` substring matching;
//! ranking of typeahead candidates happens in core.

use collabbridge_core::messaging::like_pattern;
use collabbridge_core::search::{EventSort, ProfessionalSort};
use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::search::{
    CategoryCount, EventFilters, EventResult, FacetValue, ProfessionalFilters, ProfessionalResult,
    SearchFacets, SearchLogEntry, SuggestionRow,
};

/// Average rating and review count per reviewed user.
const RATINGS_CTE: &str = "\
    WITH ratings AS ( \
        SELECT subject_id, AVG(rating)::DOUBLE PRECISION AS average_rating, \
               COUNT(*) AS review_count \
        FROM reviews GROUP BY subject_id \
    ) ";

const PROFESSIONAL_SELECT: &str = "\
    SELECT u.id, u.name, u.username, u.avatar, u.bio, u.location, u.is_verified, \
           cp.categories, cp.skills, cp.hourly_rate, cp.is_available, cp.experience, \
           COALESCE(r.average_rating, 0) AS average_rating, \
           COALESCE(r.review_count, 0) AS review_count, \
           u.created_at ";

/// Active creative professionals under the bound filters.
///
/// Binds: `$1` categories (upper-case, empty = any), `$2` location pattern,
/// `$3` min rating, `$4` max rate, `$5` availability, `$6` skills
/// (lower-case, empty = any), `$7` text pattern.
const PROFESSIONAL_FROM_WHERE: &str = "\
    FROM users u \
    JOIN creative_profiles cp ON cp.user_id = u.id \
    LEFT JOIN ratings r ON r.subject_id = u.id \
    WHERE u.is_active = true \
      AND u.role = 'CREATIVE_PROFESSIONAL' \
      AND (cardinality($1::TEXT[]) = 0 OR cp.categories && $1::TEXT[]) \
      AND ($2::TEXT IS NULL OR u.location ILIKE $2 ESCAPE '\\') \
      AND ($3::DOUBLE PRECISION IS NULL OR COALESCE(r.average_rating, 0) >= $3) \
      AND ($4::DOUBLE PRECISION IS NULL OR cp.hourly_rate <= $4) \
      AND ($5::BOOLEAN IS NULL OR cp.is_available = $5) \
      AND (cardinality($6::TEXT[]) = 0 \
           OR EXISTS (SELECT 1 FROM unnest(cp.skills) s WHERE lower(s) = ANY($6::TEXT[]))) \
      AND ($7::TEXT IS NULL \
           OR u.name ILIKE $7 ESCAPE '\\' \
           OR u.bio ILIKE $7 ESCAPE '\\' \
           OR array_to_string(cp.skills, ' ') ILIKE $7 ESCAPE '\\') ";

/// Relevance tier: name match > skills match > bio match.
const PROFESSIONAL_RELEVANCE: &str = "\
    CASE WHEN u.name ILIKE $7 ESCAPE '\\' THEN 3 \
         WHEN array_to_string(cp.skills, ' ') ILIKE $7 ESCAPE '\\' THEN 2 \
         WHEN u.bio ILIKE $7 ESCAPE '\\' THEN 1 \
         ELSE 0 END";

const EVENT_SELECT: &str = "\
    SELECT e.id, e.creator_id, e.title, e.description, e.event_type, e.start_date, \
           e.end_date, e.location, e.budget, e.currency, e.status, e.required_roles, \
           e.tags, e.is_featured, e.deadline_date, e.created_at, \
           u.name AS planner_name, pp.company_name, \
           (SELECT COUNT(*) FROM event_applications a WHERE a.event_id = e.id) \
               AS application_count, \
           (SELECT COUNT(*) FROM bookings b WHERE b.event_id = e.id) AS booking_count ";

/// Published public events under the bound filters.
///
/// Binds: `$1` event type, `$2` location pattern, `$3`/`$4` date range
/// (overlap with `[start_date, end_date]`), `$5`/`$6` budget range, `$7`
/// required roles (empty = any), `$8` text pattern, `$9` featured.
const EVENT_FROM_WHERE: &str = "\
    FROM events e \
    JOIN users u ON u.id = e.creator_id \
    LEFT JOIN event_planner_profiles pp ON pp.id = e.planner_profile_id \
    WHERE e.status = 'PUBLISHED' AND e.is_public = true \
      AND ($1::TEXT IS NULL OR e.event_type = $1) \
      AND ($2::TEXT IS NULL OR e.location ILIKE $2 ESCAPE '\\') \
      AND ($3::TIMESTAMPTZ IS NULL OR e.end_date >= $3) \
      AND ($4::TIMESTAMPTZ IS NULL OR e.start_date <= $4) \
      AND ($5::DOUBLE PRECISION IS NULL OR e.budget >= $5) \
      AND ($6::DOUBLE PRECISION IS NULL OR e.budget <= $6) \
      AND (cardinality($7::TEXT[]) = 0 OR e.required_roles && $7::TEXT[]) \
      AND ($8::TEXT IS NULL \
           OR e.title ILIKE $8 ESCAPE '\\' \
           OR e.description ILIKE $8 ESCAPE '\\' \
           OR array_to_string(e.tags, ' ') ILIKE $8 ESCAPE '\\') \
      AND ($9::BOOLEAN IS NULL OR e.is_featured = $9) ";

const EVENT_RELEVANCE: &str = "\
    CASE WHEN e.title ILIKE $8 ESCAPE '\\' THEN 3 \
         WHEN array_to_string(e.tags, ' ') ILIKE $8 ESCAPE '\\' THEN 2 \
         WHEN e.description ILIKE $8 ESCAPE '\\' THEN 1 \
         ELSE 0 END";

/// Maximum location facet values returned.
const LOCATION_FACET_LIMIT: i64 = 20;

/// Filter values in bind order for [`PROFESSIONAL_FROM_WHERE`].
#[derive(Debug, Clone)]
struct ProfessionalBinds {
    categories: Vec<String>,
    location: Option<String>,
    min_rating: Option<f64>,
    max_rate: Option<f64>,
    available: Option<bool>,
    skills: Vec<String>,
    text: Option<String>,
}

impl From<&ProfessionalFilters> for ProfessionalBinds {
    fn from(f: &ProfessionalFilters) -> Self {
        Self {
            categories: f.categories.iter().map(|c| c.to_uppercase()).collect(),
            location: f.location.as_deref().map(like_pattern),
            min_rating: f.min_rating,
            max_rate: f.max_rate,
            available: f.available,
            skills: f.skills.iter().map(|s| s.to_lowercase()).collect(),
            text: f.q.as_deref().map(like_pattern),
        }
    }
}

/// Filter values in bind order for [`EVENT_FROM_WHERE`].
#[derive(Debug, Clone)]
struct EventBinds {
    event_type: Option<String>,
    location: Option<String>,
    date_from: Option<collabbridge_core::types::Timestamp>,
    date_to: Option<collabbridge_core::types::Timestamp>,
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    required_roles: Vec<String>,
    text: Option<String>,
    featured: Option<bool>,
}

impl From<&EventFilters> for EventBinds {
    fn from(f: &EventFilters) -> Self {
        Self {
            event_type: f.event_type.clone(),
            location: f.location.as_deref().map(like_pattern),
            date_from: f.date_from,
            date_to: f.date_to,
            budget_min: f.budget_min,
            budget_max: f.budget_max,
            required_roles: f.required_roles.clone(),
            text: f.q.as_deref().map(like_pattern),
            featured: f.featured,
        }
    }
}

/// Bind [`ProfessionalBinds`] as `$1..$7` onto any sqlx query builder.
macro_rules! bind_professional {
    ($query:expr, $b:expr) => {
        $query
            .bind(&$b.categories)
            .bind(&$b.location)
            .bind($b.min_rating)
            .bind($b.max_rate)
            .bind($b.available)
            .bind(&$b.skills)
            .bind(&$b.text)
    };
}

/// Bind [`EventBinds`] as `$1..$9` onto any sqlx query builder.
macro_rules! bind_event {
    ($query:expr, $b:expr) => {
        $query
            .bind(&$b.event_type)
            .bind(&$b.location)
            .bind($b.date_from)
            .bind($b.date_to)
            .bind($b.budget_min)
            .bind($b.budget_max)
            .bind(&$b.required_roles)
            .bind(&$b.text)
            .bind($b.featured)
    };
}

fn professional_order(sort: ProfessionalSort) -> String {
    let primary = match sort {
        ProfessionalSort::RateLow => "cp.hourly_rate ASC NULLS LAST, ".to_string(),
        ProfessionalSort::RateHigh => "cp.hourly_rate DESC NULLS LAST, ".to_string(),
        ProfessionalSort::Rating => "average_rating DESC, review_count DESC, ".to_string(),
        ProfessionalSort::Newest => String::new(),
        ProfessionalSort::Relevance => {
            format!("{PROFESSIONAL_RELEVANCE} DESC, average_rating DESC, ")
        }
    };
    format!("ORDER BY {primary}u.created_at DESC, u.id DESC")
}

fn event_order(sort: EventSort) -> String {
    let primary = match sort {
        EventSort::Date => "e.start_date ASC, ".to_string(),
        EventSort::Budget => "e.budget DESC NULLS LAST, ".to_string(),
        EventSort::Relevance => {
            format!("{EVENT_RELEVANCE} DESC, e.is_featured DESC, e.start_date ASC, ")
        }
        EventSort::Newest => String::new(),
    };
    format!("ORDER BY {primary}e.created_at DESC, e.id DESC")
}

/// Provides search operations across professionals and events.
pub struct SearchRepo;

impl SearchRepo {
    // -----------------------------------------------------------------------
    // Professionals
    // -----------------------------------------------------------------------

    pub async fn search_professionals(
        pool: &PgPool,
        filters: &ProfessionalFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProfessionalResult>, sqlx::Error> {
        let binds = ProfessionalBinds::from(filters);
        let query = format!(
            "{RATINGS_CTE}{PROFESSIONAL_SELECT}{PROFESSIONAL_FROM_WHERE}{} LIMIT $8 OFFSET $9",
            professional_order(filters.sort_by)
        );
        bind_professional!(sqlx::query_as::<_, ProfessionalResult>(&query), binds)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_professionals(
        pool: &PgPool,
        filters: &ProfessionalFilters,
    ) -> Result<i64, sqlx::Error> {
        let binds = ProfessionalBinds::from(filters);
        let query = format!("{RATINGS_CTE}SELECT COUNT(*) {PROFESSIONAL_FROM_WHERE}");
        bind_professional!(sqlx::query_scalar::<_, i64>(&query), binds)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub async fn search_events(
        pool: &PgPool,
        filters: &EventFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventResult>, sqlx::Error> {
        let binds = EventBinds::from(filters);
        let query = format!(
            "{EVENT_SELECT}{EVENT_FROM_WHERE}{} LIMIT $10 OFFSET $11",
            event_order(filters.sort_by)
        );
        bind_event!(sqlx::query_as::<_, EventResult>(&query), binds)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_events(pool: &PgPool, filters: &EventFilters) -> Result<i64, sqlx::Error> {
        let binds = EventBinds::from(filters);
        let query = format!("SELECT COUNT(*) {EVENT_FROM_WHERE}");
        bind_event!(sqlx::query_scalar::<_, i64>(&query), binds)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    /// Categories by number of active professionals listing them; ties by
    /// name.
    pub async fn popular_categories(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count \
             FROM creative_profiles cp \
             JOIN users u ON u.id = cp.user_id \
             CROSS JOIN LATERAL unnest(cp.categories) AS category \
             WHERE u.is_active = true \
             GROUP BY category \
             ORDER BY count DESC, category ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Typeahead candidates containing `query`, up to `per_source` from each
    /// of professionals, events, skills and locations.
    pub async fn suggestion_candidates(
        pool: &PgPool,
        query: &str,
        per_source: i64,
    ) -> Result<Vec<SuggestionRow>, sqlx::Error> {
        sqlx::query_as::<_, SuggestionRow>(
            "(SELECT 'professional'::TEXT AS kind, u.name AS text, u.id AS entity_id \
              FROM users u \
              WHERE u.is_active = true AND u.role = 'CREATIVE_PROFESSIONAL' \
                AND u.name ILIKE $1 ESCAPE '\\' \
              LIMIT $2) \
             UNION ALL \
             (SELECT 'event'::TEXT, e.title, e.id \
              FROM events e \
              WHERE e.status = 'PUBLISHED' AND e.is_public = true \
                AND e.title ILIKE $1 ESCAPE '\\' \
              LIMIT $2) \
             UNION ALL \
             (SELECT DISTINCT 'skill'::TEXT, s, NULL::BIGINT \
              FROM creative_profiles cp CROSS JOIN LATERAL unnest(cp.skills) AS s \
              WHERE s ILIKE $1 ESCAPE '\\' \
              LIMIT $2) \
             UNION ALL \
             (SELECT DISTINCT 'location'::TEXT, u.location, NULL::BIGINT \
              FROM users u \
              WHERE u.is_active = true AND u.location ILIKE $1 ESCAPE '\\' \
              LIMIT $2)",
        )
        .bind(like_pattern(query))
        .bind(per_source)
        .fetch_all(pool)
        .await
    }

    /// Facet counts for professional search.
    ///
    /// Category counts ignore the category filter itself so the UI can show
    /// alternatives; availability counts likewise ignore `available`.
    pub async fn professional_facets(
        pool: &PgPool,
        filters: &ProfessionalFilters,
    ) -> Result<SearchFacets, sqlx::Error> {
        let binds = ProfessionalBinds::from(filters);

        let mut without_categories = binds.clone();
        without_categories.categories.clear();
        let category_query = format!(
            "{RATINGS_CTE}SELECT c AS value, COUNT(*) AS count \
             FROM (SELECT cp.categories {PROFESSIONAL_FROM_WHERE}) f \
             CROSS JOIN LATERAL unnest(f.categories) AS c \
             GROUP BY c ORDER BY count DESC, value ASC"
        );
        let categories =
            bind_professional!(sqlx::query_as::<_, FacetValue>(&category_query), without_categories)
                .fetch_all(pool)
                .await?;

        let location_query = format!(
            "{RATINGS_CTE}SELECT u.location AS value, COUNT(*) AS count \
             {PROFESSIONAL_FROM_WHERE} AND u.location IS NOT NULL \
             GROUP BY u.location ORDER BY count DESC, value ASC LIMIT $8"
        );
        let locations = bind_professional!(sqlx::query_as::<_, FacetValue>(&location_query), binds)
            .bind(LOCATION_FACET_LIMIT)
            .fetch_all(pool)
            .await?;

        let mut without_available = binds.clone();
        without_available.available = None;
        let availability_query = format!(
            "{RATINGS_CTE}SELECT CASE WHEN cp.is_available THEN 'available' \
                                      ELSE 'unavailable' END AS value, \
                                 COUNT(*) AS count \
             {PROFESSIONAL_FROM_WHERE} \
             GROUP BY 1 ORDER BY 1"
        );
        let availability = bind_professional!(
            sqlx::query_as::<_, FacetValue>(&availability_query),
            without_available
        )
        .fetch_all(pool)
        .await?;

        Ok(SearchFacets {
            categories,
            locations,
            availability,
        })
    }

    /// Top-rated available professionals that `user_id` has not booked yet,
    /// excluding the user themself.
    pub async fn suggested_professionals(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<ProfessionalResult>, sqlx::Error> {
        let query = format!(
            "{RATINGS_CTE}{PROFESSIONAL_SELECT} \
             FROM users u \
             JOIN creative_profiles cp ON cp.user_id = u.id \
             LEFT JOIN ratings r ON r.subject_id = u.id \
             WHERE u.is_active = true \
               AND u.role = 'CREATIVE_PROFESSIONAL' \
               AND cp.is_available = true \
               AND u.id <> $1 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM bookings b \
                   WHERE b.planner_id = $1 AND b.professional_id = u.id) \
             ORDER BY average_rating DESC, review_count DESC, u.created_at DESC, u.id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ProfessionalResult>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    pub async fn log_search(pool: &PgPool, entry: &SearchLogEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO search_queries (user_id, search_type, query_text, filters, result_count) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.user_id)
        .bind(entry.search_type)
        .bind(&entry.query_text)
        .bind(&entry.filters)
        .bind(entry.result_count)
        .execute(pool)
        .await?;
        Ok(())
    }
}
