//! Repository for `event_planner_profiles` and `creative_profiles`.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{
    CreativeProfile, PlannerProfile, UpdateCreativeProfile, UpdatePlannerProfile,
};

const PLANNER_COLUMNS: &str = "id, user_id, company_name, website, created_at, updated_at";

const CREATIVE_COLUMNS: &str = "\
    id, user_id, categories, skills, hourly_rate, is_available, experience, \
    portfolio_links, created_at, updated_at";

/// Role profile lookups and upserts. Each user has at most one of each.
pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_planner(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<PlannerProfile>, sqlx::Error> {
        let query =
            format!("SELECT {PLANNER_COLUMNS} FROM event_planner_profiles WHERE user_id = $1");
        sqlx::query_as::<_, PlannerProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or patch the planner profile for a user.
    pub async fn upsert_planner(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdatePlannerProfile,
    ) -> Result<PlannerProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_planner_profiles (user_id, company_name, website) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_event_planner_profiles_user DO UPDATE SET \
                company_name = COALESCE(EXCLUDED.company_name, event_planner_profiles.company_name), \
                website = COALESCE(EXCLUDED.website, event_planner_profiles.website) \
             RETURNING {PLANNER_COLUMNS}"
        );
        sqlx::query_as::<_, PlannerProfile>(&query)
            .bind(user_id)
            .bind(&input.company_name)
            .bind(&input.website)
            .fetch_one(pool)
            .await
    }

    pub async fn find_creative(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<CreativeProfile>, sqlx::Error> {
        let query = format!("SELECT {CREATIVE_COLUMNS} FROM creative_profiles WHERE user_id = $1");
        sqlx::query_as::<_, CreativeProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or patch the creative profile for a user.
    pub async fn upsert_creative(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateCreativeProfile,
    ) -> Result<CreativeProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO creative_profiles \
                (user_id, categories, skills, hourly_rate, is_available, experience, portfolio_links) \
             VALUES ($1, COALESCE($2::TEXT[], '{{}}'), COALESCE($3::TEXT[], '{{}}'), \
                     $4::DOUBLE PRECISION, COALESCE($5::BOOLEAN, true), $6::TEXT, \
                     COALESCE($7::TEXT[], '{{}}')) \
             ON CONFLICT ON CONSTRAINT uq_creative_profiles_user DO UPDATE SET \
                categories = COALESCE($2, creative_profiles.categories), \
                skills = COALESCE($3, creative_profiles.skills), \
                hourly_rate = COALESCE($4, creative_profiles.hourly_rate), \
                is_available = COALESCE($5, creative_profiles.is_available), \
                experience = COALESCE($6, creative_profiles.experience), \
                portfolio_links = COALESCE($7, creative_profiles.portfolio_links) \
             RETURNING {CREATIVE_COLUMNS}"
        );
        sqlx::query_as::<_, CreativeProfile>(&query)
            .bind(user_id)
            .bind(&input.categories)
            .bind(&input.skills)
            .bind(input.hourly_rate)
            .bind(input.is_available)
            .bind(&input.experience)
            .bind(&input.portfolio_links)
            .fetch_one(pool)
            .await
    }
}
