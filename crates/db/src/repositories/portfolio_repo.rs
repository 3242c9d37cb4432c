//! Repository for `portfolio_projects` and the append-only
//! `portfolio_views` log.

use collabbridge_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::portfolio::{
    CreatePortfolioProject, PortfolioProject, ProjectViewCount, ViewTotals,
};

/// Column list for `portfolio_projects` queries.
const COLUMNS: &str =
    "id, owner_id, title, description, media_urls, tags, created_at, updated_at";

pub struct PortfolioRepo;

impl PortfolioRepo {
    pub async fn create_project(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePortfolioProject,
    ) -> Result<PortfolioProject, sqlx::Error> {
        let query = format!(
            "INSERT INTO portfolio_projects (owner_id, title, description, media_urls, tags) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PortfolioProject>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.media_urls)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    pub async fn list_projects(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<PortfolioProject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM portfolio_projects WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PortfolioProject>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_project(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PortfolioProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM portfolio_projects WHERE id = $1");
        sqlx::query_as::<_, PortfolioProject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project owned by `owner_id`.
    pub async fn delete_project(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM portfolio_projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a view. `viewed_at` defaults to now when `None`.
    pub async fn record_view(
        pool: &PgPool,
        owner_id: DbId,
        project_id: Option<DbId>,
        viewer_id: Option<DbId>,
        viewer_ip: Option<&str>,
        viewed_at: Option<Timestamp>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO portfolio_views (owner_id, project_id, viewer_id, viewer_ip, viewed_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW())) \
             RETURNING id",
        )
        .bind(owner_id)
        .bind(project_id)
        .bind(viewer_id)
        .bind(viewer_ip)
        .bind(viewed_at)
        .fetch_one(pool)
        .await
    }

    /// View totals for an owner. `recent_since` is exclusive: a view at
    /// exactly that instant is not recent.
    pub async fn view_totals(
        pool: &PgPool,
        owner_id: DbId,
        recent_since: Timestamp,
    ) -> Result<ViewTotals, sqlx::Error> {
        sqlx::query_as::<_, ViewTotals>(
            "SELECT COUNT(*) AS total_views, \
                    COUNT(*) FILTER (WHERE viewed_at > $2) AS recent_views, \
                    COUNT(DISTINCT COALESCE(viewer_id::TEXT, viewer_ip)) AS unique_viewers \
             FROM portfolio_views WHERE owner_id = $1",
        )
        .bind(owner_id)
        .bind(recent_since)
        .fetch_one(pool)
        .await
    }

    /// Per-project view counts, most viewed first.
    pub async fn project_view_counts(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<ProjectViewCount>, sqlx::Error> {
        sqlx::query_as::<_, ProjectViewCount>(
            "SELECT p.id AS project_id, p.title, COUNT(v.id) AS views \
             FROM portfolio_projects p \
             LEFT JOIN portfolio_views v ON v.project_id = p.id \
             WHERE p.owner_id = $1 \
             GROUP BY p.id, p.title \
             ORDER BY views DESC, p.id ASC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }
}
