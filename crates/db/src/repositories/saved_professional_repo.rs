//! Repository for the `saved_professionals` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::saved::SavedProfessional;

pub struct SavedProfessionalRepo;

impl SavedProfessionalRepo {
    /// Save a professional. Saving twice is a no-op; returns whether a row
    /// was inserted.
    pub async fn save(pool: &PgPool, user_id: DbId, professional_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO saved_professionals (user_id, professional_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_saved_professionals_pair DO NOTHING",
        )
        .bind(user_id)
        .bind(professional_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(pool: &PgPool, user_id: DbId, professional_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM saved_professionals WHERE user_id = $1 AND professional_id = $2",
        )
        .bind(user_id)
        .bind(professional_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<SavedProfessional>, sqlx::Error> {
        sqlx::query_as::<_, SavedProfessional>(
            "SELECT s.id, s.professional_id, s.created_at AS saved_at, \
                    u.name, u.username, u.avatar, u.location, \
                    COALESCE(cp.categories, '{}') AS categories, cp.hourly_rate, \
                    COALESCE(cp.is_available, false) AS is_available \
             FROM saved_professionals s \
             JOIN users u ON u.id = s.professional_id \
             LEFT JOIN creative_profiles cp ON cp.user_id = u.id \
             WHERE s.user_id = $1 AND u.is_active = true \
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
