//! Repository for the `reviews` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, RatingSummary, Review, ReviewWithAuthor, UpdateReview};

/// Column list for `reviews` queries.
const COLUMNS: &str = "\
    id, booking_id, event_id, author_id, subject_id, rating, comment, created_at, updated_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A duplicate for the same (author, subject, booking)
    /// fails on `uq_reviews_author_subject_booking`.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (booking_id, event_id, author_id, subject_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.booking_id)
            .bind(input.event_id)
            .bind(author_id)
            .bind(input.subject_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The review `author_id` left for a booking, if any.
    pub async fn find_for_booking(
        pool: &PgPool,
        author_id: DbId,
        booking_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM reviews WHERE author_id = $1 AND booking_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(author_id)
            .bind(booking_id)
            .fetch_optional(pool)
            .await
    }

    /// Reviews received by a user, newest first.
    pub async fn list_for_subject(
        pool: &PgPool,
        subject_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.booking_id, r.event_id, r.author_id, r.subject_id, r.rating, \
                    r.comment, r.created_at, r.updated_at, \
                    u.name AS author_name, u.avatar AS author_avatar \
             FROM reviews r JOIN users u ON u.id = r.author_id \
             WHERE r.subject_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(subject_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Average rating (0 without reviews) and review count for a user.
    pub async fn rating_summary(pool: &PgPool, subject_id: DbId) -> Result<RatingSummary, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT COALESCE(AVG(rating)::DOUBLE PRECISION, 0) AS average_rating, \
                    COUNT(*) AS review_count \
             FROM reviews WHERE subject_id = $1",
        )
        .bind(subject_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET \
                rating = COALESCE($2, rating), \
                comment = COALESCE($3, comment) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
