//! Repository for the `users` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, PublicUser, UpdateUserProfile, User};

/// Column list for `users` queries.
const COLUMNS: &str = "\
    id, firebase_uid, email, name, role, username, is_verified, is_active, \
    avatar, bio, location, created_at, updated_at";

/// Column list for [`PublicUser`] queries.
const PUBLIC_COLUMNS: &str = "id, name, username, avatar, role, location";

/// Provides user lookups and profile updates.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user on first authentication.
    ///
    /// Idempotent on `firebase_uid`: a concurrent or repeated registration
    /// returns the existing row unchanged.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (firebase_uid, email, name, role, avatar, is_verified) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_users_firebase_uid \
             DO UPDATE SET firebase_uid = EXCLUDED.firebase_uid \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.firebase_uid)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.avatar)
            .bind(input.is_verified)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active user by id. Deactivated users are treated as absent.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_firebase_uid(
        pool: &PgPool,
        firebase_uid: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE firebase_uid = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(firebase_uid)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Public display fields for an active user.
    pub async fn find_public(pool: &PgPool, id: DbId) -> Result<Option<PublicUser>, sqlx::Error> {
        let query =
            format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, PublicUser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Patch display fields. Only non-`None` fields are changed.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUserProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                avatar = COALESCE($3, avatar), \
                bio = COALESCE($4, bio), \
                location = COALESCE($5, location) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.avatar)
            .bind(&input.bio)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    /// Set a user's username. A taken name surfaces as a unique violation
    /// on `uq_users_username`.
    pub async fn set_username(
        pool: &PgPool,
        id: DbId,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET username = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
    }

    /// Which of `candidates` are already taken.
    pub async fn taken_usernames(
        pool: &PgPool,
        candidates: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT username FROM users WHERE username = ANY($1)")
            .bind(candidates)
            .fetch_all(pool)
            .await
    }
}
