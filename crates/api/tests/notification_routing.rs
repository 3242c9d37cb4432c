//! Notification fan-out against a migrated database.

use std::sync::Arc;

use collabbridge_api::notifications::NotificationRouter;
use collabbridge_api::ws::WsManager;
use collabbridge_core::types::DbId;
use collabbridge_db::models::user::CreateUser;
use collabbridge_db::repositories::{NotificationRepo, UserRepo};
use collabbridge_events::{names, PlatformEvent};
use sqlx::PgPool;

async fn user(pool: &PgPool, uid: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            firebase_uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            name: uid.to_string(),
            role: role.to_string(),
            avatar: None,
            is_verified: true,
        },
    )
    .await
    .unwrap()
    .id
}

async fn event_starting_tomorrow(pool: &PgPool, creator_id: DbId) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO events (creator_id, title, event_type, start_date, end_date, status) \
         VALUES ($1, 'Harbour Concert', 'CONCERT', NOW() + INTERVAL '20 hours', \
                 NOW() + INTERVAL '26 hours', 'PUBLISHED') \
         RETURNING id",
    )
    .bind(creator_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn booking(
    pool: &PgPool,
    event_id: DbId,
    planner_id: DbId,
    professional_id: DbId,
    status: &str,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO bookings (event_id, planner_id, professional_id, status) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(event_id)
    .bind(planner_id)
    .bind(professional_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Make every notification insert for `user_id` fail.
async fn reject_notifications_for(pool: &PgPool, user_id: DbId) {
    sqlx::query(&format!(
        "CREATE FUNCTION reject_notification() RETURNS trigger AS $$ \
         BEGIN \
             IF NEW.user_id = {user_id} THEN \
                 RAISE EXCEPTION 'notification store unavailable'; \
             END IF; \
             RETURN NEW; \
         END; $$ LANGUAGE plpgsql"
    ))
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_notification BEFORE INSERT ON notifications \
         FOR EACH ROW EXECUTE FUNCTION reject_notification()",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn router(pool: &PgPool) -> NotificationRouter {
    NotificationRouter::new(pool.clone(), Arc::new(WsManager::new()))
}

// ---------------------------------------------------------------------------
// Test: a reminder reaches every booked professional even when the planner's
// notification cannot be stored
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn reminder_continues_past_a_failed_recipient(pool: PgPool) {
    let planner = user(&pool, "uid-rp", "EVENT_PLANNER").await;
    let first = user(&pool, "uid-r1", "CREATIVE_PROFESSIONAL").await;
    let second = user(&pool, "uid-r2", "CREATIVE_PROFESSIONAL").await;
    let event_id = event_starting_tomorrow(&pool, planner).await;
    booking(&pool, event_id, planner, first, "ACCEPTED").await;
    booking(&pool, event_id, planner, second, "ACCEPTED").await;

    reject_notifications_for(&pool, planner).await;

    router(&pool)
        .route_event(&PlatformEvent::new(names::EVENT_REMINDER).with_source("event", event_id))
        .await
        .unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, planner).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, first).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, second).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: a completed booking still notifies the professional when the
// planner's copy fails
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn booking_fan_out_continues_past_a_failed_recipient(pool: PgPool) {
    let planner = user(&pool, "uid-bp", "EVENT_PLANNER").await;
    let professional = user(&pool, "uid-bc", "CREATIVE_PROFESSIONAL").await;
    let event_id = event_starting_tomorrow(&pool, planner).await;
    let booking_id = booking(&pool, event_id, planner, professional, "COMPLETED").await;

    reject_notifications_for(&pool, planner).await;

    router(&pool)
        .route_event(
            &PlatformEvent::new(names::BOOKING_COMPLETED)
                .with_source("booking", booking_id)
                .with_actor(planner),
        )
        .await
        .unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, planner).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, professional).await.unwrap(), 1);
}
