//! Repository behaviour against a migrated database.

use chrono::{Duration, Utc};
use collabbridge_core::messaging::{MessageType, ParticipantPair};
use collabbridge_core::notification::NotificationType;
use collabbridge_core::types::DbId;
use collabbridge_db::models::messaging::{ConversationRow, NewMessage};
use collabbridge_db::models::notification::NewNotification;
use collabbridge_db::models::user::CreateUser;
use collabbridge_db::repositories::{
    MessageRepo, NotificationRepo, OutboxRepo, PortfolioRepo, SavedProfessionalRepo, UserRepo,
};
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

fn ids(rows: Vec<ConversationRow>) -> Vec<DbId> {
    rows.into_iter().map(|r| r.id).collect()
}

fn text(sender_id: DbId, recipient_id: DbId, content: &str) -> NewMessage {
    NewMessage {
        sender_id,
        recipient_id,
        content: content.to_string(),
        message_type: MessageType::Text,
        metadata: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_user_create_is_idempotent_per_identity(pool: PgPool) {
    let first = user(&pool, "uid-same", "EVENT_PLANNER").await;
    let second = user(&pool, "uid-same", "EVENT_PLANNER").await;
    assert_eq!(first, second);

    let found = UserRepo::find_by_firebase_uid(&pool, "uid-same")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first);
}

/// One conversation per unordered pair, whichever side starts it.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_conversation_is_shared_by_both_orderings(pool: PgPool) {
    let a = user(&pool, "uid-a", "EVENT_PLANNER").await;
    let b = user(&pool, "uid-b", "CREATIVE_PROFESSIONAL").await;

    let ab = MessageRepo::get_or_create_conversation(&pool, ParticipantPair::new(a, b).unwrap())
        .await
        .unwrap();
    let ba = MessageRepo::get_or_create_conversation(&pool, ParticipantPair::new(b, a).unwrap())
        .await
        .unwrap();
    assert_eq!(ab.id, ba.id);

    let sent = MessageRepo::send(&pool, &text(b, a, "hello")).await.unwrap();
    assert_eq!(sent.conversation_id, ab.id);

    let conversation = MessageRepo::find_conversation(&pool, ab.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.last_message_id, Some(sent.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_read_only_touches_recipient_messages(pool: PgPool) {
    let a = user(&pool, "uid-ra", "EVENT_PLANNER").await;
    let b = user(&pool, "uid-rb", "CREATIVE_PROFESSIONAL").await;

    let first = MessageRepo::send(&pool, &text(a, b, "one")).await.unwrap();
    MessageRepo::send(&pool, &text(a, b, "two")).await.unwrap();
    MessageRepo::send(&pool, &text(b, a, "reply")).await.unwrap();

    assert_eq!(MessageRepo::unread_count(&pool, b).await.unwrap(), 2);
    assert_eq!(MessageRepo::mark_read(&pool, first.conversation_id, b).await.unwrap(), 2);
    assert_eq!(MessageRepo::mark_read(&pool, first.conversation_id, b).await.unwrap(), 0);
    assert_eq!(MessageRepo::unread_count(&pool, b).await.unwrap(), 0);
    assert_eq!(MessageRepo::unread_count(&pool, a).await.unwrap(), 1);
}

/// Only the sender can delete, and deleted messages disappear from reads.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_soft_delete_hides_message(pool: PgPool) {
    let a = user(&pool, "uid-da", "EVENT_PLANNER").await;
    let b = user(&pool, "uid-db", "CREATIVE_PROFESSIONAL").await;
    let sent = MessageRepo::send(&pool, &text(a, b, "oops")).await.unwrap();

    assert!(!MessageRepo::soft_delete(&pool, sent.id, b).await.unwrap());
    assert!(MessageRepo::soft_delete(&pool, sent.id, a).await.unwrap());
    assert!(!MessageRepo::soft_delete(&pool, sent.id, a).await.unwrap());

    assert!(MessageRepo::find_message(&pool, sent.id).await.unwrap().is_none());
    assert_eq!(MessageRepo::unread_count(&pool, b).await.unwrap(), 0);
}

/// Each participant sees the shared conversation once, with their own
/// unread count.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_conversation_list_is_per_viewer(pool: PgPool) {
    let a = user(&pool, "uid-la", "EVENT_PLANNER").await;
    let b = user(&pool, "uid-lb", "CREATIVE_PROFESSIONAL").await;
    let c = user(&pool, "uid-lc", "CREATIVE_PROFESSIONAL").await;

    let shared = MessageRepo::send(&pool, &text(a, b, "one")).await.unwrap();
    MessageRepo::send(&pool, &text(a, b, "two")).await.unwrap();
    MessageRepo::send(&pool, &text(b, a, "reply")).await.unwrap();
    let other = MessageRepo::send(&pool, &text(c, a, "hello")).await.unwrap();

    let for_a = MessageRepo::list_conversations(&pool, a, 20, 0).await.unwrap();
    assert_eq!(
        for_a.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![other.conversation_id, shared.conversation_id]
    );
    assert_eq!(for_a[0].other_id, c);
    assert_eq!(for_a[0].unread_count, 1);
    assert_eq!(for_a[1].other_id, b);
    assert_eq!(for_a[1].unread_count, 1);
    assert_eq!(for_a[1].last_message_content.as_deref(), Some("reply"));

    let for_b = MessageRepo::list_conversations(&pool, b, 20, 0).await.unwrap();
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].id, shared.conversation_id);
    assert_eq!(for_b[0].other_id, a);
    assert_eq!(for_b[0].unread_count, 2);

    assert_eq!(MessageRepo::count_conversations(&pool, a).await.unwrap(), 2);
    assert_eq!(MessageRepo::count_conversations(&pool, b).await.unwrap(), 1);
}

/// Deleting the latest message moves the conversation back to its previous
/// activity time.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_soft_delete_recomputes_conversation_order(pool: PgPool) {
    let a = user(&pool, "uid-oa", "EVENT_PLANNER").await;
    let b = user(&pool, "uid-ob2", "CREATIVE_PROFESSIONAL").await;
    let c = user(&pool, "uid-oc", "CREATIVE_PROFESSIONAL").await;

    let early = MessageRepo::send(&pool, &text(a, c, "early")).await.unwrap();
    let middle = MessageRepo::send(&pool, &text(a, b, "middle")).await.unwrap();
    let late = MessageRepo::send(&pool, &text(a, c, "late")).await.unwrap();
    let ac = early.conversation_id;
    let ab = middle.conversation_id;

    assert_eq!(
        ids(MessageRepo::list_conversations(&pool, a, 20, 0).await.unwrap()),
        vec![ac, ab]
    );

    assert!(MessageRepo::soft_delete(&pool, late.id, a).await.unwrap());
    let conversation = MessageRepo::find_conversation(&pool, ac).await.unwrap().unwrap();
    assert_eq!(conversation.last_message_id, Some(early.id));
    assert_eq!(conversation.last_message_at, Some(early.created_at));
    assert_eq!(
        ids(MessageRepo::list_conversations(&pool, a, 20, 0).await.unwrap()),
        vec![ab, ac]
    );

    assert!(MessageRepo::soft_delete(&pool, early.id, a).await.unwrap());
    let conversation = MessageRepo::find_conversation(&pool, ac).await.unwrap().unwrap();
    assert_eq!(conversation.last_message_id, None);
    assert_eq!(conversation.last_message_at, None);
    assert_eq!(
        ids(MessageRepo::list_conversations(&pool, a, 20, 0).await.unwrap()),
        vec![ab, ac]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_notifications_are_scoped_to_their_owner(pool: PgPool) {
    let owner = user(&pool, "uid-no", "CREATIVE_PROFESSIONAL").await;
    let other = user(&pool, "uid-nx", "EVENT_PLANNER").await;

    let created = NotificationRepo::create(
        &pool,
        &NewNotification::new(owner, NotificationType::NewReview, "New review", "5 stars"),
    )
    .await
    .unwrap();
    NotificationRepo::create(
        &pool,
        &NewNotification::new(owner, NotificationType::System, "Welcome", "Hi"),
    )
    .await
    .unwrap();
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 2);

    assert!(NotificationRepo::mark_read(&pool, created.id, other)
        .await
        .unwrap()
        .is_none());
    let read = NotificationRepo::mark_read(&pool, created.id, owner)
        .await
        .unwrap()
        .unwrap();
    assert!(read.is_read);
    assert!(read.read_at.is_some());

    assert_eq!(NotificationRepo::mark_all_read(&pool, owner).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 0);

    assert!(!NotificationRepo::delete(&pool, created.id, other).await.unwrap());
    assert!(NotificationRepo::delete(&pool, created.id, owner).await.unwrap());
}

/// A claimed outbox row is leased and not handed out twice.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_outbox_claim_leases_rows(pool: PgPool) {
    let owner = user(&pool, "uid-ob", "EVENT_PLANNER").await;
    let id = OutboxRepo::enqueue(
        &pool,
        None,
        owner,
        "email",
        "uid-ob@example.com",
        "Booking request",
        "You have a new booking request",
    )
    .await
    .unwrap();

    let claimed = OutboxRepo::claim_due(&pool, 10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, id);
    assert!(OutboxRepo::claim_due(&pool, 10).await.unwrap().is_empty());

    OutboxRepo::record_failure(&pool, id, "smtp timeout", 0).await.unwrap();
    assert_eq!(OutboxRepo::pending_count(&pool).await.unwrap(), 1);

    OutboxRepo::mark_delivered(&pool, id).await.unwrap();
    assert_eq!(OutboxRepo::pending_count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_saving_twice_is_a_noop(pool: PgPool) {
    let planner = user(&pool, "uid-sp", "EVENT_PLANNER").await;
    let creative = user(&pool, "uid-sc", "CREATIVE_PROFESSIONAL").await;

    assert!(SavedProfessionalRepo::save(&pool, planner, creative).await.unwrap());
    assert!(!SavedProfessionalRepo::save(&pool, planner, creative).await.unwrap());
    assert_eq!(SavedProfessionalRepo::list(&pool, planner).await.unwrap().len(), 1);

    assert!(SavedProfessionalRepo::remove(&pool, planner, creative).await.unwrap());
    assert!(!SavedProfessionalRepo::remove(&pool, planner, creative).await.unwrap());
}

/// Views older than the recent window count toward the total only.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_view_totals_split_recent_views(pool: PgPool) {
    let owner = user(&pool, "uid-pv", "CREATIVE_PROFESSIONAL").await;
    let viewer = user(&pool, "uid-pw", "EVENT_PLANNER").await;
    let now = Utc::now();

    let day_old = Some(now - Duration::hours(25));
    PortfolioRepo::record_view(&pool, owner, None, Some(viewer), None, day_old)
        .await
        .unwrap();
    PortfolioRepo::record_view(&pool, owner, None, Some(viewer), None, None)
        .await
        .unwrap();
    PortfolioRepo::record_view(&pool, owner, None, None, Some("203.0.113.9"), None)
        .await
        .unwrap();

    let totals = PortfolioRepo::view_totals(&pool, owner, now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(totals.total_views, 3);
    assert_eq!(totals.recent_views, 2);
    assert_eq!(totals.unique_viewers, 2);
}
