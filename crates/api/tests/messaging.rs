//! Direct messaging against a migrated database.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use axum::Router;
use collabbridge_api::error::AppError;
use collabbridge_api::services::MessagingService;
use collabbridge_api::ws::WsManager;
use collabbridge_core::error::CoreError;
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::types::DbId;
use collabbridge_db::models::messaging::SendMessage;
use collabbridge_db::models::user::CreateUser;
use collabbridge_db::repositories::UserRepo;
use collabbridge_events::EventBus;
use common::{body_json, send, sign_token};
use serde_json::json;
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

/// Register through the API and return `(token, user_id)`.
async fn register(app: &Router, uid: &str, role: &str) -> (String, i64) {
    let token = sign_token(uid, &format!("{uid}@example.com"), true);
    let response = send(
        app.clone(),
        Method::POST,
        "/api/auth/register",
        Some(&token),
        Some(json!({"role": role, "name": uid})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    (token, json["data"]["id"].as_i64().unwrap())
}

fn service(pool: &PgPool) -> MessagingService {
    MessagingService::new(
        pool.clone(),
        Arc::new(EventBus::default()),
        Arc::new(WsManager::new()),
    )
}

fn hi(recipient_id: DbId) -> SendMessage {
    SendMessage {
        recipient_id,
        content: "hi".into(),
        message_type: None,
        metadata: None,
    }
}

// ---------------------------------------------------------------------------
// Test: only participants can read a conversation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn outsider_cannot_read_conversation(pool: PgPool) {
    let planner = user(&pool, "uid-mp", "EVENT_PLANNER").await;
    let creative = user(&pool, "uid-mc", "CREATIVE_PROFESSIONAL").await;
    let outsider = user(&pool, "uid-mo", "CREATIVE_PROFESSIONAL").await;
    let messaging = service(&pool);

    let sent = messaging.send_message(planner, hi(creative)).await.unwrap();

    let err = messaging
        .get_messages(sent.conversation_id, outsider, PageRequest::new(None, None))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Forbidden(_)));

    let err = messaging
        .get_messages(sent.conversation_id + 1000, planner, PageRequest::new(None, None))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: a sent message reads back unread for the recipient
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn sent_message_reads_back_unread(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (planner_token, _) = register(&app, "uid-sp", "EVENT_PLANNER").await;
    let (creative_token, creative_id) = register(&app, "uid-sc", "CREATIVE_PROFESSIONAL").await;
    let (outsider_token, _) = register(&app, "uid-so", "CREATIVE_PROFESSIONAL").await;

    let response = send(
        app.clone(),
        Method::POST,
        "/api/messages",
        Some(&planner_token),
        Some(json!({"recipientId": creative_id, "content": "hi"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sent = body_json(response).await;
    let conversation_id = sent["data"]["conversationId"].as_i64().unwrap();

    let uri = format!("/api/messages/conversations/{conversation_id}");
    let response = send(app.clone(), Method::GET, &uri, Some(&creative_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let messages = json["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hi");
    assert_eq!(messages[0]["isRead"], false);
    assert_eq!(messages[0]["senderName"], "uid-sp");

    let response = send(app.clone(), Method::GET, &uri, Some(&outsider_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "FORBIDDEN");
}
