//! Unit tests for `WsManager`.
//!
//! These tests exercise the connection manager directly, without performing
//! any HTTP upgrades. They cover presence, open-conversation tracking,
//! per-user delivery, and shutdown.

use axum::extract::ws::Message;
use collabbridge_api::ws::WsManager;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
    assert!(!manager.is_online(1).await);
}

// ---------------------------------------------------------------------------
// Test: a user stays online until their last connection closes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn presence_tracks_the_last_connection() {
    let manager = WsManager::new();

    let _rx1 = manager.add("tab-1".to_string(), 7).await;
    let _rx2 = manager.add("tab-2".to_string(), 7).await;
    assert!(manager.is_online(7).await);
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("tab-1").await;
    assert!(manager.is_online(7).await);

    manager.remove("tab-2").await;
    assert!(!manager.is_online(7).await);
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: removing an unknown connection is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_nonexistent_is_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1).await;

    manager.remove("does-not-exist").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: open conversation is tracked per connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_conversation_is_tracked_per_connection() {
    let manager = WsManager::new();
    let _rx1 = manager.add("phone".to_string(), 3).await;
    let _rx2 = manager.add("laptop".to_string(), 3).await;

    assert!(manager.set_open_conversation("phone", Some(99)).await);
    assert!(manager.has_conversation_open(3, 99).await);
    assert!(!manager.has_conversation_open(3, 100).await);
    assert!(!manager.has_conversation_open(4, 99).await);

    assert!(manager.set_open_conversation("phone", None).await);
    assert!(!manager.has_conversation_open(3, 99).await);

    assert!(!manager.set_open_conversation("unknown", Some(1)).await);
}

// ---------------------------------------------------------------------------
// Test: send_event delivers a typed frame to every connection of the user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_event_targets_only_the_user() {
    let manager = WsManager::new();
    let mut alice_a = manager.add("a1".to_string(), 1).await;
    let mut alice_b = manager.add("a2".to_string(), 1).await;
    let mut bob = manager.add("b1".to_string(), 2).await;

    let sent = manager
        .send_event(1, "notification", &json!({"title": "Booking confirmed"}))
        .await;
    assert_eq!(sent, 2);

    for rx in [&mut alice_a, &mut alice_b] {
        match rx.recv().await.unwrap() {
            Message::Text(text) => {
                let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                assert_eq!(frame["type"], "notification");
                assert_eq!(frame["data"]["title"], "Booking confirmed");
            }
            other => panic!("Expected text frame, got {other:?}"),
        }
    }
    assert!(bob.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: send_event to an offline user reaches nobody
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_event_to_offline_user_returns_zero() {
    let manager = WsManager::new();

    assert_eq!(manager.send_event(5, "message", &json!({})).await, 0);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all sends Close and clears the map
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_closes_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("c1".to_string(), 1).await;

    manager.shutdown_all().await;

    assert!(matches!(rx.recv().await.unwrap(), Message::Close(None)));
    assert_eq!(manager.connection_count().await, 0);
    assert!(!manager.is_online(1).await);
}

// ---------------------------------------------------------------------------
// Test: ping_all sends a Ping frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();
    let mut rx = manager.add("c1".to_string(), 1).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await.unwrap(), Message::Ping(_)));
}
