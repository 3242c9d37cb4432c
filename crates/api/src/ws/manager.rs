use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use collabbridge_core::types::DbId;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user that owns the connection.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Conversation currently open in this client, if any.
    pub open_conversation: Option<DbId>,
}

/// Outbound frame: `{ "type": ..., "data": ... }`.
#[derive(Serialize)]
struct Frame<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a T,
}

/// Manages all active WebSocket connections and the presence derived from
/// them.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            open_conversation: None,
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Whether the user has at least one live connection.
    pub async fn is_online(&self, user_id: DbId) -> bool {
        self.connections
            .read()
            .await
            .values()
            .any(|conn| conn.user_id == user_id)
    }

    /// Record which conversation a connection has open (`None` to close).
    ///
    /// Returns `false` when the connection is unknown.
    pub async fn set_open_conversation(&self, conn_id: &str, conversation_id: Option<DbId>) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.open_conversation = conversation_id;
                true
            }
            None => false,
        }
    }

    /// Whether any of the user's connections is viewing the conversation.
    pub async fn has_conversation_open(&self, user_id: DbId, conversation_id: DbId) -> bool {
        self.connections
            .read()
            .await
            .values()
            .any(|conn| conn.user_id == user_id && conn.open_conversation == Some(conversation_id))
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == user_id {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Push a typed JSON frame to every connection of a user.
    pub async fn send_event<T: Serialize>(&self, user_id: DbId, kind: &str, data: &T) -> usize {
        match serde_json::to_string(&Frame { kind, data }) {
            Ok(text) => self.send_to_user(user_id, Message::Text(text.into())).await,
            Err(e) => {
                tracing::error!(error = %e, kind, "Failed to serialize WebSocket frame");
                0
            }
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
