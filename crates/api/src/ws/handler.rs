use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use collabbridge_core::error::CoreError;
use collabbridge_core::types::DbId;
use collabbridge_db::repositories::MessageRepo;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{authenticate, bearer_token, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Inbound client frames.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    OpenConversation { conversation_id: DbId },
    CloseConversation,
}

/// GET /api/ws?token=...
///
/// Browsers cannot set headers on a WebSocket handshake, so the identity
/// token may come from the query string; a Bearer header also works.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let token = match params.token.as_deref() {
        Some(token) => token.to_string(),
        None => bearer_token(&headers)?
            .map(str::to_string)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing token".into())))?,
    };
    let user = authenticate(&state, &token).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound frames on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let ws_manager = state.ws_manager.clone();
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), user.user_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(text.as_str()) {
                Ok(frame) => handle_frame(&state, &conn_id, user.user_id, frame).await,
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring unknown frame");
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket disconnected");
}

async fn handle_frame(state: &AppState, conn_id: &str, user_id: DbId, frame: ClientFrame) {
    match frame {
        ClientFrame::OpenConversation { conversation_id } => {
            match MessageRepo::find_conversation(&state.pool, conversation_id).await {
                Ok(Some(conversation)) if conversation.has_participant(user_id) => {
                    state
                        .ws_manager
                        .set_open_conversation(conn_id, Some(conversation_id))
                        .await;
                }
                Ok(_) => {
                    tracing::debug!(conn_id, conversation_id, "Refusing to open foreign conversation");
                }
                Err(e) => {
                    tracing::warn!(conn_id, error = %e, "Failed to load conversation for presence");
                }
            }
        }
        ClientFrame::CloseConversation => {
            state.ws_manager.set_open_conversation(conn_id, None).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_parse_from_tagged_json() {
        let open: ClientFrame =
            serde_json::from_str(r#"{"type":"open_conversation","conversation_id":7}"#).unwrap();
        assert_eq!(open, ClientFrame::OpenConversation { conversation_id: 7 });

        let close: ClientFrame = serde_json::from_str(r#"{"type":"close_conversation"}"#).unwrap();
        assert_eq!(close, ClientFrame::CloseConversation);

        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"dance"}"#).is_err());
    }
}
