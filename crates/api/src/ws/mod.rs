//! Live channel: authenticated WebSocket connections, heartbeat, and
//! open-conversation presence.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{ws_handler, ClientFrame};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
