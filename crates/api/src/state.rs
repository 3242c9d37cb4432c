use std::sync::Arc;

use collabbridge_db::DbPool;
use collabbridge_events::EventBus;

use crate::auth::identity::{IdentityVerifier, JwtIdentityVerifier};
use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::notifications::NotificationDispatcher;
use crate::services::messaging::MessagingService;
use crate::upload::cloudinary::CloudinaryClient;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Live connections and open-conversation presence.
    pub ws_manager: Arc<WsManager>,
    /// Domain events consumed by the notification router.
    pub event_bus: Arc<EventBus>,
    /// Verifies identity-provider tokens.
    pub identity: Arc<dyn IdentityVerifier>,
    pub rate_limiter: Arc<RateLimiter>,
    /// `None` when Cloudinary is not configured.
    pub uploader: Option<Arc<CloudinaryClient>>,
}

impl AppState {
    /// Build the state from configuration, with a fresh connection
    /// registry, event bus and rate limiter.
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let identity: Arc<dyn IdentityVerifier> =
            Arc::new(JwtIdentityVerifier::new(&config.auth));
        let rate_limiter = Arc::new(RateLimiter::new(config.global_rate_limit));
        let uploader = config
            .cloudinary
            .clone()
            .map(|c| Arc::new(CloudinaryClient::new(c)));

        Self {
            pool,
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            event_bus: Arc::new(EventBus::default()),
            identity,
            rate_limiter,
            uploader,
        }
    }

    pub fn messaging(&self) -> MessagingService {
        MessagingService::new(
            self.pool.clone(),
            Arc::clone(&self.event_bus),
            Arc::clone(&self.ws_manager),
        )
    }

    pub fn notifications(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(self.pool.clone(), Arc::clone(&self.ws_manager))
    }
}
