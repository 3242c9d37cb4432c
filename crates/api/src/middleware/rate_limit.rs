//! In-memory fixed-window rate limiting.
//!
//! [`RateLimiter`] keeps one [`FixedWindow`] per (policy group, client IP).
//! Route groups opt in with [`enforce`]:
//!
//! ```ignore
//! .route_layer(middleware::from_fn_with_state(
//!     (state.clone(), PolicyGroup::Search),
//!     rate_limit::enforce,
//! ))
//! ```
//!
//! Callers presenting a valid token with a verified email get the premium
//! budget. Clients are keyed by socket peer unless `TRUST_PROXY_HEADERS`
//! is on.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{HeaderValue, RETRY_AFTER};
use axum::http::{Extensions, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use collabbridge_core::error::CoreError;
use collabbridge_core::rate_limit::{FixedWindow, PolicyGroup, RateDecision, RatePolicy, UserTier};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::state::AppState;

/// How often expired windows are evicted.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// Fixed-window counters for every policy group.
pub struct RateLimiter {
    policies: HashMap<PolicyGroup, RatePolicy>,
    windows: Mutex<HashMap<(PolicyGroup, String), FixedWindow>>,
}

impl RateLimiter {
    /// Built-in policies, with `global_override` replacing the global one.
    pub fn new(global_override: Option<RatePolicy>) -> Self {
        let mut policies: HashMap<PolicyGroup, RatePolicy> = PolicyGroup::ALL
            .iter()
            .map(|group| (*group, group.default_policy()))
            .collect();
        if let Some(policy) = global_override {
            policies.insert(PolicyGroup::Global, policy);
        }
        Self {
            policies,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self, group: PolicyGroup) -> RatePolicy {
        self.policies
            .get(&group)
            .copied()
            .unwrap_or_else(|| group.default_policy())
    }

    /// Count one request from `client` against `group`.
    pub async fn check(
        &self,
        group: PolicyGroup,
        client: &str,
        tier: UserTier,
        now: Instant,
    ) -> RateDecision {
        let policy = self.policy(group).for_tier(tier);
        let mut windows = self.windows.lock().await;
        windows
            .entry((group, client.to_string()))
            .or_insert_with(|| FixedWindow::new(now))
            .hit(now, policy)
    }

    /// Drop windows that have elapsed. Returns how many were removed.
    pub async fn prune(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|(group, _), window| !window.is_expired(now, self.policy(*group).window));
        before - windows.len()
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Spawn the periodic eviction of expired windows.
pub fn start_pruning(
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let removed = limiter.prune(Instant::now()).await;
                    if removed > 0 {
                        tracing::debug!(removed, "Pruned rate-limit windows");
                    }
                }
            }
        }
    })
}

/// Middleware counting each request against `group`'s budget.
pub async fn enforce(
    State((state, group)): State<(AppState, PolicyGroup)>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(
        request.headers(),
        request.extensions(),
        state.config.trust_proxy_headers,
    )
    .unwrap_or_else(|| "unknown".to_string());
    let tier = caller_tier(&state, request.headers()).await;

    match state
        .rate_limiter
        .check(group, &client, tier, Instant::now())
        .await
    {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!(group = group.as_str(), client = %client, "Rate limit exceeded");
            let mut response = AppError::Core(CoreError::RateLimited(
                "Too many requests, please try again later".into(),
            ))
            .into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}

/// Client address used as the rate-limit key.
///
/// The socket peer by default. With `trust_proxy` set, the right-most
/// `X-Forwarded-For` hop (the one the proxy appended) wins, then
/// `X-Real-IP`. Earlier hops are client-controlled and never used.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> Option<String> {
    let peer = || {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    };
    if !trust_proxy {
        return peer();
    }

    let forwarded = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .last();
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip).map(str::to_string).or_else(peer)
}

async fn caller_tier(state: &AppState, headers: &HeaderMap) -> UserTier {
    let Ok(Some(token)) = bearer_token(headers) else {
        return UserTier::Regular;
    };
    match state.identity.verify(token).await {
        Ok(claims) => UserTier::for_user(false, claims.email_verified),
        Err(_) => UserTier::Regular,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn auth_group_blocks_the_eleventh_request() {
        let limiter = RateLimiter::new(None);
        let now = Instant::now();
        for _ in 0..10 {
            assert_matches!(
                limiter.check(PolicyGroup::Auth, "10.0.0.1", UserTier::Regular, now).await,
                RateDecision::Allowed { .. }
            );
        }
        assert_matches!(
            limiter.check(PolicyGroup::Auth, "10.0.0.1", UserTier::Regular, now).await,
            RateDecision::Limited { .. }
        );
        // Other clients and groups keep their own budget.
        assert_matches!(
            limiter.check(PolicyGroup::Auth, "10.0.0.2", UserTier::Regular, now).await,
            RateDecision::Allowed { .. }
        );
        assert_matches!(
            limiter.check(PolicyGroup::Search, "10.0.0.1", UserTier::Regular, now).await,
            RateDecision::Allowed { .. }
        );
    }

    #[tokio::test]
    async fn global_override_replaces_default() {
        let limiter = RateLimiter::new(Some(RatePolicy {
            window: Duration::from_secs(60),
            max_requests: 1,
        }));
        let now = Instant::now();
        assert_matches!(
            limiter.check(PolicyGroup::Global, "c", UserTier::Regular, now).await,
            RateDecision::Allowed { remaining: 0 }
        );
        assert_matches!(
            limiter.check(PolicyGroup::Global, "c", UserTier::Regular, now).await,
            RateDecision::Limited { .. }
        );
    }

    fn peer(ip: [u8; 4]) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from((ip, 40000))));
        extensions
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn forwarded_header_ignored_unless_trusted() {
        let ip = client_ip(&forwarded("1.2.3.4"), &peer([10, 0, 0, 9]), false);
        assert_eq!(ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn trusted_proxy_uses_right_most_hop() {
        let ip = client_ip(
            &forwarded("6.6.6.6, 203.0.113.7"),
            &peer([10, 0, 0, 9]),
            true,
        );
        assert_eq!(ip.as_deref(), Some("203.0.113.7"));

        let ip = client_ip(&HeaderMap::new(), &peer([10, 0, 0, 9]), true);
        assert_eq!(ip.as_deref(), Some("10.0.0.9"));
    }

    #[tokio::test]
    async fn prune_evicts_elapsed_windows() {
        let limiter = RateLimiter::new(None);
        let start = Instant::now();
        limiter.check(PolicyGroup::Auth, "a", UserTier::Regular, start).await;
        limiter.check(PolicyGroup::Review, "a", UserTier::Regular, start).await;

        let later = start + Duration::from_secs(16 * 60);
        assert_eq!(limiter.prune(later).await, 1);
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
