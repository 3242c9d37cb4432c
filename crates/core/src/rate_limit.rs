//! Rate-limit policies and the fixed-window counter behind them.
//!
//! The API layer keys one [`FixedWindow`] per (policy, client) and asks it
//! whether each request fits.

use std::time::{Duration, Instant};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// Route groups with their own request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyGroup {
    Global,
    Auth,
    Upload,
    Search,
    Message,
    EventCreation,
    Booking,
    Review,
    Admin,
}

impl PolicyGroup {
    pub const ALL: &'static [PolicyGroup] = &[
        PolicyGroup::Global,
        PolicyGroup::Auth,
        PolicyGroup::Upload,
        PolicyGroup::Search,
        PolicyGroup::Message,
        PolicyGroup::EventCreation,
        PolicyGroup::Booking,
        PolicyGroup::Review,
        PolicyGroup::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyGroup::Global => "global",
            PolicyGroup::Auth => "auth",
            PolicyGroup::Upload => "upload",
            PolicyGroup::Search => "search",
            PolicyGroup::Message => "message",
            PolicyGroup::EventCreation => "eventCreation",
            PolicyGroup::Booking => "booking",
            PolicyGroup::Review => "review",
            PolicyGroup::Admin => "admin",
        }
    }

    /// Built-in budget for this group.
    pub fn default_policy(self) -> RatePolicy {
        let (window_secs, max_requests) = match self {
            PolicyGroup::Global => (15 * MINUTE, 1000),
            PolicyGroup::Auth => (15 * MINUTE, 10),
            PolicyGroup::Upload => (HOUR, 50),
            PolicyGroup::Search => (10 * MINUTE, 100),
            PolicyGroup::Message => (HOUR, 200),
            PolicyGroup::EventCreation => (24 * HOUR, 20),
            PolicyGroup::Booking => (HOUR, 30),
            PolicyGroup::Review => (24 * HOUR, 10),
            PolicyGroup::Admin => (15 * MINUTE, 100),
        };
        RatePolicy {
            window: Duration::from_secs(window_secs),
            max_requests,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl RatePolicy {
    /// Scale the budget for a caller tier. The window stays the same.
    pub fn for_tier(self, tier: UserTier) -> Self {
        Self {
            window: self.window,
            max_requests: self.max_requests.saturating_mul(tier.multiplier()),
        }
    }
}

/// Caller tier. Premium callers get a larger budget in every group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserTier {
    #[default]
    Regular,
    Premium,
}

impl UserTier {
    /// Admins and verified accounts are premium.
    pub fn for_user(is_admin: bool, is_verified: bool) -> Self {
        if is_admin || is_verified {
            UserTier::Premium
        } else {
            UserTier::Regular
        }
    }

    pub fn multiplier(self) -> u32 {
        match self {
            UserTier::Regular => 1,
            UserTier::Premium => 2,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Counter for a single key within a fixed window.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    started: Instant,
    count: u32,
}

impl FixedWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }

    /// Count one request at `now`, opening a fresh window once the current
    /// one has elapsed.
    pub fn hit(&mut self, now: Instant, policy: RatePolicy) -> RateDecision {
        if now.duration_since(self.started) >= policy.window {
            self.started = now;
            self.count = 0;
        }
        if self.count >= policy.max_requests {
            let elapsed = now.duration_since(self.started);
            return RateDecision::Limited {
                retry_after: policy.window.saturating_sub(elapsed),
            };
        }
        self.count += 1;
        RateDecision::Allowed {
            remaining: policy.max_requests - self.count,
        }
    }

    /// Whether the window has elapsed and the entry can be evicted.
    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.started) >= window
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn policy_table_matches_documented_budgets() {
        let auth = PolicyGroup::Auth.default_policy();
        assert_eq!(auth.window, Duration::from_secs(900));
        assert_eq!(auth.max_requests, 10);

        let review = PolicyGroup::Review.default_policy();
        assert_eq!(review.window, Duration::from_secs(86_400));
        assert_eq!(review.max_requests, 10);

        assert_eq!(PolicyGroup::Global.default_policy().max_requests, 1000);
    }

    #[test]
    fn premium_doubles_budget() {
        let policy = PolicyGroup::Booking.default_policy().for_tier(UserTier::Premium);
        assert_eq!(policy.max_requests, 60);
        assert_eq!(UserTier::for_user(false, false), UserTier::Regular);
        assert_eq!(UserTier::for_user(true, false), UserTier::Premium);
    }

    #[test]
    fn window_blocks_after_budget_then_resets() {
        let policy = RatePolicy {
            window: Duration::from_secs(60),
            max_requests: 2,
        };
        let start = Instant::now();
        let mut window = FixedWindow::new(start);

        assert_eq!(window.hit(start, policy), RateDecision::Allowed { remaining: 1 });
        assert_eq!(window.hit(start, policy), RateDecision::Allowed { remaining: 0 });
        assert_matches!(
            window.hit(start + Duration::from_secs(10), policy),
            RateDecision::Limited { retry_after } if retry_after == Duration::from_secs(50)
        );

        let later = start + Duration::from_secs(61);
        assert!(window.is_expired(later, policy.window));
        assert_eq!(window.hit(later, policy), RateDecision::Allowed { remaining: 1 });
    }
}
