//! Per-route admission policies.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Route key for the login endpoint.
pub const LOGIN: &str = "login";
/// Route key for the registration endpoint.
pub const REGISTER: &str = "register";
/// Route key for link creation.
pub const LINK_CREATE: &str = "link-create";

/// Longest window a policy may declare (one year).
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// How many requests a single client may make to a route within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl RouteLimitPolicy {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    pub const fn per_seconds(limit: u32, secs: u64) -> Self {
        Self::new(limit, Duration::from_secs(secs))
    }
}

impl fmt::Display for RouteLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.limit, self.window.as_secs())
    }
}

/// Error returned when a policy string is not `limit/window_secs`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid rate limit policy '{0}', expected 'limit/window_secs' with both values > 0 and a window of at most one year"
)]
pub struct ParsePolicyError(pub String);

impl FromStr for RouteLimitPolicy {
    type Err = ParsePolicyError;

    /// Parses `"5/300"` as 5 requests per 300 seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePolicyError(s.to_string());

        let (limit, secs) = s.trim().split_once('/').ok_or_else(err)?;
        let limit: u32 = limit.trim().parse().map_err(|_| err())?;
        let secs: u64 = secs.trim().parse().map_err(|_| err())?;

        if limit == 0 || secs == 0 || secs > MAX_WINDOW_SECS {
            return Err(err());
        }

        Ok(Self::per_seconds(limit, secs))
    }
}

/// Static policy table consulted by the admission controller.
///
/// Routes not listed fall back to the default policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicies {
    routes: HashMap<String, RouteLimitPolicy>,
    default: RouteLimitPolicy,
}

impl RoutePolicies {
    /// Creates an empty table where every route uses `default`.
    pub fn new(default: RouteLimitPolicy) -> Self {
        Self {
            routes: HashMap::new(),
            default,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>, policy: RouteLimitPolicy) -> Self {
        self.routes.insert(route.into(), policy);
        self
    }

    pub fn resolve(&self, route: &str) -> RouteLimitPolicy {
        self.routes.get(route).copied().unwrap_or(self.default)
    }

    pub fn default_policy(&self) -> RouteLimitPolicy {
        self.default
    }

    /// Named routes sorted by key, for display.
    pub fn named(&self) -> Vec<(&str, RouteLimitPolicy)> {
        let mut named: Vec<_> = self
            .routes
            .iter()
            .map(|(route, policy)| (route.as_str(), *policy))
            .collect();
        named.sort_by_key(|(route, _)| *route);
        named
    }
}

impl Default for RoutePolicies {
    fn default() -> Self {
        Self::new(RouteLimitPolicy::per_seconds(10, 60))
            .with_route(LOGIN, RouteLimitPolicy::per_seconds(5, 300))
            .with_route(REGISTER, RouteLimitPolicy::per_seconds(3, 600))
            .with_route(LINK_CREATE, RouteLimitPolicy::per_seconds(10, 60))
    }
}
