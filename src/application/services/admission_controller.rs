//! Per-client, per-route fixed-window admission control.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::domain::entities::{RateWindow, RoutePolicies};
use crate::error::AppError;

/// Calls between opportunistic sweeps of expired windows.
const SWEEP_INTERVAL_CALLS: u64 = 256;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts a denial into [`AppError::RateLimited`].
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny { retry_after_secs } => Err(AppError::RateLimited { retry_after_secs }),
        }
    }
}

#[derive(Default)]
struct WindowTable {
    windows: HashMap<(String, String), RateWindow>,
    calls: u64,
}

impl WindowTable {
    fn evict_expired(&mut self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.is_expired(now));
        before - self.windows.len()
    }
}

/// Decides allow/deny for each request before it reaches business logic.
///
/// One instance is built at startup and shared through [`crate::state::AppState`].
/// The window table sits behind a single mutex, so the read-then-write on a
/// key is atomic: two concurrent requests can never both take the last slot.
///
/// Memory is bounded by lazily evicting closed windows every
/// `SWEEP_INTERVAL_CALLS` calls, under the same lock.
pub struct AdmissionController {
    policies: RoutePolicies,
    table: Mutex<WindowTable>,
}

impl AdmissionController {
    pub fn new(policies: RoutePolicies) -> Self {
        Self {
            policies,
            table: Mutex::new(WindowTable::default()),
        }
    }

    pub fn policies(&self) -> &RoutePolicies {
        &self.policies
    }

    /// Records a request from `client_key` on `route_key` and decides whether
    /// to admit it.
    ///
    /// # Algorithm
    ///
    /// 1. No window, or the window has closed: open a new one with count 1, allow.
    /// 2. Window full (`count >= limit`): deny with the seconds until it closes.
    /// 3. Otherwise: increment the count, allow.
    ///
    /// Never blocks on I/O and never delays the caller.
    pub fn check_and_record(&self, client_key: &str, route_key: &str, now: Instant) -> Decision {
        let policy = self.policies.resolve(route_key);
        let mut table = self.lock();

        table.calls = table.calls.wrapping_add(1);
        if table.calls % SWEEP_INTERVAL_CALLS == 0 {
            let evicted = table.evict_expired(now);
            if evicted > 0 {
                tracing::debug!(evicted, remaining = table.windows.len(), "Evicted expired rate windows");
            }
        }

        let key = (client_key.to_string(), route_key.to_string());
        match table.windows.get_mut(&key) {
            Some(window) if !window.is_expired(now) => {
                if window.count >= policy.limit {
                    Decision::Deny {
                        retry_after_secs: window.retry_after_secs(now),
                    }
                } else {
                    window.count += 1;
                    Decision::Allow
                }
            }
            _ => {
                table.windows.insert(key, RateWindow::open(now, policy.window));
                Decision::Allow
            }
        }
    }

    /// Removes every window that has closed by `now`. Returns how many were dropped.
    pub fn sweep(&self, now: Instant) -> usize {
        self.lock().evict_expired(now)
    }

    /// Number of `(client, route)` windows currently held.
    pub fn tracked_windows(&self) -> usize {
        self.lock().windows.len()
    }

    // A panic while holding the lock cannot leave a window half-updated, so
    // the poisoned table is still usable.
    fn lock(&self) -> MutexGuard<'_, WindowTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(RoutePolicies::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RouteLimitPolicy;
    use crate::domain::entities::route_policy::{LINK_CREATE, LOGIN, REGISTER};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_first_request_is_allowed() {
        let controller = AdmissionController::default();
        let now = Instant::now();

        assert_eq!(controller.check_and_record("1.2.3.4", LOGIN, now), Decision::Allow);
        assert_eq!(controller.tracked_windows(), 1);
    }

    #[test]
    fn test_login_scenario_five_allowed_sixth_denied() {
        let controller = AdmissionController::default();
        let start = Instant::now();

        for i in 0..5 {
            let at = start + Duration::from_millis(i * 200);
            let decision = controller.check_and_record("10.0.0.1", LOGIN, at);
            assert!(decision.is_allowed(), "request {} should be allowed", i + 1);
        }

        let decision = controller.check_and_record("10.0.0.1", LOGIN, start + secs(1));
        assert_eq!(decision, Decision::Deny { retry_after_secs: 299 });

        let decision = controller.check_and_record("10.0.0.1", LOGIN, start + secs(9));
        assert_eq!(decision, Decision::Deny { retry_after_secs: 291 });
    }

    #[test]
    fn test_limit_plus_one_is_denied_within_window() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(3, 10));
        let controller = AdmissionController::new(policies);
        let now = Instant::now();

        let allowed = (0..10)
            .filter(|_| controller.check_and_record("c", "any", now).is_allowed())
            .count();

        assert_eq!(allowed, 3);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(2, 60));
        let controller = AdmissionController::new(policies);
        let start = Instant::now();

        assert!(controller.check_and_record("c", "r", start).is_allowed());
        assert!(controller.check_and_record("c", "r", start).is_allowed());
        assert!(!controller.check_and_record("c", "r", start + secs(59)).is_allowed());

        // Boundary is inclusive: at reset_at the window is closed.
        assert!(controller.check_and_record("c", "r", start + secs(60)).is_allowed());

        // Fresh window counts from 1, so one more slot remains.
        assert!(controller.check_and_record("c", "r", start + secs(61)).is_allowed());
        assert!(!controller.check_and_record("c", "r", start + secs(62)).is_allowed());
    }

    #[test]
    fn test_retry_after_decreases_toward_reset() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(1, 30));
        let controller = AdmissionController::new(policies);
        let start = Instant::now();

        controller.check_and_record("c", "r", start);

        let mut last = u64::MAX;
        for ms in (0..30_000).step_by(750) {
            match controller.check_and_record("c", "r", start + Duration::from_millis(ms)) {
                Decision::Deny { retry_after_secs } => {
                    assert!(retry_after_secs <= last);
                    last = retry_after_secs;
                }
                Decision::Allow => panic!("window should still be exhausted at {ms}ms"),
            }
        }
        assert!(last >= 1);
    }

    #[test]
    fn test_clients_do_not_share_windows() {
        let controller = AdmissionController::default();
        let now = Instant::now();

        for _ in 0..5 {
            controller.check_and_record("client-a", LOGIN, now);
        }
        assert!(!controller.check_and_record("client-a", LOGIN, now).is_allowed());

        assert!(controller.check_and_record("client-b", LOGIN, now).is_allowed());
        assert!(controller.check_and_record("client-a", REGISTER, now).is_allowed());
        assert!(controller.check_and_record("client-a", LINK_CREATE, now).is_allowed());
    }

    #[test]
    fn test_unlisted_route_uses_default_policy() {
        let controller = AdmissionController::default();
        let now = Instant::now();

        let allowed = (0..20)
            .filter(|_| controller.check_and_record("c", "something-else", now).is_allowed())
            .count();

        assert_eq!(allowed, 10);
    }

    #[test]
    fn test_denied_request_does_not_extend_window() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(1, 10));
        let controller = AdmissionController::new(policies);
        let start = Instant::now();

        controller.check_and_record("c", "r", start);
        for s in 1..10 {
            assert!(!controller.check_and_record("c", "r", start + secs(s)).is_allowed());
        }
        assert!(controller.check_and_record("c", "r", start + secs(10)).is_allowed());
    }

    #[test]
    fn test_sweep_evicts_only_expired_windows() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(5, 10))
            .with_route("long", RouteLimitPolicy::per_seconds(5, 100));
        let controller = AdmissionController::new(policies);
        let start = Instant::now();

        controller.check_and_record("a", "short", start);
        controller.check_and_record("b", "short", start);
        controller.check_and_record("a", "long", start);
        assert_eq!(controller.tracked_windows(), 3);

        assert_eq!(controller.sweep(start + secs(5)), 0);
        assert_eq!(controller.sweep(start + secs(10)), 2);
        assert_eq!(controller.tracked_windows(), 1);
    }

    #[test]
    fn test_periodic_sweep_bounds_memory() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(5, 1));
        let controller = AdmissionController::new(policies);
        let start = Instant::now();

        for i in 0..(SWEEP_INTERVAL_CALLS - 1) {
            controller.check_and_record(&format!("client-{i}"), "r", start);
        }
        assert_eq!(controller.tracked_windows(), (SWEEP_INTERVAL_CALLS - 1) as usize);

        // The next call triggers a sweep; all earlier windows have closed.
        controller.check_and_record("late", "r", start + secs(2));
        assert_eq!(controller.tracked_windows(), 1);
    }

    #[test]
    fn test_concurrent_requests_never_exceed_limit() {
        let policies = RoutePolicies::new(RouteLimitPolicy::per_seconds(10, 60));
        let controller = Arc::new(AdmissionController::new(policies));
        let allowed = Arc::new(AtomicUsize::new(0));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = Arc::clone(&controller);
                let allowed = Arc::clone(&allowed);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        if controller.check_and_record("shared", "r", now).is_allowed() {
                            allowed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(allowed.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_deny_converts_to_rate_limited_error() {
        let err = Decision::Deny { retry_after_secs: 12 }.into_result().unwrap_err();
        assert!(matches!(err, AppError::RateLimited { retry_after_secs: 12 }));
        assert!(Decision::Allow.into_result().is_ok());
    }

    #[test]
    fn test_huge_window_does_not_panic() {
        let policies = RoutePolicies::new(RouteLimitPolicy::new(1, Duration::MAX));
        let controller = AdmissionController::new(policies);
        let now = Instant::now();

        assert!(controller.check_and_record("c", "r", now).is_allowed());
        assert!(!controller.check_and_record("c", "r", now + secs(60)).is_allowed());
    }
}
