//! Fixed counting window tracked per `(client, route)` pair.

use std::time::{Duration, Instant};

use super::route_policy::MAX_WINDOW_SECS;

/// Number of requests admitted so far in the current window, and when the
/// window closes.
///
/// `count` only grows while `now < reset_at`. Once the window has closed the
/// entry must be replaced via [`RateWindow::open`], never incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateWindow {
    /// Opens a fresh window that already accounts for the current request.
    ///
    /// Windows longer than [`MAX_WINDOW_SECS`] are clamped to it.
    pub fn open(now: Instant, window: Duration) -> Self {
        let window = window.min(Duration::from_secs(MAX_WINDOW_SECS));
        Self {
            count: 1,
            reset_at: now.checked_add(window).unwrap_or(now),
        }
    }

    /// Returns true once `now` has reached the window boundary.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }

    /// Whole seconds until the window closes, rounded up.
    ///
    /// Computed from millisecond precision so that 299.2s remaining reports 300.
    /// Never 0 while the window is still open.
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let remaining = self.reset_at.saturating_duration_since(now);
        if remaining.is_zero() {
            return 0;
        }
        (remaining.as_millis().div_ceil(1000) as u64).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_counts_current_request() {
        let now = Instant::now();
        let window = RateWindow::open(now, Duration::from_secs(60));

        assert_eq!(window.count, 1);
        assert_eq!(window.reset_at, now + Duration::from_secs(60));
        assert!(!window.is_expired(now));
    }

    #[test]
    fn test_open_clamps_oversized_window() {
        let now = Instant::now();
        let window = RateWindow::open(now, Duration::from_secs(u64::MAX));

        assert_eq!(window.reset_at, now + Duration::from_secs(MAX_WINDOW_SECS));
        assert!(!window.is_expired(now));
    }

    #[test]
    fn test_expired_at_boundary() {
        let now = Instant::now();
        let window = RateWindow::open(now, Duration::from_secs(10));

        assert!(!window.is_expired(now + Duration::from_millis(9_999)));
        assert!(window.is_expired(now + Duration::from_secs(10)));
        assert!(window.is_expired(now + Duration::from_secs(11)));
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Instant::now();
        let window = RateWindow::open(now, Duration::from_secs(300));

        assert_eq!(window.retry_after_secs(now), 300);
        assert_eq!(window.retry_after_secs(now + Duration::from_millis(800)), 300);
        assert_eq!(window.retry_after_secs(now + Duration::from_secs(1)), 299);
        assert_eq!(window.retry_after_secs(now + Duration::from_millis(299_001)), 1);
        assert_eq!(
            window.retry_after_secs(now + Duration::from_micros(299_999_500)),
            1
        );
    }

    #[test]
    fn test_retry_after_never_negative() {
        let now = Instant::now();
        let window = RateWindow::open(now, Duration::from_secs(1));

        assert_eq!(window.retry_after_secs(now + Duration::from_secs(5)), 0);
    }
}
