//! Client identity used to bucket admission accounting.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Identity reported when nothing else is available, so a missing address
/// still lands in a (shared) bucket instead of bypassing the limiter.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derives the admission key for a request.
///
/// Precedence:
/// 1. First entry of `X-Forwarded-For`
/// 2. `X-Real-Ip`
/// 3. Peer socket address (IP only)
/// 4. [`UNKNOWN_CLIENT`]
///
/// Empty or non-UTF-8 header values are skipped.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_key(&headers, None), "203.0.113.7");
/// ```
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, X_FORWARDED_FOR)
        && let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header_str(headers, X_REAL_IP) {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:54321".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_value_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        assert_eq!(client_key(&headers, peer()), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_when_no_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        assert_eq!(client_key(&headers, peer()), "198.51.100.1");
    }

    #[test]
    fn test_peer_address_fallback() {
        assert_eq!(client_key(&HeaderMap::new(), peer()), "192.0.2.10");
    }

    #[test]
    fn test_ipv6_peer() {
        let addr: SocketAddr = "[::1]:8080".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(addr)), "::1");
    }

    #[test]
    fn test_unknown_when_nothing_available() {
        assert_eq!(client_key(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_empty_forwarded_for_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(" , "));
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        assert_eq!(client_key(&headers, None), "198.51.100.1");
    }

    #[test]
    fn test_invalid_utf8_header_is_skipped() {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_bytes(&[0xFF, 0xFE]) {
            headers.insert(X_FORWARDED_FOR, value);
        }

        assert_eq!(client_key(&headers, peer()), "192.0.2.10");
    }
}
