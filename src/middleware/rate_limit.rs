//! Rate limiting middleware
//!
//! Form posts are limited per client IP. Page loads are not limited.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::config::FeaturesConfig;
use crate::services::AppState;
use crate::utils::errors::{DashboardError, Result};

/// Tracked clients above which a check prunes idle entries
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Rate limiting middleware
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    enabled: bool,
    trust_forwarded_for: bool,
}

impl RateLimitMiddleware {
    /// Create a new RateLimitMiddleware instance
    pub fn new(config: &FeaturesConfig) -> Self {
        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            enabled: config.rate_limit,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Check if the client is rate limited
    pub fn check(&self, client: IpAddr) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.cleanup_old_entries();
        }
        match self.limiter.check_key(&client) {
            Ok(()) => {
                debug!(client = %client, "Rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(client = %client, "Rate limit exceeded");
                Err(DashboardError::RateLimitExceeded)
            }
        }
    }

    /// Drop clients whose quota has fully replenished
    pub fn cleanup_old_entries(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(remaining_entries = self.limiter.len(), "Cleaned up old rate limit entries");
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Client address: the socket peer, or the first `x-forwarded-for` hop
    /// when the deployment sits behind a trusted proxy
    pub fn client_ip(&self, request: &Request) -> IpAddr {
        let forwarded = self
            .trust_forwarded_for
            .then(|| {
                request
                    .headers()
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .and_then(|v| v.trim().parse().ok())
            })
            .flatten();

        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::POST {
        let client = state.rate_limiter.client_ip(&request);
        if let Err(e) = state.rate_limiter.check(client) {
            return e.into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tokio_test::{assert_err, assert_ok};

    fn features(per_minute: u32, trust_forwarded_for: bool) -> FeaturesConfig {
        let mut features = Settings::default().features;
        features.rate_limit_per_minute = per_minute;
        features.trust_forwarded_for = trust_forwarded_for;
        features
    }

    fn request_without_header(peer: &str) -> Request {
        let mut request = Request::builder().body(axum::body::Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    fn forwarded_request(forwarded_for: &str, peer: &str) -> Request {
        let mut request = Request::builder()
            .header("x-forwarded-for", forwarded_for)
            .body(axum::body::Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    #[test]
    fn test_limit_per_client() {
        let limiter = RateLimitMiddleware::new(&features(2, false));
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert_ok!(limiter.check(a));
        assert_ok!(limiter.check(a));
        assert!(matches!(assert_err!(limiter.check(a)), DashboardError::RateLimitExceeded));
        assert_ok!(limiter.check(b));
    }

    #[test]
    fn test_disabled_limiter_allows_everything() {
        let mut config = features(1, false);
        config.rate_limit = false;
        let limiter = RateLimitMiddleware::new(&config);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        for _ in 0..5 {
            assert_ok!(limiter.check(ip));
        }
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let limiter = RateLimitMiddleware::new(&features(2, false));
        let mut results = Vec::new();
        for i in 0..5 {
            let request = forwarded_request(&format!("198.51.100.{}", i), "192.0.2.10:50000");
            results.push(limiter.check(limiter.client_ip(&request)).is_ok());
        }
        assert_eq!(results, vec![true, true, false, false, false]);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_forwarded_header_used_behind_trusted_proxy() {
        let limiter = RateLimitMiddleware::new(&features(2, true));
        let request = forwarded_request("203.0.113.7, 10.0.0.1", "192.0.2.10:50000");
        assert_eq!(limiter.client_ip(&request), "203.0.113.7".parse::<IpAddr>().unwrap());

        let request = request_without_header("192.0.2.10:50000");
        assert_eq!(limiter.client_ip(&request), "192.0.2.10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_cleanup_keeps_limited_clients() {
        let limiter = RateLimitMiddleware::new(&features(2, false));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert_ok!(limiter.check(ip));
        assert_ok!(limiter.check(ip));

        limiter.cleanup_old_entries();
        assert_eq!(limiter.tracked_clients(), 1);
        assert_err!(limiter.check(ip));
    }
}
