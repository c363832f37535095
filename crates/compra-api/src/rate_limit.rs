//! # Rate Limiting
//!
//! Fixed-window request limit per client IP address.

use crate::handlers::ErrorResponse;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

/// Tracked clients before expired windows are swept
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u64,
}

/// Per-IP fixed-window counter
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max: u64,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max: u64) -> Self {
        Self {
            window,
            max,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request from `ip`.
    ///
    /// Returns the time until the window resets when the client is over
    /// its limit.
    pub fn check(&self, ip: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if clients.len() > PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = clients.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max {
            return Err(self.window.saturating_sub(now.duration_since(entry.started)));
        }

        entry.count += 1;
        Ok(())
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }
}

/// Middleware answering 429 once a client exhausts its window
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip, Instant::now()) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = %ip, "Rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::new(
                    "Too many requests",
                    "Please try again later",
                )),
            )
                .into_response();

            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_limit_per_client() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();

        assert!(limiter.check(CLIENT, now).is_ok());
        assert!(limiter.check(CLIENT, now).is_ok());
        assert!(limiter.check(CLIENT, now).is_err());

        // Separate budget per address
        assert!(limiter.check(OTHER, now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let start = Instant::now();

        assert!(limiter.check(CLIENT, start).is_ok());
        let retry = limiter
            .check(CLIENT, start + Duration::from_secs(20))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(40));

        assert!(limiter
            .check(CLIENT, start + Duration::from_secs(60))
            .is_ok());
    }

    #[test]
    fn test_expired_windows_are_pruned() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 5);
        let start = Instant::now();

        for i in 0..=PRUNE_THRESHOLD as u32 {
            let ip = IpAddr::V4(Ipv4Addr::from(i));
            limiter.check(ip, start).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), PRUNE_THRESHOLD + 1);

        limiter
            .check(CLIENT, start + Duration::from_secs(2))
            .unwrap();
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
