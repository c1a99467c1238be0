//! Middleware that limits how many requests each client can make per window.

use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, Error};

/// The length of each rate limiting window.
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client over fixed windows.
///
/// Clients are identified by IP address. Requests without a known address
/// share one counter. A limit of zero disables rate limiting.
///
/// Counters live in this process only: they reset when the server restarts
/// and are not shared between server processes.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    counters: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl RateLimiter {
    /// Allow up to `limit` requests per client every [WINDOW].
    pub fn new(limit: u32) -> Self {
        Self::with_window(limit, WINDOW)
    }

    /// Allow up to `limit` requests per client every `window`.
    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A rate limiter that lets every request through.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Record a request from `client` and check whether it is allowed.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::TooManyRequests] if the client has used up its requests for the current window,
    /// - or [Error::RateLimiterLockError] if the counters could not be locked.
    pub fn check(&self, client: Option<IpAddr>, now: Instant) -> Result<(), Error> {
        if self.limit == 0 {
            return Ok(());
        }

        let mut counters = self.counters.lock().map_err(|error| {
            tracing::error!("could not acquire rate limiter lock: {error}");
            Error::RateLimiterLockError
        })?;

        // Only clients with an active window are kept.
        counters.retain(|_, window| now.duration_since(window.started) < self.window);

        let window = counters.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if window.count >= self.limit {
            return Err(Error::TooManyRequests);
        }

        window.count += 1;

        Ok(())
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}

/// Middleware function that rejects requests from clients over their limit.
pub async fn rate_limit(
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());

    if let Err(error) = rate_limiter.check(client, Instant::now()) {
        if error == Error::TooManyRequests {
            tracing::warn!("rate limit exceeded for client {client:?}");
        }

        return error.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::{Duration, Instant},
    };

    use axum::{Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::Error;

    use super::{RateLimiter, rate_limit};

    const CLIENT_A: Option<IpAddr> = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    const CLIENT_B: Option<IpAddr> = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));

    #[test]
    fn allows_requests_up_to_limit() {
        let limiter = RateLimiter::new(2);
        let now = Instant::now();

        assert_eq!(limiter.check(CLIENT_A, now), Ok(()));
        assert_eq!(limiter.check(CLIENT_A, now), Ok(()));
        assert_eq!(limiter.check(CLIENT_A, now), Err(Error::TooManyRequests));
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1);
        let now = Instant::now();

        assert_eq!(limiter.check(CLIENT_A, now), Ok(()));
        assert_eq!(limiter.check(CLIENT_B, now), Ok(()));
        assert_eq!(limiter.check(CLIENT_A, now), Err(Error::TooManyRequests));
    }

    #[test]
    fn counter_resets_after_window() {
        let window = Duration::from_secs(60);
        let limiter = RateLimiter::with_window(1, window);
        let start = Instant::now();

        assert_eq!(limiter.check(CLIENT_A, start), Ok(()));
        assert_eq!(
            limiter.check(CLIENT_A, start + Duration::from_secs(59)),
            Err(Error::TooManyRequests)
        );
        assert_eq!(limiter.check(CLIENT_A, start + window), Ok(()));
    }

    #[test]
    fn counters_are_shared_by_clones_only() {
        let limiter = RateLimiter::new(1);
        let clone = limiter.clone();
        let separate = RateLimiter::new(1);
        let now = Instant::now();

        assert_eq!(limiter.check(CLIENT_A, now), Ok(()));
        assert_eq!(clone.check(CLIENT_A, now), Err(Error::TooManyRequests));
        assert_eq!(separate.check(CLIENT_A, now), Ok(()));
    }

    #[test]
    fn zero_limit_disables_rate_limiting() {
        let limiter = RateLimiter::disabled();
        let now = Instant::now();

        for _ in 0..1000 {
            assert_eq!(limiter.check(CLIENT_A, now), Ok(()));
        }
    }

    #[tokio::test]
    async fn middleware_responds_with_too_many_requests() {
        let limiter = RateLimiter::new(1);
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server.get("/").await.assert_status_ok();
        let response = server.get("/").await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        response.assert_json(&json!({"error": "Too many requests"}));
    }
}
