//! Per-client rate limiting.
//!
//! Each peer IP gets its own GCRA bucket sized to the configured budget: the
//! full budget is available as a burst and refills evenly over the window.
//! Every response carries the `RateLimit-*` headers describing the caller's
//! bucket; a rejected request also gets `Retry-After`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use governor::clock::Clock;
use governor::middleware::StateInformationMiddleware;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::error::error_response;
use crate::{RateLimit, ServerError};

/// Stale buckets are pruned once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 10_000;

/// The tracked-client count is only looked at once per this many checks.
const PRUNE_EVERY: u64 = 1_024;

const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Where a client stands after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Budget {
    /// Requests still allowed right now.
    pub(crate) remaining: u32,
    /// Until the budget is full again (allowed) or the next request is
    /// accepted (rejected).
    pub(crate) reset: Duration,
}

/// Shared keyed limiter; clones share buckets.
#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr, StateInformationMiddleware>>,
    checks: Arc<AtomicU64>,
    max_requests: u32,
    period: Duration,
    limit: HeaderValue,
    policy: HeaderValue,
}

impl ClientRateLimiter {
    /// # Errors
    ///
    /// [`ServerError::InvalidRateLimit`] if the window divided by the budget
    /// rounds down to zero.
    pub fn new(limit: RateLimit) -> Result<Self, ServerError> {
        let invalid = || ServerError::InvalidRateLimit {
            max_requests: limit.max_requests,
            window: limit.window,
        };
        let period = limit.window / limit.max_requests.get();
        let quota = Quota::with_period(period)
            .ok_or_else(invalid)?
            .allow_burst(limit.max_requests);
        let policy = HeaderValue::from_str(&format!(
            "{};w={}",
            limit.max_requests,
            limit.window.as_secs()
        ))
        .map_err(|_| invalid())?;

        Ok(Self {
            limiter: Arc::new(
                RateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>(),
            ),
            checks: Arc::new(AtomicU64::new(0)),
            max_requests: limit.max_requests.get(),
            period,
            limit: HeaderValue::from(limit.max_requests.get()),
            policy,
        })
    }

    /// Consumes one request from `client`'s budget.
    ///
    /// `Err` carries the budget of a rejected client: nothing remaining and
    /// the wait until the next request is accepted.
    pub(crate) fn check(&self, client: IpAddr) -> Result<Budget, Budget> {
        let outcome = match self.limiter.check_key(&client) {
            Ok(state) => {
                let remaining = state.remaining_burst_capacity();
                let spent = self.max_requests.saturating_sub(remaining);
                Ok(Budget {
                    remaining,
                    reset: self.period * spent,
                })
            }
            Err(not_until) => Err(Budget {
                remaining: 0,
                reset: not_until.wait_time_from(self.limiter.clock().now()),
            }),
        };

        let checks = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if prune_due(checks, self.limiter.len()) {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            debug!(tracked_clients = self.limiter.len(), "pruned idle rate-limit buckets");
        }
        outcome
    }

    fn write_headers(&self, headers: &mut HeaderMap, budget: Budget) {
        headers.insert(RATELIMIT_POLICY, self.policy.clone());
        headers.insert(RATELIMIT_LIMIT, self.limit.clone());
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(budget.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(whole_secs(budget.reset)));
    }
}

/// Pruning scans every bucket, so it runs at most once per [`PRUNE_EVERY`]
/// checks and only when the map has grown past [`PRUNE_THRESHOLD`].
fn prune_due(checks: u64, tracked: usize) -> bool {
    checks % PRUNE_EVERY == 0 && tracked > PRUNE_THRESHOLD
}

/// Requests without a known peer address share this bucket.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub(crate) async fn rate_limit(
    State(limiter): State<ClientRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(UNKNOWN_CLIENT, |ConnectInfo(addr)| addr.ip());

    match limiter.check(client) {
        Ok(budget) => {
            let mut response = next.run(request).await;
            limiter.write_headers(response.headers_mut(), budget);
            response
        }
        Err(budget) => {
            let retry_after = whole_secs(budget.reset);
            warn!(%client, retry_after_secs = retry_after, "rate limit exceeded");
            let mut response = error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later",
            );
            limiter.write_headers(response.headers_mut(), budget);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// Whole seconds, rounded up so clients never retry early.
fn whole_secs(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}
