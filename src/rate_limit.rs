//! Per-client sliding-window rate limiting
//!
//! Each route group gets its own limiter. A client is keyed by its peer
//! address. The first `X-Forwarded-For` hop is only used when the limiter
//! is told it sits behind a trusted proxy.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Drop idle clients after this many checks
const CLEANUP_EVERY: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub window: Duration,
    pub max_requests: usize,
}

pub mod policies {
    use super::RateLimitPolicy;
    use std::time::Duration;

    pub const ITEM_LIST: RateLimitPolicy = RateLimitPolicy {
        name: "itemList",
        window: Duration::from_secs(10),
        max_requests: 25,
    };

    pub const ITEM_DETAIL: RateLimitPolicy = RateLimitPolicy {
        name: "itemDetail",
        window: Duration::from_secs(10),
        max_requests: 100,
    };

    pub const SNAPSHOT: RateLimitPolicy = RateLimitPolicy {
        name: "snapshot",
        window: Duration::from_secs(10),
        max_requests: 50,
    };

    pub const MINIMAL: RateLimitPolicy = RateLimitPolicy {
        name: "minimal",
        window: Duration::from_secs(60),
        max_requests: 5,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: usize, reset_after: Duration },
    Limited { retry_after: Duration },
}

#[derive(Default)]
struct Clients {
    hits: HashMap<String, VecDeque<Instant>>,
    checks: u64,
}

pub struct RateLimiter {
    policy: RateLimitPolicy,
    trust_proxy: bool,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            trust_proxy: false,
            clients: Mutex::new(Clients::default()),
        }
    }

    /// Key clients by `X-Forwarded-For` instead of the peer address
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Record a request from `key` if it fits in the window
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.policy.window;
        let mut clients = self.clients.lock();

        clients.checks += 1;
        if clients.checks % CLEANUP_EVERY == 0 {
            clients.hits.retain(|_, hits| {
                hits.back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < window)
            });
        }

        let hits = clients.hits.entry(key.to_string()).or_default();
        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= window)
        {
            hits.pop_front();
        }

        let reset_after = hits
            .front()
            .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
            .unwrap_or(window);

        if hits.len() >= self.policy.max_requests {
            return RateDecision::Limited {
                retry_after: reset_after,
            };
        }

        hits.push_back(now);
        RateDecision::Allowed {
            remaining: self.policy.max_requests - hits.len(),
            reset_after,
        }
    }
}

/// Body of a 429 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitedResponse {
    pub message: String,
    pub limiter: String,
    pub status: u16,
}

fn client_key(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn set_headers(headers: &mut HeaderMap, policy: RateLimitPolicy, remaining: usize, reset: Duration) {
    let reset_secs = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
    headers.insert("ratelimit-limit", HeaderValue::from(policy.max_requests));
    headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));

    // Legacy headers; the reset is a unix timestamp here, not a delta
    let reset_at = Utc::now().timestamp().saturating_add_unsigned(reset_secs);
    headers.insert("x-ratelimit-limit", HeaderValue::from(policy.max_requests));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(reset_at));
}

/// Middleware for `axum::middleware::from_fn_with_state`
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request, limiter.trust_proxy);
    let policy = limiter.policy();

    match limiter.check(&key) {
        RateDecision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            set_headers(response.headers_mut(), policy, remaining, reset_after);
            response
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %key, limiter = policy.name, "Rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RateLimitedResponse {
                    message: "Too many requests, please try again later.".to_string(),
                    limiter: policy.name.to_string(),
                    status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                }),
            )
                .into_response();

            let headers = response.headers_mut();
            set_headers(headers, policy, 0, retry_after);
            headers.insert(
                "retry-after",
                HeaderValue::from(retry_after.as_secs().max(1)),
            );
            response
        }
    }
}

/// One limiter per route group
#[derive(Clone)]
pub struct RateLimits {
    pub item_list: Arc<RateLimiter>,
    pub item_detail: Arc<RateLimiter>,
    pub snapshot: Arc<RateLimiter>,
    pub minimal: Arc<RateLimiter>,
}

impl RateLimits {
    pub fn new(trust_proxy: bool) -> Self {
        let limiter =
            |policy| Arc::new(RateLimiter::new(policy).trusting_proxy(trust_proxy));
        Self {
            item_list: limiter(policies::ITEM_LIST),
            item_detail: limiter(policies::ITEM_DETAIL),
            snapshot: limiter(policies::SNAPSHOT),
            minimal: limiter(policies::MINIMAL),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new(false)
    }
}
