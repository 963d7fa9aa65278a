//! API key authentication and per-IP rate limiting, configured from the environment.
//!
//! Both are off unless `TEND_API_KEY` is set, which is how a shared
//! deployment differs from a single household running the server locally.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Requests per minute per IP when `TEND_RATE_LIMIT` is unset.
const DEFAULT_RATE_LIMIT: u32 = 100;

const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Access settings for the HTTP API.
#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    /// Bearer token required on every request (`TEND_API_KEY`).
    pub api_key: Option<String>,
    /// Allowed CORS origins (`TEND_CORS_ORIGINS`, comma-separated). Permissive when unset.
    pub cors_origins: Option<Vec<String>>,
    pub rate_limiter: Option<RateLimiter>,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("TEND_API_KEY").filter(|key| !key.is_empty());

        let cors_origins = lookup("TEND_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect()
        });

        let rate_limiter = api_key.as_ref().map(|_| {
            let limit = lookup("TEND_RATE_LIMIT")
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT);
            RateLimiter::new(limit, RATE_WINDOW)
        });

        Self {
            api_key,
            cors_origins,
            rate_limiter,
        }
    }

    /// No authentication, permissive CORS, no rate limit.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_rate_limit(max_requests: u32) -> Self {
        Self {
            rate_limiter: Some(RateLimiter::new(max_requests, RATE_WINDOW)),
            ..Self::default()
        }
    }
}

/// Sliding-window request counter keyed by client IP.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    seen: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests as usize,
            window,
            seen: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `ip`. Returns false once the IP is over its limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut seen = self.seen.lock().expect("rate limiter lock poisoned");
        let hits = seen.entry(ip).or_default();
        hits.retain(|&t| now.duration_since(t) < self.window);

        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push(now);
        true
    }

    /// Forget IPs with no requests inside the window.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut seen = self.seen.lock().expect("rate limiter lock poisoned");
        seen.retain(|_, hits| {
            hits.retain(|&t| now.duration_since(t) < self.window);
            !hits.is_empty()
        });
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.seen.lock().expect("rate limiter lock poisoned").len()
    }
}

pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Rejected request with invalid API key");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Rejected request without bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = client_ip(&request);

    if limiter.check(ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rate limit exceeded for {}", ip);
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Client IP from `X-Forwarded-For` or `X-Real-IP`, else localhost.
fn client_ip(request: &Request<Body>) -> IpAddr {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    header("X-Forwarded-For")
        .and_then(|value| value.split(',').next()?.trim().parse().ok())
        .or_else(|| header("X-Real-IP").and_then(|value| value.trim().parse().ok()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
