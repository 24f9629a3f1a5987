use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::AppError;
use crate::infrastructure::config::RateLimitSettings;

/// Fixed-window per-IP rate limiter backing the `/api` routes
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_forwarded_headers: bool,
    state: Arc<RwLock<HashMap<IpAddr, RequestHistory>>>,
}

#[derive(Debug, Clone)]
struct RequestHistory {
    requests: Vec<Instant>,
    last_cleanup: Instant,
}

/// Rate limit headers attached to successful responses
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
}

impl RateLimitInfo {
    fn add_headers(&self, headers: &mut HeaderMap) {
        if let Ok(limit) = HeaderValue::from_str(&self.limit.to_string()) {
            headers.insert("x-ratelimit-limit", limit);
        }
        if let Ok(remaining) = HeaderValue::from_str(&self.remaining.to_string()) {
            headers.insert("x-ratelimit-remaining", remaining);
        }
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window: Duration::from_secs(settings.window_seconds),
            trust_forwarded_headers: settings.trust_forwarded_headers,
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a request for the IP, failing once the window is exhausted
    pub async fn check_rate_limit(&self, ip: IpAddr) -> Result<RateLimitInfo, AppError> {
        let now = Instant::now();
        let mut state = self.state.write().await;

        let history = state
            .entry(ip)
            .or_insert_with(|| RequestHistory { requests: Vec::new(), last_cleanup: now });

        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        history.requests.retain(|&req_time| req_time > cutoff);

        let current_count = history.requests.len() as u32;
        if current_count >= self.max_requests {
            let oldest_request = history.requests.first().copied().unwrap_or(now);
            let reset_time = oldest_request + self.window;
            let retry_after = reset_time.saturating_duration_since(now);

            return Err(AppError::RateLimit {
                message: format!(
                    "Too many requests from this IP, please try again in {} seconds.",
                    retry_after.as_secs()
                ),
            });
        }

        history.requests.push(now);

        // Periodic sweep so idle IPs do not accumulate forever
        if now.duration_since(history.last_cleanup) > Duration::from_secs(300) {
            history.last_cleanup = now;
            state.retain(|_, hist| {
                hist.requests.retain(|&req_time| req_time > cutoff);
                !hist.requests.is_empty()
            });
        }

        Ok(RateLimitInfo {
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(current_count + 1),
        })
    }
}

/// Extract client IP address from request
fn extract_client_ip(request: &Request, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        if let Some(forwarded) = request.headers().get("x-forwarded-for") {
            if let Ok(forwarded_str) = forwarded.to_str() {
                // The first entry is the client
                if let Some(first_ip) = forwarded_str.split(',').next() {
                    if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                        return ip;
                    }
                }
            }
        }
        if let Some(real_ip) = request.headers().get("x-real-ip") {
            if let Ok(ip) = real_ip.to_str().unwrap_or_default().parse::<IpAddr>() {
                return ip;
            }
        }
    }

    if let Some(ConnectInfo(socket_addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return socket_addr.ip();
    }

    IpAddr::from([127, 0, 0, 1])
}

/// Rate limiting middleware
pub fn rate_limit_middleware(
    limiter: RateLimiter,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let limiter = limiter.clone();
        Box::pin(async move {
            let client_ip = extract_client_ip(&request, limiter.trust_forwarded_headers);
            debug!(%client_ip, "rate limit check");

            match limiter.check_rate_limit(client_ip).await {
                Ok(info) => {
                    let mut response = next.run(request).await;
                    info.add_headers(response.headers_mut());
                    Ok(response)
                }
                Err(rate_limit_error) => {
                    warn!(%client_ip, "rate limit exceeded");
                    Err(rate_limit_error)
                }
            }
        })
    }
}
