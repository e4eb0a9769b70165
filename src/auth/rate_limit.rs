use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, FunctionError};
use crate::AppState;

/// Manual snapshot triggers allowed per caller per window
const SNAPSHOT_MAX_REQUESTS: u32 = 3;
const SNAPSHOT_WINDOW_SECS: u64 = 3600;

/// In-memory fixed-window limiter (single-instance deployments)
#[derive(Clone, Default)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns Ok(remaining) or Err(retry_after) when the key is limited.
    pub async fn check_with_limits(
        &self,
        key: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_secs);

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) > window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= max_requests {
            let retry_after = window.saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(max_requests - entry.count)
    }

    /// Drop entries whose window ended long ago
    pub async fn cleanup(&self, window_secs: u64) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_secs * 2);

        entries.retain(|_, entry| now.duration_since(entry.window_start) < window);
    }
}

/// Limits on-demand snapshot runs per authenticated caller.
pub async fn rate_limit_snapshot(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, FunctionError> {
    let Some(user_id) = req.extensions().get::<AuthUser>().map(|u| u.id) else {
        // preflight, not authenticated
        return Ok(next.run(req).await);
    };
    let key = format!("snapshot:{}", user_id);

    match state
        .rate_limiter
        .check_with_limits(&key, SNAPSHOT_MAX_REQUESTS, SNAPSHOT_WINDOW_SECS)
        .await
    {
        Ok(remaining) => {
            tracing::debug!(user_id = %user_id, remaining = remaining, "Snapshot rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            let secs: u64 = retry_after.as_secs();
            tracing::warn!(
                user_id = %user_id,
                retry_after_secs = secs,
                "Snapshot rate limit exceeded"
            );
            Err(AppError::RateLimited.into())
        }
    }
}

/// Periodically prune the limiter so idle keys do not accumulate.
pub fn spawn_rate_limit_cleanup(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SNAPSHOT_WINDOW_SECS));
        loop {
            interval.tick().await;
            limiter.cleanup(SNAPSHOT_WINDOW_SECS).await;
        }
    });
}
