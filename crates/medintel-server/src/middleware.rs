use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Request ID stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Who is calling, as established by [`require_api_key`]. Run quotas are
/// counted per caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    /// Auth is disabled (development without `MEDINTEL_API_KEYS`).
    Local,
    /// Authenticated by this bearer token.
    Key(String),
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("Local"),
            Self::Key(_) => f.write_str("Key([redacted])"),
        }
    }
}

/// Accepted bearer tokens. Empty means auth is off.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    /// Reads `MEDINTEL_API_KEYS` (comma-separated bearer tokens).
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("MEDINTEL_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Parses a comma-separated key list. An empty list is only accepted in
    /// development, where it turns auth off.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if keys.is_empty() {
            anyhow::ensure!(
                is_development,
                "MEDINTEL_API_KEYS is required outside development"
            );
            tracing::warn!("MEDINTEL_API_KEYS not set; dashboard API is open (development)");
        }

        Ok(Self {
            keys: Arc::new(keys),
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Resolves the caller for an `Authorization` header, or `None` if the
    /// request must be rejected.
    fn caller(&self, header: Option<&HeaderValue>) -> Option<Caller> {
        if !self.enabled() {
            return Some(Caller::Local);
        }
        extract_bearer_token(header)
            .filter(|token| self.keys.contains(*token))
            .map(|token| Caller::Key(token.to_owned()))
    }
}

/// Per-caller limit on pipeline runs. Each run may fan out to five paid
/// model calls, so only the run routes are metered.
#[derive(Debug, Clone)]
pub struct RunQuota {
    max_runs: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<Caller, (Instant, usize)>>>,
}

impl RunQuota {
    #[must_use]
    pub fn new(max_runs: usize, window: Duration) -> Self {
        Self {
            max_runs,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one run for `caller`; `false` once the caller's window is full.
    async fn try_acquire(&self, caller: &Caller) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let (started_at, count) = windows.entry(caller.clone()).or_insert((now, 0));

        if now.duration_since(*started_at) >= self.window {
            *started_at = now;
            *count = 0;
        }
        if *count >= self.max_runs {
            return false;
        }
        *count += 1;
        true
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Uses the incoming `x-request-id` header or generates a `UUIDv4`, stores it
/// as a [`RequestId`] extension, and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Rejects requests without an accepted bearer token and records the
/// [`Caller`] for downstream layers.
pub async fn require_api_key(
    State(keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    match keys.caller(req.headers().get(AUTHORIZATION)) {
        Some(caller) => {
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        None => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Meters pipeline runs per [`Caller`]. Must sit inside [`require_api_key`].
pub async fn enforce_run_quota(
    State(quota): State<RunQuota>,
    req: Request,
    next: Next,
) -> Response {
    let caller = req
        .extensions()
        .get::<Caller>()
        .cloned()
        .unwrap_or(Caller::Local);

    if !quota.try_acquire(&caller).await {
        tracing::warn!(?caller, "run quota exhausted");
        return ApiError::new(
            request_id_of(&req),
            "rate_limited",
            "too many dashboard runs; try again later",
        )
        .into_response();
    }

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
