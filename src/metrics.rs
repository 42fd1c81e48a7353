//! File-server hit counter.
//!
//! Explicitly constructed and injected into the router state; there is no
//! process-wide global.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{extract::State, middleware::Next, response::Response};

#[derive(Clone, Default)]
pub struct Metrics {
    hits: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware that counts hits on the static file server.
pub async fn track_hits(
    State(metrics): State<Metrics>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    metrics.increment();
    next.run(request).await
}
