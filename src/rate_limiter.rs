//! Fixed-window rate limiting.
//!
//! One policy, two interchangeable backends behind [`CounterStore`]: a
//! process-local map for development and single-instance deployments, and a
//! Redis-backed store (see [`crate::redis`]) shared across instances. Callers
//! only see [`RateLimiter::check`]; backend failures are logged and the
//! request is allowed rather than blocked.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::AppError;

/// How often the in-process store evicts expired records.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of recording one request against a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    Limited {
        /// When the current window ends and the counter resets.
        resets_at: DateTime<Utc>,
    },
}

/// Per-key counter storage. Implementations must make the
/// read-compare-increment of a single key atomic so two concurrent requests
/// cannot both observe `count = max - 1` and both be admitted.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn hit(&self, key: &str, window: Duration, max: u32) -> Result<Decision, StoreError>;
}

/// Fixed-window admission control for one route class.
#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    max: u32,
    store: Arc<dyn CounterStore>,
    bypass: bool,
}

impl RateLimiter {
    pub fn new(window: Duration, max: u32, store: Arc<dyn CounterStore>) -> Self {
        Self {
            window,
            max,
            store,
            bypass: false,
        }
    }

    /// Disables every check. Wired to the dev-only environment flag.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// Records a request for `fingerprint` and decides admission.
    ///
    /// Store failures fail open: the error is logged and the request is
    /// allowed, so an unavailable counter backend degrades limiting instead of
    /// blocking legitimate traffic.
    pub async fn check(&self, fingerprint: &str) -> Result<(), AppError> {
        if self.bypass {
            return Ok(());
        }

        match self.store.hit(fingerprint, self.window, self.max).await {
            Ok(Decision::Allowed { .. }) => Ok(()),
            Ok(Decision::Limited { resets_at }) => {
                tracing::warn!(key = fingerprint, resets_at = %resets_at, "rate limit exceeded");
                Err(AppError::RateLimited(format!(
                    "Demasiadas solicitudes. Intente nuevamente después de {}",
                    resets_at.to_rfc3339()
                )))
            }
            Err(err) => {
                tracing::error!(key = fingerprint, error = %err, "rate limit store unavailable, allowing request");
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
struct WindowRecord {
    count: u32,
    expires_at: DateTime<Utc>,
}

/// Process-local counter store. Counters are not shared across instances, so
/// this is only a best-effort limiter for development and single-process
/// deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterStore {
    records: Arc<RwLock<HashMap<String, WindowRecord>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts expired records, returning how many were removed. Candidates are
    /// collected under a read lock and removed one key at a time, so request
    /// counters are never blocked for the length of a full scan.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();

        let expired: Vec<String> = {
            let records = self.records.read().await;
            records
                .iter()
                .filter(|(_, record)| record.expires_at < now)
                .map(|(key, _)| key.clone())
                .collect()
        };

        let mut removed = 0;
        for key in expired {
            let mut records = self.records.write().await;
            // re-check under the write lock; the key may have started a new
            // window since the scan
            if records
                .get(&key)
                .is_some_and(|record| record.expires_at < now)
            {
                records.remove(&key);
                removed += 1;
            }
        }

        removed
    }

    /// Spawns the periodic eviction task.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let removed = store.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "evicted expired rate limit records");
                }
            }
        })
    }

    #[cfg(test)]
    async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn hit(&self, key: &str, window: Duration, max: u32) -> Result<Decision, StoreError> {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(window).map_err(|err| Box::new(err) as StoreError)?;

        let mut records = self.records.write().await;

        if let Some(record) = records.get_mut(key) {
            if record.expires_at > now {
                if record.count >= max {
                    return Ok(Decision::Limited {
                        resets_at: record.expires_at,
                    });
                }
                record.count += 1;
                return Ok(Decision::Allowed {
                    remaining: max - record.count,
                });
            }

            // window elapsed: start over as if this were the first request
            record.count = 1;
            record.expires_at = expires_at;
            return Ok(Decision::Allowed {
                remaining: max.saturating_sub(1),
            });
        }

        records.insert(
            key.to_string(),
            WindowRecord {
                count: 1,
                expires_at,
            },
        );
        Ok(Decision::Allowed {
            remaining: max.saturating_sub(1),
        })
    }
}
