//! Redis-backed counter store for the rate limiter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;

use crate::rate_limiter::{CounterStore, Decision, StoreError};

const KEY_PREFIX: &str = "rate_limit";

/// Durable counter store shared across process instances.
///
/// Each hit is a single `INCR`, with the window established by an `EXPIRE`
/// on the first hit of the key. `INCR` is atomic server-side, so concurrent
/// requests cannot both be admitted at the boundary. Unlike the in-process
/// store, rejected requests keep incrementing the stored count; the admission
/// decisions are identical.
#[derive(Clone)]
pub struct RedisCounterStore {
    client: redis::Client,
}

impl RedisCounterStore {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn hit(&self, key: &str, window: Duration, max: u32) -> Result<Decision, StoreError> {
        let redis_key = format!("{}:{}", KEY_PREFIX, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: i64 = conn.incr(&redis_key, 1).await?;

        if count == 1 {
            let _: () = conn.expire(&redis_key, window.as_secs() as i64).await?;
        }

        if count > i64::from(max) {
            // remaining lifetime of the key is the remaining window
            let ttl_ms: i64 = redis::cmd("PTTL")
                .arg(&redis_key)
                .query_async(&mut conn)
                .await?;
            let resets_at = Utc::now() + chrono::Duration::milliseconds(ttl_ms.max(0));
            return Ok(Decision::Limited { resets_at });
        }

        Ok(Decision::Allowed {
            remaining: max.saturating_sub(count as u32),
        })
    }
}
