//! Audit store clients.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use redis::aio::ConnectionManager;
use thiserror::Error;

/// Bucket holding records of admitted requests.
pub const ALLOWED_BUCKET: &str = "THROTTLE::IP::ALLOWED";
/// Bucket holding records of denied requests.
pub const DENIED_BUCKET: &str = "THROTTLE::IP::DENIED";

/// Error from an audit store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("audit store unreachable after {0} attempts")]
    Unreachable(u32),
    #[error("write rejected: {0}")]
    Rejected(&'static str),
}

/// A key-value sink for audit records.
///
/// `put` writes one field into a hash-like bucket. Fields carry no
/// per-field expiry; the store retains records until externally pruned.
pub trait AuditStore: Send + 'static {
    fn put(
        &mut self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Redis-backed audit store using pipelined `HSET` writes.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis, pinging until it responds.
    ///
    /// Retries up to `max_attempts` with `retry_delay` between attempts,
    /// then gives up with [`StoreError::Unreachable`]. Startup treats that
    /// as fatal: the service must not come up without a reachable sink.
    pub async fn connect(
        addr: &str,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, StoreError> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };
        let client = redis::Client::open(url)?;

        for attempt in 1..=max_attempts {
            match ConnectionManager::new(client.clone()).await {
                Ok(mut conn) => {
                    let pong: Result<String, redis::RedisError> =
                        redis::cmd("PING").query_async(&mut conn).await;
                    match pong {
                        Ok(_) => {
                            tracing::info!(addr = %addr, attempt, "Audit store connected");
                            return Ok(Self { conn });
                        }
                        Err(e) => {
                            tracing::warn!(addr = %addr, attempt, error = %e, "Audit store ping failed");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(addr = %addr, attempt, error = %e, "Audit store connection failed");
                }
            }
            tokio::time::sleep(retry_delay).await;
        }

        Err(StoreError::Unreachable(max_attempts))
    }
}

impl AuditStore for RedisStore {
    fn put(
        &mut self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let mut pipe = redis::pipe();
        pipe.hset(bucket, field, value).ignore();
        async move {
            let _: () = pipe.query_async(&mut self.conn).await?;
            Ok(())
        }
    }
}

/// In-process audit store for tests and local development.
///
/// Hash semantics match the Redis client: one map of fields per bucket, a
/// repeated field overwrites. Cloning shares the underlying buckets, so a
/// test can hand one clone to the drain loop and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    buckets: Arc<Mutex<HashMap<String, HashMap<String, String>>>>,
    inject_failures: Arc<AtomicU32>,
    write_delay_ms: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` writes fail.
    pub fn inject_failures(&self, n: u32) {
        self.inject_failures.store(n, Ordering::SeqCst);
    }

    /// Stall every subsequent write by `delay`. Used to simulate a slow
    /// sink so the queue fills up.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Snapshot of one bucket's fields and records.
    pub fn bucket(&self, bucket: &str) -> Vec<(String, String)> {
        let buckets = self.buckets.lock().expect("store mutex poisoned");
        buckets
            .get(bucket)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bucket_len(&self, bucket: &str) -> usize {
        let buckets = self.buckets.lock().expect("store mutex poisoned");
        buckets.get(bucket).map(|fields| fields.len()).unwrap_or(0)
    }
}

impl AuditStore for MemoryStore {
    fn put(
        &mut self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let buckets = Arc::clone(&self.buckets);
        let inject_failures = Arc::clone(&self.inject_failures);
        let delay = Duration::from_millis(self.write_delay_ms.load(Ordering::SeqCst));
        let bucket = bucket.to_string();
        let field = field.to_string();
        let value = value.to_string();

        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if inject_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Rejected("injected failure"));
            }
            let mut buckets = buckets.lock().expect("store mutex poisoned");
            buckets.entry(bucket).or_default().insert(field, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_partitions_by_bucket() {
        let mut store = MemoryStore::new();
        store.put(ALLOWED_BUCKET, "k1", "v1").await.unwrap();
        store.put(DENIED_BUCKET, "k2", "v2").await.unwrap();

        assert_eq!(store.bucket_len(ALLOWED_BUCKET), 1);
        assert_eq!(store.bucket_len(DENIED_BUCKET), 1);
        assert_eq!(store.bucket(ALLOWED_BUCKET)[0].1, "v1");
    }

    #[tokio::test]
    async fn test_memory_store_injected_failures_are_bounded() {
        let mut store = MemoryStore::new();
        store.inject_failures(1);

        assert!(store.put(ALLOWED_BUCKET, "k1", "v1").await.is_err());
        assert!(store.put(ALLOWED_BUCKET, "k2", "v2").await.is_ok());
        assert_eq!(store.bucket_len(ALLOWED_BUCKET), 1);
    }
}
