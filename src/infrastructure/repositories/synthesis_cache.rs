use crate::domain::speech::SynthesisFingerprint;
use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Per-chunk provider payloads of one completed synthesis, in chunk order
pub type CachedPayloads = Arc<Vec<Bytes>>;

/// Process-wide store of completed synthesis results.
///
/// Entries are immutable once written; concurrent writers for the same key
/// keep whichever value landed first.
#[async_trait]
pub trait SynthesisCache: Send + Sync {
    async fn get(&self, key: &SynthesisFingerprint) -> Option<CachedPayloads>;

    /// Store `payloads` unless the key is present; returns the stored value
    async fn insert_if_absent(
        &self,
        key: SynthesisFingerprint,
        payloads: CachedPayloads,
    ) -> CachedPayloads;
}

/// Bounded, idle-evicting cache backed by moka
pub struct MokaSynthesisCache {
    cache: Cache<SynthesisFingerprint, CachedPayloads>,
}

impl MokaSynthesisCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                .build(),
        }
    }
}

#[async_trait]
impl SynthesisCache for MokaSynthesisCache {
    async fn get(&self, key: &SynthesisFingerprint) -> Option<CachedPayloads> {
        self.cache.get(key).await
    }

    async fn insert_if_absent(
        &self,
        key: SynthesisFingerprint,
        payloads: CachedPayloads,
    ) -> CachedPayloads {
        self.cache.entry(key).or_insert(payloads).await.into_value()
    }
}
