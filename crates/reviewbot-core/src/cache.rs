//! Memoized classification results.
//!
//! Results are keyed by the exact review text plus a BLAKE3 fingerprint of
//! the API key, so rotating the key busts every entry while re-loading the
//! same dataset does not. Entries live for the lifetime of the cache.
//!
//! Each key owns a `OnceCell`: concurrent callers with the same key wait on
//! the first caller's computation instead of issuing a second paid call.

use crate::types::ClassificationResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Identity of a memoized result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text: String,
    credential_fingerprint: String,
}

impl CacheKey {
    pub fn new(text: &str, credential: &str) -> Self {
        Self {
            text: text.to_string(),
            credential_fingerprint: credential_fingerprint(credential),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Hex BLAKE3 digest of an API key. The key itself is never stored.
pub fn credential_fingerprint(credential: &str) -> String {
    blake3::hash(credential.as_bytes()).to_hex().to_string()
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Process-lifetime memo of `(text, credential) -> ClassificationResult`.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<ClassificationResult>>>>,
    lookups: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `(text, credential)`, running `compute`
    /// only if no result exists yet.
    pub async fn get_or_compute<F, Fut>(
        &self,
        text: &str,
        credential: &str,
        compute: F,
    ) -> ClassificationResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClassificationResult>,
    {
        let key = CacheKey::new(text, credential);
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };
        self.lookups.fetch_add(1, Ordering::Relaxed);

        *cell
            .get_or_init(|| async move {
                self.misses.fetch_add(1, Ordering::Relaxed);
                compute().await
            })
            .await
    }

    /// Look up a result without computing it.
    pub async fn get(&self, text: &str, credential: &str) -> Option<ClassificationResult> {
        let entries = self.entries.lock().await;
        entries
            .get(&CacheKey::new(text, credential))
            .and_then(|cell| cell.get().copied())
    }

    /// Number of keys seen so far.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry. Counters are kept.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        tracing::info!("Cleared {dropped} cached classification(s)");
    }

    pub async fn stats(&self) -> CacheStats {
        let lookups = self.lookups.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        CacheStats {
            entries: self.len().await,
            hits: lookups.saturating_sub(misses),
            misses,
        }
    }
}
