//! Read-only menu fetch from the catalog collaborator.
//!
//! The menu is opaque input: fetched, cached for five minutes, and handed to
//! the UI untouched. Per-item display stats (rating, cook time, servings)
//! are presentational flavor derived from a deterministic hash of the item
//! id, so they are stable across renders and sessions.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use tableside_core::{ItemId, MenuItem};

use crate::backend::{BackendError, OrderBackend};
use crate::http::{RequestSlot, RequestState};

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Menu,
}

/// Client for the read-only catalog.
///
/// Menu responses are cached for 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    backend: Arc<dyn OrderBackend>,
    cache: Cache<CacheKey, Arc<Vec<MenuItem>>>,
    request: RequestSlot<Arc<Vec<MenuItem>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(backend: Arc<dyn OrderBackend>) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                backend,
                cache,
                request: RequestSlot::new(),
            }),
        }
    }

    /// The orderable items, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the fetch fails and nothing is cached.
    pub async fn menu(&self) -> Result<Arc<Vec<MenuItem>>, BackendError> {
        if let Some(items) = self.inner.cache.get(&CacheKey::Menu).await {
            return Ok(items);
        }

        let token = self.inner.request.begin();
        match self.inner.backend.fetch_menu().await {
            Ok(items) => {
                let items = Arc::new(items);
                self.inner
                    .cache
                    .insert(CacheKey::Menu, Arc::clone(&items))
                    .await;
                self.inner.request.succeed(token, Arc::clone(&items));
                Ok(items)
            }
            Err(error) => {
                self.inner.request.fail(token, error.to_string());
                Err(error)
            }
        }
    }

    /// Observable lifecycle of the menu fetch, for loading spinners.
    #[must_use]
    pub fn request_state(&self) -> RequestState<Arc<Vec<MenuItem>>> {
        self.inner.request.state()
    }
}

// =============================================================================
// Display stats
// =============================================================================

/// Presentational per-item stats. Derived, never fetched; excluded from any
/// correctness guarantee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayStats {
    /// 4.0 to 4.9 in tenths.
    pub rating: f32,
    /// 15 to 44 minutes.
    pub cook_time_minutes: u32,
    /// 1 to 4 servings.
    pub servings: u32,
}

/// Stable pseudo-random stats for an item, from an FNV-1a hash of its id.
#[must_use]
pub fn display_stats(id: &ItemId) -> DisplayStats {
    let hash = fnv1a(id.as_str().as_bytes());

    #[allow(clippy::cast_precision_loss)]
    let rating = 4.0 + (hash % 10) as f32 / 10.0;

    DisplayStats {
        rating,
        cook_time_minutes: 15 + u32::try_from((hash >> 8) % 30).unwrap_or(0),
        servings: 1 + u32::try_from((hash >> 16) % 4).unwrap_or(0),
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
