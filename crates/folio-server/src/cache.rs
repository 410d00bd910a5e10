//! Incremental regeneration page cache.
//!
//! A cached page is fresh for the revalidate interval. After that it is
//! stale: the next request still gets the stale page while a single
//! background rebuild replaces it. Entries are swapped whole, so readers
//! see either the old page or the new one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use folio_render::{PageStatus, RenderedPage};

/// Default time a rendered page stays fresh.
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(600);

/// A rendered page held by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub status: PageStatus,
    pub html: String,
    pub generated_at: Instant,
}

impl CachedPage {
    pub fn new(page: RenderedPage, generated_at: Instant) -> Self {
        Self {
            status: page.status,
            html: page.html,
            generated_at,
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Within the revalidate interval
    Fresh(Arc<CachedPage>),
    /// Past the interval; serve it and rebuild in the background
    Stale(Arc<CachedPage>),
    /// Never rendered, invalidated, or caching disabled
    Miss,
}

/// Page cache keyed by route path.
#[derive(Debug)]
pub struct PageCache {
    revalidate: Duration,
    entries: RwLock<HashMap<String, Arc<CachedPage>>>,
    regenerating: Mutex<HashSet<String>>,
}

impl PageCache {
    /// Create a cache. A zero interval disables caching.
    pub fn new(revalidate: Duration) -> Self {
        Self {
            revalidate,
            entries: RwLock::new(HashMap::new()),
            regenerating: Mutex::new(HashSet::new()),
        }
    }

    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    pub fn is_enabled(&self) -> bool {
        !self.revalidate.is_zero()
    }

    pub async fn lookup(&self, key: &str) -> Lookup {
        self.lookup_at(key, Instant::now()).await
    }

    /// Classify the entry for `key` as of `now`.
    pub async fn lookup_at(&self, key: &str, now: Instant) -> Lookup {
        if !self.is_enabled() {
            return Lookup::Miss;
        }

        let entries = self.entries.read().await;
        match entries.get(key) {
            None => Lookup::Miss,
            Some(page) if now.saturating_duration_since(page.generated_at) < self.revalidate => {
                Lookup::Fresh(Arc::clone(page))
            }
            Some(page) => Lookup::Stale(Arc::clone(page)),
        }
    }

    /// Store a page, replacing any previous entry for `key`.
    pub async fn insert(&self, key: &str, page: CachedPage) -> Arc<CachedPage> {
        let page = Arc::new(page);

        if self.is_enabled() {
            self.entries
                .write()
                .await
                .insert(key.to_string(), Arc::clone(&page));
        }

        page
    }

    /// Claim the background rebuild of `key`.
    ///
    /// Returns `false` if another rebuild of the same key is in flight.
    pub async fn try_begin_regeneration(&self, key: &str) -> bool {
        self.regenerating.lock().await.insert(key.to_string())
    }

    /// Release a claim taken by [`Self::try_begin_regeneration`].
    pub async fn finish_regeneration(&self, key: &str) {
        self.regenerating.lock().await.remove(key);
    }

    /// Drop the entry for `key`, if any.
    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_REVALIDATE)
    }
}
