mod error;
mod mutations;
mod queries;
mod store;

pub use error::EngineError;
pub use queries::{compute_stats, filter, filter_choices, matches, paginate};
pub use store::BookingCache;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::auth::SessionSource;
use crate::backend::BookingBackend;
use crate::model::*;
use crate::notify::{Notice, NoticeHub};

/// Client-side booking engine: caches the backend's collection, answers
/// filtered/paginated queries from the cache, and pushes mutations through
/// the backend before patching the cache with the canonical result.
pub struct Engine {
    backend: Arc<dyn BookingBackend>,
    session: Arc<dyn SessionSource>,
    pub notify: Arc<NoticeHub>,
    cache: RwLock<BookingCache>,
    /// In-flight mutations keyed by booking id.
    pub(super) busy: DashMap<String, Busy>,
    /// Loads in flight; overlapping loads each hold one count.
    loading: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

/// Clears a flag when dropped, so early returns and cancelled futures
/// cannot leave it set.
pub(super) struct BusyGuard<'a> {
    busy: &'a DashMap<String, Busy>,
    id: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.remove(&self.id);
        metrics::gauge!(crate::observability::MUTATIONS_IN_FLIGHT).decrement(1.0);
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Engine {
    pub fn new(
        backend: Arc<dyn BookingBackend>,
        session: Arc<dyn SessionSource>,
        notify: Arc<NoticeHub>,
    ) -> Self {
        Self {
            backend,
            session,
            notify,
            cache: RwLock::new(BookingCache::new()),
            busy: DashMap::new(),
            loading: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    // A poisoned lock only means a panic elsewhere mid-section; every write
    // section leaves the cache whole, so the data is still usable.
    pub(super) fn read_cache(&self) -> RwLockReadGuard<'_, BookingCache> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn write_cache(&self) -> RwLockWriteGuard<'_, BookingCache> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }

    fn set_error(&self, msg: Option<String>) {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = msg;
    }

    pub(super) async fn token(&self) -> Result<String, EngineError> {
        self.session.access_token().await
    }

    /// Mark `id` busy until the returned guard drops.
    pub(super) fn mark_busy(&self, id: &str, kind: Busy) -> BusyGuard<'_> {
        self.busy.insert(id.to_string(), kind);
        metrics::gauge!(crate::observability::MUTATIONS_IN_FLIGHT).increment(1.0);
        BusyGuard {
            busy: &self.busy,
            id: id.to_string(),
        }
    }

    /// Fetch the whole collection and swap it into the cache.
    ///
    /// On failure the previous cache is kept and the message is stored in
    /// [`Engine::last_error`]. Overlapping loads are not ordered: whichever
    /// resolves last wins.
    pub async fn load(&self) -> Result<usize, EngineError> {
        self.loading.fetch_add(1, Ordering::SeqCst);
        let _loading = LoadingGuard(&self.loading);
        self.set_error(None);

        let fetched = match self.token().await {
            Ok(token) => self.backend.list(&token).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(bookings) => {
                let (count, generation) = {
                    let mut cache = self.write_cache();
                    let generation = cache.replace(bookings);
                    (cache.len(), generation)
                };
                metrics::gauge!(crate::observability::CACHE_BOOKINGS).set(count as f64);
                info!("loaded {count} bookings (generation {generation})");
                Ok(count)
            }
            Err(e) => {
                warn!("booking load failed: {e}");
                self.set_error(Some(e.to_string()));
                self.notify.send(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Fetch a single booking straight from the backend. The cache is not touched.
    pub async fn fetch_one(&self, id: &str) -> Result<Option<Booking>, EngineError> {
        let result = match self.token().await {
            Ok(token) => self.backend.get(&token, id).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.notify.send(Notice::error(e.to_string()));
        }
        result
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Message from the most recent failed load, cleared when a load starts.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn busy(&self, id: &str) -> Option<Busy> {
        self.busy.get(id).map(|e| *e.value())
    }

    pub fn is_updating(&self, id: &str) -> bool {
        self.busy(id) == Some(Busy::Updating)
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.busy(id) == Some(Busy::Deleting)
    }

    pub fn len(&self) -> usize {
        self.read_cache().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_cache().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.read_cache().generation()
    }

    pub fn get(&self, id: &str) -> Option<Booking> {
        self.read_cache().get(id).cloned()
    }

    /// Copy of the full, unfiltered cache in backend order.
    pub fn snapshot(&self) -> Vec<Booking> {
        self.read_cache().bookings().to_vec()
    }
}
