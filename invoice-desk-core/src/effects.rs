//! Post-mutation effects: view invalidation and the listing view cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Logical path of the invoice listing view.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Where a successful sign-in lands.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Marks a cached view stale so the next read reloads it.
pub trait ViewInvalidator: Send + Sync {
    fn invalidate(&self, path: &str);
}

/// In-process cache of rendered views, keyed by logical path.
///
/// Every invalidation bumps the path's generation. A load only populates
/// the cache if no invalidation happened while it was in flight.
#[derive(Clone)]
pub struct ViewCache<T> {
    inner: Arc<RwLock<Views<T>>>,
}

struct Views<T> {
    entries: HashMap<String, T>,
    generations: HashMap<String, u64>,
}

impl<T> Views<T> {
    fn generation(&self, path: &str) -> u64 {
        self.generations.get(path).copied().unwrap_or(0)
    }
}

impl<T: Clone> ViewCache<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Views {
                entries: HashMap::new(),
                generations: HashMap::new(),
            })),
        }
    }

    pub fn get(&self, path: &str) -> Option<T> {
        let views = self.inner.read().unwrap_or_else(|e| e.into_inner());
        views.entries.get(path).cloned()
    }

    pub fn put(&self, path: &str, view: T) {
        let mut views = self.inner.write().unwrap_or_else(|e| e.into_inner());
        views.entries.insert(path.to_string(), view);
    }

    /// Returns the cached view, loading and caching it on a miss.
    ///
    /// Load failures are not cached. Neither is a load that raced an
    /// invalidation of the same path; its result is returned but dropped.
    pub async fn get_or_load<F, Fut, E>(&self, path: &str, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = {
            let views = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if let Some(view) = views.entries.get(path) {
                debug!("View cache hit for {}", path);
                return Ok(view.clone());
            }
            views.generation(path)
        };

        debug!("View cache miss for {}", path);
        let view = load().await?;

        let mut views = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if views.generation(path) == generation {
            views.entries.insert(path.to_string(), view.clone());
        } else {
            debug!("Discarding view {} loaded before an invalidation", path);
        }
        Ok(view)
    }
}

impl<T: Clone> Default for ViewCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> ViewInvalidator for ViewCache<T> {
    fn invalidate(&self, path: &str) {
        let mut views = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *views.generations.entry(path.to_string()).or_insert(0) += 1;
        if views.entries.remove(path).is_some() {
            debug!("Invalidated cached view {}", path);
        }
    }
}
