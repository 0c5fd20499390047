use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::loader;
use super::model::{DataError, EmissionTables};
use crate::config::DataSources;

type LoadFn = Arc<dyn Fn(&DataSources) -> Result<EmissionTables, DataError> + Send + Sync>;

// ---------------------------------------------------------------------------
// DatasetCache – load once, share for the life of the cache
// ---------------------------------------------------------------------------

/// Memoized emission tables for one set of sources.
///
/// The first successful [`DatasetCache::get_or_load`] reads the files; every
/// later call returns the same `Arc`. Concurrent first callers block on a
/// single load. A failed load is not remembered, so the next call retries.
pub struct DatasetCache {
    sources: DataSources,
    loader: LoadFn,
    tables: OnceCell<Arc<EmissionTables>>,
}

impl DatasetCache {
    pub fn new(sources: DataSources) -> Self {
        Self::with_loader(sources, loader::load_all)
    }

    pub fn with_loader<F>(sources: DataSources, load: F) -> Self
    where
        F: Fn(&DataSources) -> Result<EmissionTables, DataError> + Send + Sync + 'static,
    {
        DatasetCache {
            sources,
            loader: Arc::new(load),
            tables: OnceCell::new(),
        }
    }

    pub fn get_or_load(&self) -> Result<Arc<EmissionTables>, DataError> {
        self.tables
            .get_or_try_init(|| {
                log::info!("Loading emission tables");
                (self.loader)(&self.sources).map(Arc::new)
            })
            .cloned()
    }

    /// An empty cache over the same sources and loader; the next
    /// `get_or_load` reads the files again.
    pub fn reloaded(&self) -> Self {
        DatasetCache {
            sources: self.sources.clone(),
            loader: Arc::clone(&self.loader),
            tables: OnceCell::new(),
        }
    }

    pub fn sources(&self) -> &DataSources {
        &self.sources
    }
}
