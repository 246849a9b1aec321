mod builtin;
mod country;
mod dataset;
mod loader;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info};

pub use builtin::builtin_world;
pub use country::{population_range, Centroid, Country, POPULATION_RANGES};
pub use dataset::{Dataset, MICROSTATE_ALLOW_LIST, MIN_POPULATION};
pub use loader::{features_from_geojson, load_dataset, merge, validate_ring, COUNTRIES_FILE, OUTLINES_FILE};

use crate::error::GeoDataError;

/// Source of country metadata and outlines.
///
/// `initialize` is idempotent: the first successful load is cached and
/// concurrent callers wait on the same load instead of starting their own.
pub trait GeoDataProvider: Send + Sync {
    fn initialize(&self) -> Result<Arc<Dataset>, GeoDataError>;
}

/// Provider over an already-built dataset
pub struct StaticProvider {
    dataset: Arc<Dataset>,
}

impl StaticProvider {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    /// The coarse built-in world
    pub fn builtin() -> Self {
        Self::new(builtin_world())
    }
}

impl GeoDataProvider for StaticProvider {
    fn initialize(&self) -> Result<Arc<Dataset>, GeoDataError> {
        Ok(Arc::clone(&self.dataset))
    }
}

/// Provider reading `countries.json` + `countries.geojson` from a directory.
/// A failed load is not cached, so the next `initialize` retries.
pub struct FileProvider {
    data_dir: PathBuf,
    loaded: Mutex<Option<Arc<Dataset>>>,
}

impl FileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            loaded: Mutex::new(None),
        }
    }

    /// True when both data files are present
    pub fn has_data(&self) -> bool {
        self.data_dir.join(COUNTRIES_FILE).exists() && self.data_dir.join(OUTLINES_FILE).exists()
    }
}

impl GeoDataProvider for FileProvider {
    fn initialize(&self) -> Result<Arc<Dataset>, GeoDataError> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = loaded.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        info!(dir = %self.data_dir.display(), "loading geographic data");
        match load_dataset(&self.data_dir) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                *loaded = Some(Arc::clone(&dataset));
                Ok(dataset)
            }
            Err(e) => {
                error!(error = %e, "geographic data unavailable");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_shares_dataset() {
        let provider = StaticProvider::builtin();
        let a = provider.initialize().unwrap();
        let b = provider.initialize().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let provider = FileProvider::new("/definitely/not/here");
        assert!(!provider.has_data());
        assert!(matches!(provider.initialize(), Err(GeoDataError::Io { .. })));
    }
}
