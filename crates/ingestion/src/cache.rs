//! Process-wide, load-once dataset handle.
//!
//! The first caller performs the load while concurrent callers wait on the
//! same lock and then share the resulting snapshot. A failed load is
//! remembered: later callers get [`Error::LoadHalted`] without the source
//! being read again. Only [`DatasetHandle::reload`] re-reads the source.

use std::sync::{Arc, Mutex, MutexGuard};

use tariff_core::{Config, Dataset, Error, Result};
use tracing::{error, info};

use crate::loader::DatasetLoader;
use crate::sheet::{open_source, WorkbookSource};

enum LoadStatus {
    Unloaded,
    Ready(Arc<Dataset>),
    Failed(String),
}

struct HandleState {
    source: Box<dyn WorkbookSource>,
    status: LoadStatus,
    loads: usize,
}

/// Shared handle to the immutable dataset.
pub struct DatasetHandle {
    loader: DatasetLoader,
    state: Mutex<HandleState>,
}

impl DatasetHandle {
    /// Create a handle over any workbook source. Nothing is read yet.
    pub fn new(loader: DatasetLoader, source: Box<dyn WorkbookSource>) -> Self {
        Self {
            loader,
            state: Mutex::new(HandleState {
                source,
                status: LoadStatus::Unloaded,
                loads: 0,
            }),
        }
    }

    /// Create a handle for the workbook path named in the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DatasetLoader::new(config),
            open_source(&config.dataset.path),
        )
    }

    /// The loaded dataset, loading it on first use.
    pub fn get(&self) -> Result<Arc<Dataset>> {
        let mut state = self.lock()?;
        if let LoadStatus::Ready(dataset) = &state.status {
            return Ok(Arc::clone(dataset));
        }
        if let LoadStatus::Failed(msg) = &state.status {
            return Err(Error::load_halted(msg.clone()));
        }
        self.load_into(&mut state)
    }

    /// Re-read the source and replace the snapshot.
    ///
    /// Snapshots handed out earlier stay valid and unchanged.
    pub fn reload(&self) -> Result<Arc<Dataset>> {
        let mut state = self.lock()?;
        info!("reloading tariff workbook");
        self.load_into(&mut state)
    }

    /// Whether a dataset is currently available.
    pub fn is_loaded(&self) -> bool {
        self.lock()
            .map(|state| matches!(state.status, LoadStatus::Ready(_)))
            .unwrap_or(false)
    }

    /// Number of times the source has been read.
    pub fn load_count(&self) -> usize {
        self.lock().map(|state| state.loads).unwrap_or(0)
    }

    fn load_into(&self, state: &mut HandleState) -> Result<Arc<Dataset>> {
        state.loads += 1;
        match self.loader.load(state.source.as_mut()) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                state.status = LoadStatus::Ready(Arc::clone(&dataset));
                Ok(dataset)
            }
            Err(err) => {
                error!(error = %err, "failed to load tariff workbook");
                state.status = LoadStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HandleState>> {
        self.state
            .lock()
            .map_err(|_| Error::Other("dataset handle lock poisoned".to_string()))
    }
}
