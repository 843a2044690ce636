use std::ffi::CString;
use std::sync::Arc;

use tracing::{debug, info, warn};

use lgbm_core::{BridgeConfig, HandleRegistry};
use lgbm_engine::{Engine, NativeEngine, RawHandle};

use crate::error::{BridgeError, BridgeResult};
use crate::handles::{BoosterHandle, DatasetHandle};

pub(crate) struct DatasetEntry {
    pub(crate) raw: RawHandle,
    pub(crate) num_data: i64,
    /// Live boosters training on or validating against this dataset
    pub(crate) attached: u32,
}

pub(crate) struct BoosterEntry {
    pub(crate) raw: RawHandle,
    pub(crate) train: Option<(DatasetHandle, i64)>,
    /// Validation datasets with their row counts, in registration order
    pub(crate) valid: Vec<(DatasetHandle, i64)>,
}

impl BoosterEntry {
    pub(crate) fn attached_datasets(&self) -> impl Iterator<Item = DatasetHandle> + '_ {
        self.train.iter().chain(self.valid.iter()).map(|(d, _)| *d)
    }
}

/// Safe front door to the engine.
///
/// Every engine object created through a `Bridge` is tracked in a
/// generational registry and freed when the bridge is dropped.
pub struct Bridge {
    pub(crate) engine: Arc<dyn Engine>,
    pub(crate) config: BridgeConfig,
    pub(crate) datasets: HandleRegistry<DatasetEntry>,
    pub(crate) boosters: HandleRegistry<BoosterEntry>,
}

impl Bridge {
    pub fn new(engine: Arc<dyn Engine>, config: BridgeConfig) -> Self {
        debug!("bridge created over {}", engine.describe());
        Self {
            engine,
            config,
            datasets: HandleRegistry::new("dataset"),
            boosters: HandleRegistry::new("booster"),
        }
    }

    /// Load the native library named by the configuration (or `LGBM_BRIDGE_LIB`).
    pub fn from_config(config: BridgeConfig) -> BridgeResult<Self> {
        let path = config.library_path();
        let engine = NativeEngine::load(path.as_deref())?;
        info!("using engine library {}", engine.path());
        Ok(Self::new(engine, config))
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn live_datasets(&self) -> usize {
        self.datasets.len()
    }

    pub fn live_boosters(&self) -> usize {
        self.boosters.len()
    }

    pub(crate) fn dataset_raw(&self, handle: DatasetHandle) -> BridgeResult<RawHandle> {
        Ok(self.datasets.with(handle.0, |d| d.raw)?)
    }

    pub(crate) fn booster_raw(&self, handle: BoosterHandle) -> BridgeResult<RawHandle> {
        Ok(self.boosters.with(handle.0, |b| b.raw)?)
    }

    pub(crate) fn dataset_params(&self, params: &str) -> BridgeResult<CString> {
        c_string("parameters", &self.config.dataset_params(params)?)
    }

    pub(crate) fn booster_params(&self, params: &str) -> BridgeResult<CString> {
        c_string("parameters", &self.config.booster_params(params)?)
    }

    pub(crate) fn attach(&self, dataset: DatasetHandle) -> BridgeResult<()> {
        Ok(self.datasets.with_mut(dataset.0, |d| d.attached += 1)?)
    }

    pub(crate) fn detach(&self, dataset: DatasetHandle) {
        let _ = self
            .datasets
            .with_mut(dataset.0, |d| d.attached = d.attached.saturating_sub(1));
    }
}

pub(crate) fn c_string(what: &'static str, value: &str) -> BridgeResult<CString> {
    CString::new(value).map_err(|_| BridgeError::InvalidString { what })
}

impl Drop for Bridge {
    fn drop(&mut self) {
        // Boosters first: they hold pointers into their datasets.
        for handle in self.boosters.handles() {
            if let Ok(entry) = self.boosters.remove(handle) {
                if let Err(e) = self.engine.booster_free(entry.raw) {
                    warn!("failed to free booster {}: {}", handle, e);
                }
            }
        }
        for handle in self.datasets.handles() {
            if let Ok(entry) = self.datasets.remove(handle) {
                if let Err(e) = self.engine.dataset_free(entry.raw) {
                    warn!("failed to free dataset {}: {}", handle, e);
                }
            }
        }
    }
}
