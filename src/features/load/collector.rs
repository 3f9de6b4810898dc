use crate::features::cpu::CpuCollector;
use crate::features::disk::DiskCollector;
use crate::features::gpu::GpuCollector;
use crate::features::load::models::{
    LoadCollectorSpec, LoadItemConfig, UnsupportedItem, DEFAULT_PERIOD_MS,
};
use crate::features::network::NetworkCollector;
use crate::shared::collector::{LoadCallback, ProcessLauncher, SourceLauncher};
use crate::shared::error::CollectionError;
use crate::shared::traits::{LoadSource, Validatable};
use log::{debug, error, info};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle to a running load collector of any kind.
///
/// Collectors start sampling as soon as they are built and keep calling the
/// callback until [`LoadCollector::stop`] is called or the handle is dropped.
/// Construction must happen inside a tokio runtime.
pub struct LoadCollector {
    item: String,
    inner: Mutex<Option<Box<dyn LoadSource>>>,
}

impl LoadCollector {
    /// Starts a collector for `spec.item`, or logs why it cannot and returns
    /// `None`.
    pub fn new(spec: LoadCollectorSpec) -> Option<Self> {
        Self::with_launcher(spec, Arc::new(ProcessLauncher))
    }

    pub fn with_launcher(spec: LoadCollectorSpec, launcher: Arc<dyn SourceLauncher>) -> Option<Self> {
        let item = spec.item.name().to_string();
        match Self::try_with_launcher(spec, launcher) {
            Ok(collector) => Some(collector),
            Err(e) => {
                error!("Failed to start {} load collector: {}", item, e);
                None
            }
        }
    }

    pub fn try_new(spec: LoadCollectorSpec) -> Result<Self, CollectionError> {
        Self::try_with_launcher(spec, Arc::new(ProcessLauncher))
    }

    pub fn try_with_launcher(
        spec: LoadCollectorSpec,
        launcher: Arc<dyn SourceLauncher>,
    ) -> Result<Self, CollectionError> {
        let LoadCollectorSpec { period, item, on_load } = spec;
        let period = period.unwrap_or(DEFAULT_PERIOD_MS);
        let name = item.name().to_string();
        item.validate().map_err(CollectionError::Config)?;
        let on_load = on_load.unwrap_or_else(|| log_load(name.clone()));

        let inner: Box<dyn LoadSource> = match item {
            LoadItemConfig::Cpu => Box::new(CpuCollector::new(launcher, period, on_load)?),
            LoadItemConfig::Disk { drive } => {
                Box::new(DiskCollector::new(launcher, period, &drive, on_load))
            }
            LoadItemConfig::Network { interface, max_scale } => Box::new(NetworkCollector::new(
                launcher, period, &interface, max_scale, on_load,
            )?),
            LoadItemConfig::Gpu => Box::new(GpuCollector::new(launcher, period, on_load)?),
            LoadItemConfig::Unsupported(UnsupportedItem::Memory) => {
                return Err(CollectionError::UnsupportedItem(
                    "memory load is not supported".to_string(),
                ));
            }
            LoadItemConfig::Unsupported(UnsupportedItem::Unknown(name)) => {
                return Err(CollectionError::UnsupportedItem(format!(
                    "unknown load item {:?}",
                    name
                )));
            }
        };

        Ok(Self {
            item: name,
            inner: Mutex::new(Some(inner)),
        })
    }

    /// Resource type this collector samples.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Stops sampling; no callback runs after this returns. Safe to call
    /// repeatedly and from any thread.
    pub fn stop(&self) {
        let collector = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut collector) = collector {
            info!("To stop {} load collector.", collector.name());
            collector.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |collector| collector.is_running())
    }
}

impl Drop for LoadCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

fn log_load(item: String) -> LoadCallback {
    Arc::new(move |load: f64| debug!("Got {} load: {}", item, load))
}
