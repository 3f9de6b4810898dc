use crate::features::cpu::CpuCollector;
use crate::features::gpu::parser::GpuParser;
use crate::shared::collector::{
    delivery, period_duration, Delivery, LoadCallback, LoadCell, PeriodicSampler, SourceCommand,
    SourceLauncher, SourceStream,
};
use crate::shared::error::CollectionError;
use crate::shared::traits::LoadSource;
use log::{debug, info};
use std::sync::Arc;

const NAME: &str = "gpu";

/// `intel_gpu_top` sampling interval in milliseconds.
const GPU_SAMPLE_INTERVAL_MS: u64 = 200;

/// Reports the higher of GPU and CPU load once per period.
///
/// The GPU figure alone understates load when the CPU is the bottleneck, so
/// the collector runs its own CPU collector next to `intel_gpu_top`.
pub struct GpuCollector {
    cpu: CpuCollector,
    stream: SourceStream,
    sampler: PeriodicSampler,
    delivery: Delivery,
    cpu_load: Arc<LoadCell>,
    gpu_load: Arc<LoadCell>,
    running: bool,
}

impl GpuCollector {
    pub fn new(
        launcher: Arc<dyn SourceLauncher>,
        period_ms: u64,
        on_load: LoadCallback,
    ) -> Result<Self, CollectionError> {
        let cpu_load = Arc::new(LoadCell::new());
        let cpu = {
            let cpu_load = cpu_load.clone();
            CpuCollector::new(launcher.clone(), period_ms, Arc::new(move |load: f64| cpu_load.set(load)))?
        };

        let command = Self::command();
        let process = launcher.spawn(&command)?;
        let gpu_load = Arc::new(LoadCell::new());
        let stream = {
            let gpu_load = gpu_load.clone();
            SourceStream::start(NAME, process, GpuParser::new(), move |load| gpu_load.set(load))
        };

        let (sink, delivery) = delivery(NAME, on_load);
        let sampler = {
            let cpu_load = cpu_load.clone();
            let gpu_load = gpu_load.clone();
            PeriodicSampler::start(period_duration(period_ms), move || {
                sink.emit(gpu_load.get().max(cpu_load.get()));
                std::future::ready(())
            })
        };
        info!("Started gpu load collector: {}", command);

        Ok(Self {
            cpu,
            stream,
            sampler,
            delivery,
            cpu_load,
            gpu_load,
            running: true,
        })
    }

    pub fn command() -> SourceCommand {
        SourceCommand::new("intel_gpu_top")
            .arg("-s")
            .arg(GPU_SAMPLE_INTERVAL_MS.to_string())
    }

    /// Most recent load reported by the nested CPU collector.
    pub fn cpu_load(&self) -> f64 {
        self.cpu_load.get()
    }

    /// Most recent rolling GPU utilization.
    pub fn gpu_load(&self) -> f64 {
        self.gpu_load.get()
    }
}

impl LoadSource for GpuCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        debug!("To stop gpu load collector.");
        self.cpu.stop();
        self.stream.stop();
        self.sampler.stop();
        self.delivery.stop();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
