use crate::features::disk::parser::{parse_disk_usage, shell_quote};
use crate::shared::collector::{
    delivery, period_duration, Delivery, LoadCallback, PeriodicSampler, SourceCommand, SourceLauncher,
};
use crate::shared::traits::LoadSource;
use log::{debug, error, info, warn};
use std::sync::Arc;

const NAME: &str = "disk";

/// Queries `df` once per period and reports the used share of the drive.
pub struct DiskCollector {
    sampler: PeriodicSampler,
    delivery: Delivery,
    running: bool,
}

impl DiskCollector {
    pub fn new(launcher: Arc<dyn SourceLauncher>, period_ms: u64, drive: &str, on_load: LoadCallback) -> Self {
        let command = Self::command(drive);
        let (sink, delivery) = delivery(NAME, on_load);

        info!("Started disk load collector: {}", command);
        let sampler = PeriodicSampler::start(period_duration(period_ms), move || {
            let launcher = launcher.clone();
            let command = command.clone();
            let sink = sink.clone();
            async move {
                if let Some(load) = query_load(launcher.as_ref(), &command).await {
                    sink.emit(load);
                }
            }
        });

        Self {
            sampler,
            delivery,
            running: true,
        }
    }

    pub fn command(drive: &str) -> SourceCommand {
        SourceCommand::shell(format!("df -k {}", shell_quote(drive)))
    }
}

/// One tick. Failures are logged and the tick yields no sample.
async fn query_load(launcher: &dyn SourceLauncher, command: &SourceCommand) -> Option<f64> {
    let output = match launcher.query(command).await {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to run `{}`: {}", command, e);
            return None;
        }
    };

    if !output.success {
        error!("`{}` failed: {}", command, output.stderr.trim());
        return None;
    }

    match parse_disk_usage(&output.stdout) {
        Ok(usage) => Some(usage.load()),
        Err(e) => {
            warn!("Skipping disk sample from `{}`: {}", command, e);
            None
        }
    }
}

impl LoadSource for DiskCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        debug!("To stop disk load collector.");
        self.sampler.stop();
        self.delivery.stop();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
