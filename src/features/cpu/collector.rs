use crate::features::cpu::parser::CpuParser;
use crate::shared::collector::{delivery, Delivery, LoadCallback, SourceCommand, SourceLauncher, SourceStream};
use crate::shared::error::CollectionError;
use crate::shared::traits::LoadSource;
use log::{debug, info};
use std::sync::Arc;

const NAME: &str = "cpu";

/// Streams `top` in batch mode and reports `1 - idle` from its summary line.
pub struct CpuCollector {
    stream: SourceStream,
    delivery: Delivery,
    running: bool,
}

impl CpuCollector {
    pub fn new(
        launcher: Arc<dyn SourceLauncher>,
        period_ms: u64,
        on_load: LoadCallback,
    ) -> Result<Self, CollectionError> {
        let command = Self::command(period_ms);
        let process = launcher.spawn(&command)?;

        let (sink, delivery) = delivery(NAME, on_load);
        let stream = SourceStream::start(NAME, process, CpuParser::new(), move |load| sink.emit(load));
        info!("Started cpu load collector: {}", command);

        Ok(Self {
            stream,
            delivery,
            running: true,
        })
    }

    /// `top` refreshes in whole seconds, at least once per second.
    pub fn command(period_ms: u64) -> SourceCommand {
        let delay = (period_ms / 1000).max(1);
        SourceCommand::new("top")
            .arg("-b")
            .arg("-d")
            .arg(delay.to_string())
    }
}

impl LoadSource for CpuCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        debug!("To stop cpu load collector.");
        self.delivery.stop();
        self.stream.stop();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
