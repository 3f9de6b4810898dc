use crate::features::network::parser::NetworkParser;
use crate::shared::collector::{delivery, Delivery, LoadCallback, SourceCommand, SourceLauncher, SourceStream};
use crate::shared::error::CollectionError;
use crate::shared::traits::LoadSource;
use log::{debug, info};
use std::sync::Arc;

const NAME: &str = "network";

/// Streams `nload` for one interface and reports the busier direction's
/// average throughput relative to `max_scale`.
pub struct NetworkCollector {
    stream: SourceStream,
    delivery: Delivery,
    running: bool,
}

impl NetworkCollector {
    pub fn new(
        launcher: Arc<dyn SourceLauncher>,
        period_ms: u64,
        interface: &str,
        max_scale: f64,
        on_load: LoadCallback,
    ) -> Result<Self, CollectionError> {
        let command = Self::command(period_ms, interface);
        let process = launcher.spawn(&command)?;

        let (sink, delivery) = delivery(NAME, on_load);
        let parser = NetworkParser::new(max_scale);
        let stream = SourceStream::start(NAME, process, parser, move |load| sink.emit(load));
        info!("Started network load collector for {} (max scale {} MBit/s)", interface, max_scale);

        Ok(Self {
            stream,
            delivery,
            running: true,
        })
    }

    pub fn command(period_ms: u64, interface: &str) -> SourceCommand {
        SourceCommand::new("nload")
            .arg("-u")
            .arg("m")
            .arg("-t")
            .arg(period_ms.to_string())
            .arg("devices")
            .arg(interface)
    }
}

impl LoadSource for NetworkCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        debug!("To stop network load collector.");
        self.delivery.stop();
        self.stream.stop();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
