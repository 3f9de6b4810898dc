use chrono::Utc;
use env_logger::Env;
use loadcollector::{
    Event, LoadCollector, LoadCollectorSpec, LoadMonitorConfig, LoadReportBuilder, Severity,
};
use log::{error, info, warn};
use uuid::Uuid;

fn report(source: &str, category: &str, load: f64) {
    let report = match LoadReportBuilder::new()
        .id(Uuid::new_v4().to_string())
        .timestamp(Utc::now())
        .source(source.to_string())
        .category(category.to_string())
        .load(load)
        .build()
    {
        Ok(report) => report,
        Err(e) => {
            warn!("Discarding {} load sample: {}", category, e);
            return;
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) if report.severity() == Severity::Critical => warn!("{}", json),
        Ok(json) => info!("{}", json),
        Err(e) => error!("Failed to serialize load report: {}", e),
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/load.yaml".to_string());

    info!("Reading config from: {}", config_path);
    let config = match LoadMonitorConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return;
        }
    };

    let hostname = whoami::hostname();
    let mut collectors = Vec::new();
    for item in config.items {
        let source = hostname.clone();
        let category = item.name().to_string();
        let mut spec = LoadCollectorSpec::new(item)
            .on_load(move |load| report(&source, &category, load));
        spec.period = config.period;

        if let Some(collector) = LoadCollector::new(spec) {
            info!("Collecting {} load", collector.item());
            collectors.push(collector);
        }
    }

    if collectors.is_empty() {
        error!("No load collector could be started");
        return;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for shutdown signal: {}", e);
    }

    info!("Shutting down {} load collectors", collectors.len());
    for collector in &collectors {
        collector.stop();
    }
}
