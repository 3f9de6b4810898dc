pub mod collector;
pub mod models;

pub use collector::LoadCollector;
pub use models::{
    LoadCollectorSpec, LoadItemConfig, LoadMonitorConfig, LoadReport, LoadReportBuilder, UnsupportedItem,
    DEFAULT_PERIOD_MS,
};
