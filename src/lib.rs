pub mod features;
pub mod shared;

#[cfg(test)]
mod testing;

// Re-export commonly used items from features
pub use features::cpu::CpuCollector;
pub use features::disk::DiskCollector;
pub use features::gpu::{GpuCollector, SlidingWindow};
pub use features::load::{
    LoadCollector,
    LoadCollectorSpec,
    LoadItemConfig,
    LoadMonitorConfig,
    LoadReport,
    LoadReportBuilder,
    UnsupportedItem,
};
pub use features::network::NetworkCollector;

// Re-export shared functionality
pub use shared::collector::{
    LoadCallback,
    ProcessLauncher,
    QueryOutput,
    SourceCommand,
    SourceLauncher,
    SourceProcess,
};
pub use shared::error::CollectionError;
pub use shared::traits::{
    Event,
    Identifiable,
    LoadSource,
    Severity,
    StreamParser,
    Validatable,
};
