pub mod collector;
pub mod parser;

pub use collector::DiskCollector;
pub use parser::{parse_disk_usage, shell_quote, DiskUsage};
