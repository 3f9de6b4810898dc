pub mod collector;
pub mod parser;

pub use collector::NetworkCollector;
pub use parser::{parse_throughput, NetworkParser, Throughput};
