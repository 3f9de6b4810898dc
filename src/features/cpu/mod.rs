pub mod collector;
pub mod parser;

pub use collector::CpuCollector;
pub use parser::{load_from_idle, parse_idle, CpuParser};
