pub mod collector;
pub mod parser;
pub mod window;

pub use collector::GpuCollector;
pub use parser::{parse_engine_line, Engine, GpuParser};
pub use window::{SlidingWindow, DEFAULT_CAPACITY};
