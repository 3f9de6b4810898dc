//! Plumbing shared by the load collectors: launching measurement sources,
//! reading their output, periodic timers and sample delivery.

mod launcher;
mod lines;
mod sampler;
mod sink;
mod stream;

pub use launcher::{ProcessLauncher, QueryOutput, SourceCommand, SourceLauncher, SourceOutput, SourceProcess};
pub use lines::LineBuffer;
pub use sampler::{period_duration, PeriodicSampler};
pub use sink::{delivery, Delivery, LoadCallback, LoadCell, LoadSink};
pub use stream::SourceStream;
