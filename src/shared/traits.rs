use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::shared::error::CollectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

pub trait Event {
    fn timestamp(&self) -> DateTime<Utc>;
    fn source(&self) -> &str;
    fn event_type(&self) -> &str;
    fn severity(&self) -> Severity;
}

pub trait Identifiable {
    fn id(&self) -> &str;
    fn category(&self) -> &str;
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Turns raw output of an external measurement source into load samples.
///
/// A chunk is whatever one read from the source produced. `Ok(None)` means the
/// chunk held no sample, which is normal; `Err` means the output was there but
/// did not have the expected shape.
pub trait StreamParser: Send {
    fn feed(&mut self, chunk: &[u8]) -> Result<Option<f64>, CollectionError>;
}

/// Lifecycle shared by every load collector.
pub trait LoadSource: Send {
    fn name(&self) -> &'static str;

    /// Stops sampling. Calling it again, or after the source already exited,
    /// does nothing.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
