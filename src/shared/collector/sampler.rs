use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Timers cannot run with a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub fn period_duration(period_ms: u64) -> Duration {
    Duration::from_millis(period_ms).max(MIN_PERIOD)
}

/// Runs `tick` once per period until stopped. The first tick fires one full
/// period after start; a tick that overruns delays the next one instead of
/// bunching them up.
pub struct PeriodicSampler {
    task: Option<JoinHandle<()>>,
}

impl PeriodicSampler {
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });

        Self { task: Some(task) }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for PeriodicSampler {
    fn drop(&mut self) {
        self.stop();
    }
}
