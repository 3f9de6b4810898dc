use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Receives every load sample a collector produces.
pub type LoadCallback = Arc<dyn Fn(f64) + Send + Sync>;

const QUEUE_CAPACITY: usize = 32;

/// Producer side of a collector's sample queue. Emitting never waits on the
/// consumer; when the queue is full the sample is dropped.
#[derive(Clone)]
pub struct LoadSink {
    name: &'static str,
    tx: mpsc::Sender<f64>,
    stopped: Arc<AtomicBool>,
}

impl LoadSink {
    pub fn emit(&self, load: f64) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        match self.tx.try_send(load) {
            Ok(()) => {}
            Err(TrySendError::Full(load)) => {
                debug!("{} load consumer is behind, dropping sample {}", self.name, load);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Consumer side: one task that hands queued samples to the callback, one at
/// a time, in the order they were emitted.
pub struct Delivery {
    stopped: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Delivery {
    /// After this returns the callback is not invoked again.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn delivery(name: &'static str, callback: LoadCallback) -> (LoadSink, Delivery) {
    let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
    let stopped = Arc::new(AtomicBool::new(false));

    let task_stopped = stopped.clone();
    let task = tokio::spawn(async move {
        while let Some(load) = rx.recv().await {
            if task_stopped.load(Ordering::Acquire) {
                break;
            }
            callback(load);
        }
    });

    let sink = LoadSink {
        name,
        tx,
        stopped: stopped.clone(),
    };
    let delivery = Delivery {
        stopped,
        task: Some(task),
    };
    (sink, delivery)
}

/// Latest value of a load signal, shared between tasks.
#[derive(Debug, Default)]
pub struct LoadCell(AtomicU64);

impl LoadCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, load: f64) {
        self.0.store(load.to_bits(), Ordering::Release);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn recording() -> (LoadCallback, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: LoadCallback = Arc::new(move |load: f64| sink.lock().unwrap().push(load));
        (callback, seen)
    }

    #[tokio::test]
    async fn test_delivers_in_order() {
        let (callback, seen) = recording();
        let (sink, _delivery) = delivery("test", callback);

        sink.emit(0.1);
        sink.emit(0.2);
        sink.emit(0.3);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock().unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_nothing_delivered_after_stop() {
        let (callback, seen) = recording();
        let (sink, mut delivery) = delivery("test", callback);

        sink.emit(0.5);
        delivery.stop();
        sink.emit(0.6);
        delivery.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(!delivery.is_running());
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() {
        let (callback, seen) = recording();
        let (sink, _delivery) = delivery("test", callback);

        // The delivery task cannot run until this test yields.
        for i in 0..(QUEUE_CAPACITY + 10) {
            sink.emit(i as f64);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(seen.lock().unwrap().len(), QUEUE_CAPACITY);
    }

    #[test]
    fn test_load_cell() {
        let cell = LoadCell::new();
        assert_eq!(cell.get(), 0.0);
        cell.set(0.42);
        assert_eq!(cell.get(), 0.42);
    }
}
