use crate::shared::collector::launcher::{SourceOutput, SourceProcess};
use crate::shared::error::CollectionError;
use crate::shared::traits::StreamParser;
use log::{debug, error, info, warn};
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::task::JoinHandle;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// A streamed measurement source being read in the background.
///
/// Every read from stdout is handed to the parser and each sample it yields
/// goes to `on_sample`. Anything the source writes to stderr is logged.
/// Dropping the stream stops it.
pub struct SourceStream {
    name: &'static str,
    child: Option<Child>,
    tasks: Vec<JoinHandle<()>>,
}

impl SourceStream {
    pub fn start<P, F>(name: &'static str, process: SourceProcess, parser: P, on_sample: F) -> Self
    where
        P: StreamParser + 'static,
        F: FnMut(f64) + Send + 'static,
    {
        let (stdout, stderr, child) = process.into_parts();

        let mut tasks = vec![tokio::spawn(read_output(name, stdout, parser, on_sample))];
        if let Some(stderr) = stderr {
            tasks.push(tokio::spawn(read_errors(name, stderr)));
        }

        Self { name, child, tasks }
    }

    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("{} source already gone: {}", self.name, e);
            }
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_output<P, F>(name: &'static str, mut stdout: SourceOutput, mut parser: P, mut on_sample: F)
where
    P: StreamParser,
    F: FnMut(f64),
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = match stdout.read(&mut buf).await {
            Ok(0) => {
                info!("{} source closed its output", name);
                return;
            }
            Ok(n) => n,
            Err(e) => {
                error!("Failed to read {} source output: {}", name, e);
                return;
            }
        };

        match parser.feed(&buf[..n]) {
            Ok(Some(load)) => on_sample(load),
            Ok(None) => {}
            Err(CollectionError::MalformedOutput(reason)) => {
                warn!("{} collector skipped a sample: {}", name, reason);
            }
            Err(e) => error!("{} collector parse error: {}", name, e),
        }
    }
}

async fn read_errors(name: &'static str, mut stderr: SourceOutput) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match stderr.read(&mut buf).await {
            Ok(0) => return,
            Ok(n) => {
                error!("{} collector error: {}", name, String::from_utf8_lossy(&buf[..n]).trim_end());
            }
            Err(e) => {
                debug!("Stopped reading {} source errors: {}", name, e);
                return;
            }
        }
    }
}
