//! Test doubles for the measurement sources.

use crate::shared::collector::{LoadCallback, QueryOutput, SourceCommand, SourceLauncher, SourceProcess};
use crate::shared::error::CollectionError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Cursor};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, ThreadId};
use tokio::io::DuplexStream;

pub(crate) fn recorder() -> (LoadCallback, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: LoadCallback = Arc::new(move |load: f64| sink.lock().unwrap().push(load));
    (callback, seen)
}

/// Counts error records per thread so parallel tests do not see each
/// other's logging.
struct ErrorCounter {
    errors: Mutex<HashMap<ThreadId, usize>>,
}

impl log::Log for ErrorCounter {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() == log::Level::Error
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            *self.errors.lock().unwrap().entry(thread::current().id()).or_default() += 1;
        }
    }

    fn flush(&self) {}
}

fn error_counter() -> &'static ErrorCounter {
    static COUNTER: OnceLock<ErrorCounter> = OnceLock::new();
    COUNTER.get_or_init(|| ErrorCounter {
        errors: Mutex::new(HashMap::new()),
    })
}

/// Error records logged so far on the calling thread.
pub(crate) fn errors_logged_here() -> usize {
    let counter = error_counter();
    if log::set_logger(counter).is_ok() {
        log::set_max_level(log::LevelFilter::Error);
    }
    counter
        .errors
        .lock()
        .unwrap()
        .get(&thread::current().id())
        .copied()
        .unwrap_or(0)
}

enum FakeStream {
    Canned { stdout: Vec<u8>, stderr: Option<Vec<u8>> },
    Pending,
}

#[derive(Clone)]
enum FakeQuery {
    Output(QueryOutput),
    Fail,
}

/// Serves canned output instead of running real programs. Streams are keyed
/// by program name; an unknown program fails to spawn like a missing binary.
/// Queries are answered in order, the last answer repeating.
#[derive(Default)]
pub(crate) struct FakeLauncher {
    streams: Mutex<HashMap<String, FakeStream>>,
    queries: Mutex<VecDeque<FakeQuery>>,
    spawned: Mutex<Vec<SourceCommand>>,
    queried: Mutex<Vec<SourceCommand>>,
    writers: Mutex<Vec<DuplexStream>>,
}

impl FakeLauncher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stream(self, program: &str, stdout: &str) -> Self {
        self.streams.lock().unwrap().insert(
            program.to_string(),
            FakeStream::Canned {
                stdout: stdout.as_bytes().to_vec(),
                stderr: None,
            },
        );
        self
    }

    pub(crate) fn stream_with_stderr(self, program: &str, stdout: &str, stderr: &str) -> Self {
        self.streams.lock().unwrap().insert(
            program.to_string(),
            FakeStream::Canned {
                stdout: stdout.as_bytes().to_vec(),
                stderr: Some(stderr.as_bytes().to_vec()),
            },
        );
        self
    }

    /// A source that stays open and never prints anything.
    pub(crate) fn pending(self, program: &str) -> Self {
        self.streams
            .lock()
            .unwrap()
            .insert(program.to_string(), FakeStream::Pending);
        self
    }

    pub(crate) fn query_output(self, success: bool, stdout: &str, stderr: &str) -> Self {
        self.queries.lock().unwrap().push_back(FakeQuery::Output(QueryOutput {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
        self
    }

    pub(crate) fn query_failure(self) -> Self {
        self.queries.lock().unwrap().push_back(FakeQuery::Fail);
        self
    }

    pub(crate) fn spawned(&self) -> Vec<SourceCommand> {
        self.spawned.lock().unwrap().clone()
    }

    pub(crate) fn queried(&self) -> Vec<SourceCommand> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceLauncher for FakeLauncher {
    fn spawn(&self, command: &SourceCommand) -> Result<SourceProcess, CollectionError> {
        self.spawned.lock().unwrap().push(command.clone());
        match self.streams.lock().unwrap().get(&command.program) {
            Some(FakeStream::Canned { stdout, stderr }) => {
                let process = SourceProcess::from_reader(Cursor::new(stdout.clone()));
                Ok(match stderr {
                    Some(stderr) => process.with_stderr(Cursor::new(stderr.clone())),
                    None => process,
                })
            }
            Some(FakeStream::Pending) => {
                let (reader, writer) = tokio::io::duplex(64);
                self.writers.lock().unwrap().push(writer);
                Ok(SourceProcess::from_reader(reader))
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, command.program.clone()).into()),
        }
    }

    async fn query(&self, command: &SourceCommand) -> Result<QueryOutput, CollectionError> {
        self.queried.lock().unwrap().push(command.clone());
        let answer = {
            let mut queries = self.queries.lock().unwrap();
            if queries.len() > 1 {
                queries.pop_front()
            } else {
                queries.front().cloned()
            }
        };
        match answer {
            Some(FakeQuery::Output(output)) => Ok(output),
            Some(FakeQuery::Fail) | None => {
                Err(io::Error::new(io::ErrorKind::Other, "query failed").into())
            }
        }
    }
}
