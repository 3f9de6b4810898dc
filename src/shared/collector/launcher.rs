use crate::shared::error::CollectionError;
use async_trait::async_trait;
use log::debug;
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

/// An external measurement command: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SourceCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Runs `script` through `sh -c`.
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }
}

impl fmt::Display for SourceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub type SourceOutput = Box<dyn AsyncRead + Send + Unpin>;

/// A running streamed source. `child` is absent for sources that are not
/// backed by an OS process.
pub struct SourceProcess {
    pub stdout: SourceOutput,
    pub stderr: Option<SourceOutput>,
    child: Option<Child>,
}

impl SourceProcess {
    pub fn from_child(mut child: Child) -> Result<Self, CollectionError> {
        let stdout = child.stdout.take().ok_or_else(|| {
            CollectionError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child process has no stdout pipe",
            ))
        })?;
        let stderr = child
            .stderr
            .take()
            .map(|stderr| Box::new(stderr) as SourceOutput);

        Ok(Self {
            stdout: Box::new(stdout),
            stderr,
            child: Some(child),
        })
    }

    pub fn from_reader(stdout: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            stdout: Box::new(stdout),
            stderr: None,
            child: None,
        }
    }

    pub fn with_stderr(mut self, stderr: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.stderr = Some(Box::new(stderr));
        self
    }

    pub(crate) fn into_parts(self) -> (SourceOutput, Option<SourceOutput>, Option<Child>) {
        (self.stdout, self.stderr, self.child)
    }
}

/// Completed result of a one-shot query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Starts external measurement sources on behalf of the collectors.
#[async_trait]
pub trait SourceLauncher: Send + Sync {
    /// Starts a long-running source whose output is read incrementally.
    fn spawn(&self, command: &SourceCommand) -> Result<SourceProcess, CollectionError>;

    /// Runs a source to completion and returns everything it printed.
    async fn query(&self, command: &SourceCommand) -> Result<QueryOutput, CollectionError>;
}

/// Launches sources as OS processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

#[async_trait]
impl SourceLauncher for ProcessLauncher {
    fn spawn(&self, command: &SourceCommand) -> Result<SourceProcess, CollectionError> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        debug!("Spawned `{}` with pid {:?}", command, child.id());
        SourceProcess::from_child(child)
    }

    async fn query(&self, command: &SourceCommand) -> Result<QueryOutput, CollectionError> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(QueryOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let command = SourceCommand::new("top").arg("-b").arg("-d").arg("1");
        assert_eq!(command.to_string(), "top -b -d 1");
    }

    #[test]
    fn test_shell_command() {
        let command = SourceCommand::shell("df -k '/'");
        assert_eq!(command.program, "sh");
        assert_eq!(command.args, vec!["-c".to_string(), "df -k '/'".to_string()]);
    }

    #[tokio::test]
    async fn test_reader_backed_process_has_no_child() {
        let process = SourceProcess::from_reader(std::io::Cursor::new(b"hello".to_vec()));
        let (_, stderr, child) = process.into_parts();
        assert!(stderr.is_none());
        assert!(child.is_none());
    }
}
