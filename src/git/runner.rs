use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Why an external tool produced no usable output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    #[error("{program} not found")]
    NotFound { program: String },

    #[error("failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} timed out after {after:?}")]
    TimedOut { program: String, after: Duration },
}

/// Runs an external command and returns its stdout.
///
/// A non-zero exit is not an error: whatever the tool printed is returned,
/// which for `git`/`gh` is usually nothing.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, Unavailable>;
}

/// [`ToolRunner`] backed by real subprocesses with a per-call timeout
pub struct CommandRunner {
    workdir: PathBuf,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(workdir: PathBuf, timeout: Duration) -> Self {
        Self { workdir, timeout }
    }
}

#[async_trait]
impl ToolRunner for CommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, Unavailable> {
        tracing::debug!(program, ?args, "running external tool");

        let child = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Unavailable::NotFound {
                        program: program.to_string(),
                    }
                } else {
                    Unavailable::Spawn {
                        program: program.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Unavailable::Spawn {
                    program: program.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(program, timeout = ?self.timeout, "external tool timed out");
                return Err(Unavailable::TimedOut {
                    program: program.to_string(),
                    after: self.timeout,
                });
            }
        };

        if !output.status.success() {
            tracing::debug!(
                program,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "external tool exited with failure"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = dyn Fn(&str, &[String]) -> Result<String, Unavailable> + Send + Sync;

    /// Scripted runner for tests
    pub struct FakeRunner {
        handler: Box<Handler>,
        calls: AtomicUsize,
    }

    impl FakeRunner {
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&str, &[String]) -> Result<String, Unavailable> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<String, Unavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.handler)(program, args)
        }
    }
}
