use crate::ai::prompt::{build_agent_prompt, build_report_prompt};
use crate::ai::{AgentEvent, AgentRequest, AgentRuntime, CompletionProvider};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::git::MetadataCollector;
use crate::report::{self, ReportOutcome, ReportSource};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Drives one report run in either mode
pub struct Orchestrator {
    config: Config,
    repo_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(config: Config, repo_dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            repo_dir,
            clock,
        }
    }

    /// Reports directory; relative paths resolve against the repository
    pub fn reports_dir(&self) -> PathBuf {
        if self.config.reports_dir.is_absolute() {
            self.config.reports_dir.clone()
        } else {
            self.repo_dir.join(&self.config.reports_dir)
        }
    }

    /// Today's report path
    pub fn report_path(&self) -> PathBuf {
        report::report_path(&self.reports_dir(), self.clock.today())
    }

    /// Let the agent gather metadata and write the report.
    ///
    /// Events are echoed as they arrive. If the agent does not create or
    /// change the report file, the text it streamed is written instead.
    pub async fn run_agent_mode(&self, agent: &dyn AgentRuntime) -> Result<ReportOutcome> {
        let today = self.clock.today();
        let path = self.report_path();
        // The agent runs inside the repository, so give it the relative path.
        let prompt_path = report::report_path(&self.config.reports_dir, today);

        let request = AgentRequest {
            prompt: build_agent_prompt(
                today,
                self.config.window_hours,
                self.config.issue_limit,
                &prompt_path,
            ),
            allowed_tools: self.config.allowed_tools.clone(),
            permission_mode: self.config.permission_mode.clone(),
            workdir: self.repo_dir.clone(),
        };

        // A report left by an earlier run today does not count as this run's.
        let before = FileStamp::read(&path);

        tracing::info!(path = %path.display(), "starting agent run");
        let mut events = agent.start(request).await?;
        let mut report_text = String::new();

        while let Some(event) = events.recv().await {
            match event {
                AgentEvent::Text(text) => {
                    println!("{}", text);
                    report_text.push_str(&text);
                    report_text.push('\n');
                }
                AgentEvent::ToolCall { name } => println!("[Tool] {}", name),
                AgentEvent::Result { subtype, is_error } => {
                    if is_error {
                        tracing::warn!(%subtype, "agent finished with an error");
                    }
                    println!("[Done] {}", subtype);
                }
            }
        }

        // The stream only ends after the agent process has exited.
        let after = FileStamp::read(&path);
        if after.is_some() && after != before {
            println!("Report saved: {}", path.display());
            return Ok(ReportOutcome {
                path,
                source: ReportSource::WrittenByAgent,
            });
        }

        tracing::info!("agent did not write the report, using streamed text");
        report::write_report(&path, &report_text)?;
        println!("Report saved (fallback): {}", path.display());

        Ok(ReportOutcome {
            path,
            source: ReportSource::Fallback,
        })
    }

    /// Collect metadata locally and write the response of a single API call.
    ///
    /// A missing credential aborts before anything is collected or sent;
    /// `connect` is only called once the key is known.
    pub async fn run_api_mode<P, F>(
        &self,
        credential: Option<String>,
        collector: &MetadataCollector,
        connect: F,
    ) -> Result<ReportOutcome>
    where
        P: CompletionProvider,
        F: FnOnce(String) -> Result<P>,
    {
        let api_key = credential.ok_or_else(|| ReportError::MissingCredential {
            var: self.config.api_key_env.clone(),
        })?;
        let provider = connect(api_key)?;

        let today = self.clock.today();
        let path = self.report_path();

        let spinner = progress_spinner("Collecting repository metadata...");
        let metadata = collector.collect().await;
        spinner.finish_and_clear();

        let prompt = build_report_prompt(today, self.config.window_hours, &metadata);
        tracing::debug!(chars = prompt.len(), "report prompt built");

        let spinner = progress_spinner("Waiting for Claude...");
        let response = provider.complete(prompt).await;
        spinner.finish_and_clear();
        let response = response?;

        report::write_report(&path, &response)?;
        println!("Report saved: {}", path.display());

        Ok(ReportOutcome {
            path,
            source: ReportSource::WrittenByOrchestrator,
        })
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn progress_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Modification time and contents of a file, if it exists
#[derive(Debug, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    contents: Vec<u8>,
}

impl FileStamp {
    fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        let contents = fs::read(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            contents,
        })
    }
}
