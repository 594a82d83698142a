pub mod github;
pub mod runner;

use runner::ToolRunner;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const NO_COMMITS: &str = "No commits in this period.";
pub const NO_CHANGED_FILES: &str = "No files changed in this period.";
pub const GIT_LOG_UNAVAILABLE: &str = "git is not available; commit history skipped.";
pub const GIT_FILES_UNAVAILABLE: &str = "git is not available; changed files skipped.";

/// Everything collected about the repository for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    /// One-line commit summaries, or a sentinel
    pub commit_log: String,
    /// Sorted, de-duplicated changed paths, or a sentinel
    pub changed_files: String,
    /// Issue and pull request sections
    pub issues_and_prs: String,
}

/// Collects repository metadata through external `git` and `gh` calls.
///
/// None of the collectors fail: an unavailable tool is replaced by a fixed
/// sentinel so the report can still be generated.
pub struct MetadataCollector {
    runner: Arc<dyn ToolRunner>,
    window_hours: u32,
    issue_limit: u32,
}

impl MetadataCollector {
    pub fn new(runner: Arc<dyn ToolRunner>, window_hours: u32, issue_limit: u32) -> Self {
        Self {
            runner,
            window_hours,
            issue_limit,
        }
    }

    fn since_arg(&self) -> String {
        format!("--since={} hours ago", self.window_hours)
    }

    /// `git log --oneline --no-merges` for the window
    pub async fn commit_log(&self) -> String {
        let args = vec![
            "log".to_string(),
            self.since_arg(),
            "--oneline".to_string(),
            "--no-merges".to_string(),
        ];

        match self.runner.run("git", &args).await {
            Ok(output) => {
                let trimmed = output.trim();
                if trimmed.is_empty() {
                    NO_COMMITS.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "commit log unavailable");
                GIT_LOG_UNAVAILABLE.to_string()
            }
        }
    }

    /// Paths touched by commits in the window
    pub async fn changed_files(&self) -> String {
        let args = vec![
            "log".to_string(),
            self.since_arg(),
            "--name-only".to_string(),
            "--pretty=format:".to_string(),
        ];

        match self.runner.run("git", &args).await {
            Ok(output) => {
                let files = normalize_file_list(&output);
                if files.is_empty() {
                    NO_CHANGED_FILES.to_string()
                } else {
                    files
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "changed files unavailable");
                GIT_FILES_UNAVAILABLE.to_string()
            }
        }
    }

    /// Run all collectors in order
    pub async fn collect(&self) -> RepoMetadata {
        let commit_log = self.commit_log().await;
        let changed_files = self.changed_files().await;
        let issues_and_prs = self.issues_and_prs().await;

        RepoMetadata {
            commit_log,
            changed_files,
            issues_and_prs,
        }
    }
}

/// Sort and de-duplicate `git log --name-only` output, one path per line
pub fn normalize_file_list(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::runner::fake::FakeRunner;
    use super::runner::Unavailable;
    use super::*;

    fn collector(runner: FakeRunner) -> MetadataCollector {
        MetadataCollector::new(Arc::new(runner), 24, 10)
    }

    #[test]
    fn test_normalize_file_list() {
        let raw = "src/b.rs\nsrc/a.rs\n\n src/b.rs \nREADME.md\n\nsrc/a.rs\n";
        assert_eq!(normalize_file_list(raw), "README.md\nsrc/a.rs\nsrc/b.rs");
        assert_eq!(normalize_file_list("\n\n"), "");
    }

    #[tokio::test]
    async fn test_commit_log_passes_window() {
        let runner = FakeRunner::new(|program, args| {
            assert_eq!(program, "git");
            assert!(args.contains(&"--since=24 hours ago".to_string()));
            assert!(args.contains(&"--no-merges".to_string()));
            Ok("abc123 fix bug\ndef456 add feature\n".to_string())
        });
        assert_eq!(
            collector(runner).commit_log().await,
            "abc123 fix bug\ndef456 add feature"
        );
    }

    #[tokio::test]
    async fn test_commit_log_empty_window() {
        let runner = FakeRunner::new(|_, _| Ok("\n".to_string()));
        assert_eq!(collector(runner).commit_log().await, NO_COMMITS);
    }

    #[tokio::test]
    async fn test_git_missing_uses_fallbacks() {
        let runner = FakeRunner::new(|program, _| {
            Err(Unavailable::NotFound {
                program: program.to_string(),
            })
        });
        let collector = collector(runner);
        assert_eq!(collector.commit_log().await, GIT_LOG_UNAVAILABLE);
        assert_eq!(collector.changed_files().await, GIT_FILES_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_changed_files_sorted_and_unique() {
        let runner = FakeRunner::new(|_, args| {
            assert!(args.contains(&"--name-only".to_string()));
            Ok("b.py\na.py\n\nb.py\nc/d.py\n".to_string())
        });
        assert_eq!(collector(runner).changed_files().await, "a.py\nb.py\nc/d.py");
    }

    #[tokio::test]
    async fn test_changed_files_empty_window() {
        let runner = FakeRunner::new(|_, _| Ok(String::new()));
        assert_eq!(collector(runner).changed_files().await, NO_CHANGED_FILES);
    }

    #[tokio::test]
    async fn test_collect_runs_every_collector() {
        let runner = Arc::new(FakeRunner::new(|program, args| match program {
            "git" if args.contains(&"--oneline".to_string()) => Ok("abc123 fix bug\n".to_string()),
            "git" => Ok("a.py\nb.py\n".to_string()),
            _ => Err(Unavailable::NotFound {
                program: program.to_string(),
            }),
        }));
        let collector = MetadataCollector::new(runner.clone(), 24, 10);

        let metadata = collector.collect().await;
        assert_eq!(metadata.commit_log, "abc123 fix bug");
        assert_eq!(metadata.changed_files, "a.py\nb.py");
        assert!(metadata.issues_and_prs.contains(github::GH_UNAVAILABLE));
        assert_eq!(runner.calls(), 4);
    }
}
