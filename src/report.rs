use crate::error::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Who produced the report file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    /// The agent wrote the file itself
    WrittenByAgent,
    /// The agent left no file; its streamed text was written instead
    Fallback,
    /// Written from a single API response
    WrittenByOrchestrator,
}

/// Result of one report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub source: ReportSource,
}

/// `daily-report-YYYY-MM-DD.md`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("daily-report-{}.md", date.format("%Y-%m-%d"))
}

pub fn report_path(reports_dir: &Path, date: NaiveDate) -> PathBuf {
    reports_dir.join(report_file_name(date))
}

/// Write the report, creating the reports directory and replacing any
/// report already written for the same day.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "daily-report-2026-03-07.md");
        assert_eq!(
            report_path(Path::new("reports"), date),
            PathBuf::from("reports/daily-report-2026-03-07.md")
        );
    }

    #[test]
    fn test_write_report_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("daily-report-2026-03-07.md");

        write_report(&path, "# Report\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Report\n");
    }

    #[test]
    fn test_write_report_overwrites_same_day() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("reports");
        let path = dir.join("daily-report-2026-03-07.md");

        write_report(&path, "first run\n").unwrap();
        write_report(&path, "second run\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second run\n");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
    }
}
