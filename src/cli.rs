use crate::config::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daily-report")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "AI-generated daily Markdown reports for a git repository",
    long_about = "daily-report gathers the last day of commits, the files they touched and the \
                  open issues and pull requests of a repository, then asks Claude to summarize \
                  them into reports/daily-report-<YYYY-MM-DD>.md. Run it without arguments to \
                  generate today's report."
)]
pub struct Cli {
    /// Report generation mode (default comes from the config file)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Repository to report on (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Directory to write reports to, relative to the repository
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Commit window in hours
    #[arg(long, value_name = "HOURS")]
    pub hours: Option<u32>,

    /// Path to config file (default: ~/.config/daily-report/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.hours == Some(0) {
            return Err("--hours must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Log filter derived from the verbosity count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_arguments() {
        let cli = Cli::parse_from(vec!["daily-report"]);
        assert!(cli.mode.is_none());
        assert!(cli.repo.is_none());
        assert!(cli.command.is_none());
        assert!(cli.validate().is_ok());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::parse_from(vec![
            "daily-report",
            "--mode",
            "api",
            "--repo",
            "/tmp/project",
            "--hours",
            "48",
            "-vv",
        ]);
        assert_eq!(cli.mode, Some(Mode::Api));
        assert_eq!(cli.repo, Some(PathBuf::from("/tmp/project")));
        assert_eq!(cli.hours, Some(48));
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_cli_init_command() {
        let cli = Cli::parse_from(vec!["daily-report", "init", "--force"]);
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }

    #[test]
    fn test_cli_validation_zero_hours() {
        let cli = Cli::parse_from(vec!["daily-report", "--hours", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let result = Cli::try_parse_from(vec!["daily-report", "--mode", "batch"]);
        assert!(result.is_err());
    }
}
