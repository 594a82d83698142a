use crate::error::{ReportError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the report gets produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The agent collects metadata and writes the report itself
    Agent,
    /// Collect metadata locally and make a single Messages API call
    Api,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mode used when `--mode` is not given
    #[serde(default = "default_mode")]
    pub default_mode: Mode,

    /// Directory reports are written to, relative to the repository
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Trailing commit window in hours (default: 24)
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Maximum number of issues and pull requests listed
    #[serde(default = "default_issue_limit")]
    pub issue_limit: u32,

    /// Timeout for each git/gh invocation
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Environment variable holding the Anthropic API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Claude model identifier used in API mode
    #[serde(default = "default_model")]
    pub model: String,

    /// Token budget for the API response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP timeout for the API call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Path or name of the claude CLI used in agent mode
    #[serde(default = "default_claude_binary")]
    pub claude_binary: PathBuf,

    /// Tools the agent may use without asking
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,

    /// Permission mode passed to the agent
    #[serde(default = "default_permission_mode")]
    pub permission_mode: String,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from the default location, falling back to defaults if absent
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("daily-report").join("config.toml"))
    }

    /// Write the default configuration to `path`
    pub fn create_default_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_hours == 0 {
            return Err(ReportError::config("window_hours must be > 0"));
        }

        if self.issue_limit == 0 {
            return Err(ReportError::config("issue_limit must be > 0"));
        }

        if self.command_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ReportError::config("timeouts must be > 0"));
        }

        if self.max_tokens == 0 {
            return Err(ReportError::config("max_tokens must be > 0"));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(ReportError::config("api_key_env must not be empty"));
        }

        if self.claude_binary.as_os_str().is_empty() {
            return Err(ReportError::config("claude_binary must not be empty"));
        }

        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            reports_dir: default_reports_dir(),
            window_hours: default_window_hours(),
            issue_limit: default_issue_limit(),
            command_timeout_secs: default_command_timeout(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            claude_binary: default_claude_binary(),
            allowed_tools: default_allowed_tools(),
            permission_mode: default_permission_mode(),
        }
    }
}

// Serde default functions
fn default_mode() -> Mode {
    Mode::Agent
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_window_hours() -> u32 {
    24
}

fn default_issue_limit() -> u32 {
    10
}

fn default_command_timeout() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout() -> u64 {
    120
}

fn default_claude_binary() -> PathBuf {
    PathBuf::from("claude")
}

fn default_allowed_tools() -> Vec<String> {
    ["Read", "Edit", "Write", "Bash", "Glob", "Grep"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_permission_mode() -> String {
    "bypassPermissions".to_string()
}
