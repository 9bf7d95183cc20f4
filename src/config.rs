use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 12;
const APP_DIR: &str = "umbrella";

/// Client configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the forecast backend.
    pub api_url: String,
    pub timeout: Duration,
    /// Where the preferences file lives.
    pub config_dir: PathBuf,
    /// Where the log file goes while the TUI owns the terminal.
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let timeout_secs = match lookup("UMBRELLA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("UMBRELLA_TIMEOUT_SECS must be whole seconds, got '{raw}'"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config_dir = lookup("UMBRELLA_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| app_dir(dirs::config_dir()));

        Ok(Self {
            api_url: lookup("UMBRELLA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            config_dir,
            log_dir: app_dir(dirs::data_local_dir()),
        })
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}
