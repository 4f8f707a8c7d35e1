//! Configuration module
//!
//! Turns command-line overrides into a console configuration.

use anyhow::{Context, Result};
use scw_runner::Console;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// CLI configuration
///
/// Every field overrides the matching environment-derived setting.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub origin: Option<String>,
    pub preferences: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    /// Console settings for one CLI invocation
    ///
    /// Auto-run is always off; only `scw run` submits work.
    pub fn console_config(&self) -> Result<scw_runner::Config> {
        let mut config = scw_runner::Config::from_env()?;

        if let Some(url) = &self.api_url {
            config.builtin_url = Some(url.clone());
        }
        if let Some(origin) = &self.origin {
            config.origin = Some(origin.clone());
        }
        if let Some(path) = &self.preferences {
            config.preferences_path = Some(path.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        config.auto_run = false;

        debug!("Console configuration: {:?}", config);
        Ok(config)
    }

    pub fn console(&self) -> Result<Console> {
        Console::from_config(self.console_config()?).context("Failed to set up console")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let config = Config {
            api_url: Some("https://api.example".to_string()),
            origin: Some("https://ui.example".to_string()),
            preferences: Some(PathBuf::from("/tmp/prefs.json")),
            timeout_secs: Some(9),
            poll_interval_ms: Some(50),
        };

        let console = config.console_config().unwrap();

        assert_eq!(console.builtin_url.as_deref(), Some("https://api.example"));
        assert_eq!(console.origin.as_deref(), Some("https://ui.example"));
        assert_eq!(
            console.preferences_path,
            Some(PathBuf::from("/tmp/prefs.json"))
        );
        assert_eq!(console.request_timeout, Duration::from_secs(9));
        assert_eq!(console.poll_interval, Duration::from_millis(50));
        assert!(!console.auto_run);
    }
}
