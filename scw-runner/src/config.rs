//! Console configuration
//!
//! Defines the discovery inputs (built-in URL, browsing context, host rules),
//! where preferences live, timing of polls and requests, and what an
//! automatic run submits.

use anyhow::{Context, Result};
use scw_core::domain::run::RunRequest;
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery::{BrowsingContext, HostRule, default_host_rules};

/// Value baked in at build time; a runtime `SCW_API_URL` replaces it
const BUILD_TIME_API_URL: Option<&str> = option_env!("SCW_API_URL");

/// Console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Built-in API URL, the first discovery tier
    pub builtin_url: Option<String>,

    /// Where the UI is served from (e.g., "https://scw-ui.onrender.com")
    pub origin: Option<String>,

    /// JSON file backing the preference store; in-memory when unset
    pub preferences_path: Option<PathBuf>,

    /// Delay between two run status polls
    pub poll_interval: Duration,

    /// Upper bound for any single request
    pub request_timeout: Duration,

    /// Start a run whenever the endpoint changes
    pub auto_run: bool,

    /// What an automatic run submits
    pub run_defaults: RunRequest,

    /// Host rewrite rules for the heuristic tier, tried in order
    pub host_rules: Vec<HostRule>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(builtin_url: Option<String>) -> Self {
        let mut host_rules = Vec::new();
        if let Ok(rule) = HostRule::exact("scw-ui.onrender.com", "https://scw-api.onrender.com") {
            host_rules.push(rule);
        }
        host_rules.extend(default_host_rules());

        Self {
            builtin_url,
            origin: None,
            preferences_path: default_preferences_path(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            auto_run: true,
            run_defaults: RunRequest::default(),
            host_rules,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized variables:
    /// - SCW_API_URL (optional, overrides the build-time value)
    /// - SCW_UI_ORIGIN (optional)
    /// - SCW_PREFERENCES (optional, path of the preference file)
    /// - SCW_POLL_INTERVAL_MS (optional, default: 1000)
    /// - SCW_REQUEST_TIMEOUT_SECS (optional, default: 5)
    /// - SCW_AUTO_RUN (optional, true/false, default: true)
    /// - SCW_HOST_RULES (optional, `PATTERN=>TEMPLATE` entries separated by `;`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let builtin_url = var("SCW_API_URL").or_else(|| BUILD_TIME_API_URL.map(str::to_string));
        let mut config = Self::new(builtin_url);

        config.origin = var("SCW_UI_ORIGIN");

        if let Some(path) = var("SCW_PREFERENCES") {
            config.preferences_path = Some(PathBuf::from(path));
        }

        if let Some(ms) = var("SCW_POLL_INTERVAL_MS") {
            let ms = ms
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SCW_POLL_INTERVAL_MS is not a number: '{}'", ms))?;
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = var("SCW_REQUEST_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SCW_REQUEST_TIMEOUT_SECS is not a number: '{}'", secs))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(flag) = var("SCW_AUTO_RUN") {
            config.auto_run = parse_flag(&flag)
                .with_context(|| format!("SCW_AUTO_RUN must be true or false, got '{}'", flag))?;
        }

        if let Some(rules) = var("SCW_HOST_RULES") {
            let mut parsed = Vec::new();
            for spec in rules.split(';').filter(|s| !s.trim().is_empty()) {
                parsed.push(HostRule::parse(spec).context("Invalid SCW_HOST_RULES")?);
            }
            // Configured rules are tried before the defaults.
            parsed.append(&mut config.host_rules);
            config.host_rules = parsed;
        }

        Ok(config)
    }

    /// Appends a host rule
    pub fn with_host_rule(mut self, rule: HostRule) -> Self {
        self.host_rules.push(rule);
        self
    }

    /// The browsing context derived from `origin`, if any
    pub fn browsing_context(&self) -> Result<Option<BrowsingContext>> {
        self.origin
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .map(BrowsingContext::parse)
            .transpose()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.builtin_url.as_deref().map(str::trim) {
            if !url.is_empty() && !is_http(url) {
                anyhow::bail!("builtin_url must start with http:// or https://");
            }
        }

        if let Some(origin) = self.origin.as_deref().map(str::trim) {
            if !origin.is_empty() && !is_http(origin) {
                anyhow::bail!("origin must start with http:// or https://");
            }
        }
        self.browsing_context()?;

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(BUILD_TIME_API_URL.map(str::to_string))
    }
}

fn default_preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scw").join("preferences.json"))
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
