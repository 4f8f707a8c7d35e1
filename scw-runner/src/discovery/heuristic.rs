//! Host-name heuristic
//!
//! Maps the host the UI is served from to the host the API is served from
//! by regex capture-group substitution.

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use scw_core::Endpoint;
use tracing::warn;
use url::Url;

/// Default `(pattern, template)` pairs
///
/// Render services are named `<name>-ui` / `<name>-api` without hashes.
const DEFAULT_RULES: &[(&str, &str)] = &[(
    r"^(?P<name>[a-z0-9-]+)-ui\.onrender\.com$",
    "https://${name}-api.onrender.com",
)];

/// One host rewrite rule
#[derive(Debug, Clone)]
pub struct HostRule {
    pattern: Regex,
    template: String,
}

impl HostRule {
    /// Creates a rule from a regex and a replacement template
    ///
    /// The template may reference capture groups as `$1` or `${name}`.
    pub fn new(pattern: &str, template: impl Into<String>) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid host pattern '{}'", pattern))?;
        Ok(Self {
            pattern,
            template: template.into(),
        })
    }

    /// Creates a rule mapping exactly one host to a fixed endpoint
    pub fn exact(host: &str, endpoint: &str) -> Result<Self> {
        Self::new(&format!("^{}$", regex::escape(host)), endpoint.replace('$', "$$"))
    }

    /// Parses `PATTERN=>TEMPLATE`
    pub fn parse(spec: &str) -> Result<Self> {
        let (pattern, template) = spec
            .split_once("=>")
            .ok_or_else(|| anyhow!("Host rule '{}' must look like PATTERN=>TEMPLATE", spec))?;
        Self::new(pattern.trim(), template.trim())
    }

    /// Derives an endpoint for `host`, if the rule matches
    pub fn apply(&self, host: &str) -> Option<Endpoint> {
        let captures = self.pattern.captures(host)?;
        let mut derived = String::new();
        captures.expand(&self.template, &mut derived);
        Endpoint::parse(derived)
    }
}

/// Rules used when none are configured
pub fn default_host_rules() -> Vec<HostRule> {
    DEFAULT_RULES
        .iter()
        .filter_map(|(pattern, template)| match HostRule::new(pattern, *template) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!("Skipping built-in host rule: {:#}", e);
                None
            }
        })
        .collect()
}

/// Where the UI is being served from
///
/// Stands in for the browser location: its host feeds the heuristic and its
/// origin is where the same-origin probe is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsingContext {
    origin: Endpoint,
    host: String,
}

impl BrowsingContext {
    /// Parses an absolute URL such as `https://scw-ui.onrender.com/app`
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).with_context(|| format!("Invalid origin URL '{}'", raw))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Origin URL '{}' has no host", raw))?
            .to_ascii_lowercase();

        Ok(Self {
            origin: Endpoint::new(url.origin().ascii_serialization()),
            host,
        })
    }

    pub fn origin(&self) -> &Endpoint {
        &self.origin
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}
