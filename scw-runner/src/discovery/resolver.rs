//! Discovery cascade
//!
//! Tries each tier in priority order and stops at the first candidate. The
//! trace always has one line per tier, in cascade order, including the
//! tiers that were skipped because an earlier one won.

use scw_client::Connector;
use scw_core::Endpoint;
use scw_core::domain::provenance::Provenance;
use std::sync::Arc;
use tracing::{debug, info};

use super::heuristic::{BrowsingContext, HostRule};
use crate::store::EndpointPreference;

/// Outcome of one pass through the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Winning endpoint, empty when every tier missed
    pub endpoint: Endpoint,
    /// Tier that produced the endpoint
    pub provenance: Provenance,
    /// One line per tier describing what was attempted
    pub trace: Vec<String>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !self.endpoint.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    BuiltIn,
    Saved,
    Heuristic,
    SameOrigin,
}

impl Tier {
    const CASCADE: [Tier; 4] = [Tier::BuiltIn, Tier::Saved, Tier::Heuristic, Tier::SameOrigin];

    fn label(self) -> &'static str {
        match self {
            Tier::BuiltIn => "Built-in configuration (SCW_API_URL)",
            Tier::Saved => "Saved preference",
            Tier::Heuristic => "Host-name heuristic",
            Tier::SameOrigin => "Same-origin /whoami probe",
        }
    }

    fn provenance(self) -> Provenance {
        match self {
            Tier::BuiltIn => Provenance::BuiltInConfig,
            Tier::Saved => Provenance::PersistedPreference,
            Tier::Heuristic => Provenance::HostNameHeuristic,
            Tier::SameOrigin => Provenance::SameOriginProbe,
        }
    }
}

/// Endpoint resolver
///
/// Holds only injected collaborators: the built-in value, the preference
/// slot, the browsing context and a connector for the network tier.
pub struct Resolver {
    builtin: Option<Endpoint>,
    preference: EndpointPreference,
    context: Option<BrowsingContext>,
    rules: Vec<HostRule>,
    connector: Arc<dyn Connector>,
}

impl Resolver {
    pub fn new(
        builtin: Option<&str>,
        preference: EndpointPreference,
        context: Option<BrowsingContext>,
        rules: Vec<HostRule>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            builtin: builtin.and_then(Endpoint::parse),
            preference,
            context,
            rules,
            connector,
        }
    }

    /// The built-in value, if one is configured
    pub fn builtin(&self) -> Option<&Endpoint> {
        self.builtin.as_ref()
    }

    /// Runs the cascade from the first tier
    pub async fn resolve(&self) -> Resolution {
        let mut trace = Vec::with_capacity(Tier::CASCADE.len());
        let mut winner: Option<(Endpoint, Provenance)> = None;

        for (index, tier) in Tier::CASCADE.into_iter().enumerate() {
            let prefix = format!("{}) {}", index + 1, tier.label());

            if winner.is_some() {
                trace.push(format!("{}: skipped, an earlier tier already won.", prefix));
                continue;
            }

            match self.try_tier(tier).await {
                Ok(endpoint) => {
                    info!("Discovery: {} produced {}", tier.label(), endpoint);
                    trace.push(format!("{}: found {}; using it.", prefix, endpoint));
                    winner = Some((endpoint, tier.provenance()));
                }
                Err(reason) => {
                    debug!("Discovery: {} missed ({})", tier.label(), reason);
                    trace.push(format!("{}: {}.", prefix, reason));
                }
            }
        }

        let (endpoint, provenance) = winner.unwrap_or_else(|| {
            info!("Discovery: no tier produced an endpoint");
            (Endpoint::empty(), Provenance::None)
        });

        Resolution {
            endpoint,
            provenance,
            trace,
        }
    }

    /// Evaluates one tier; `Err` carries the reason it missed
    async fn try_tier(&self, tier: Tier) -> Result<Endpoint, String> {
        match tier {
            Tier::BuiltIn => self.builtin.clone().ok_or_else(|| "not set".to_string()),
            Tier::Saved => self.preference.get().ok_or_else(|| "none saved".to_string()),
            Tier::Heuristic => self.heuristic(),
            Tier::SameOrigin => self.probe_same_origin().await,
        }
    }

    fn heuristic(&self) -> Result<Endpoint, String> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| "no browsing context".to_string())?;

        self.rules
            .iter()
            .find_map(|rule| rule.apply(context.host()))
            .ok_or_else(|| format!("no candidate for host {}", context.host()))
    }

    async fn probe_same_origin(&self) -> Result<Endpoint, String> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| "no browsing context".to_string())?;

        let who = self
            .connector
            .connect(context.origin())
            .whoami()
            .await
            .map_err(|e| format!("no answer from {} ({})", context.origin(), e))?;

        who.url
            .and_then(Endpoint::parse)
            .ok_or_else(|| "answer has no usable url field".to_string())
    }
}
