pub mod generative;
pub mod remote_ml;
pub mod reputation;
pub mod source;

pub use generative::GenerativeSource;
pub use remote_ml::RemoteMlSource;
pub use reputation::ReputationSource;
pub use source::SignalSource;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SignalsConfig;

/// Which adapters are currently configured. Served to the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAvailability {
    pub reputation: bool,
    pub generative: bool,
    pub remote_ml: bool,
}

/// The configured adapters in orchestrator precedence order. An absent or
/// blank credential means the adapter is never constructed; the orchestrator
/// skips it rather than retrying.
pub struct SignalSet {
    pub reputation: Option<Box<dyn SignalSource>>,
    pub generative: Option<Box<dyn SignalSource>>,
    pub remote_ml: Option<Box<dyn SignalSource>>,
}

impl SignalSet {
    pub fn from_config(config: &SignalsConfig) -> Self {
        let reputation = config
            .reputation
            .as_ref()
            .filter(|c| !c.api_key.is_empty())
            .map(|c| Box::new(ReputationSource::new(c)) as Box<dyn SignalSource>);
        let generative = config
            .generative
            .as_ref()
            .filter(|c| !c.api_key.is_empty())
            .map(|c| Box::new(GenerativeSource::new(c)) as Box<dyn SignalSource>);
        let remote_ml = config
            .remote_ml
            .as_ref()
            .filter(|c| !c.endpoint.is_empty())
            .map(|c| Box::new(RemoteMlSource::new(c)) as Box<dyn SignalSource>);

        info!(
            reputation = reputation.is_some(),
            generative = generative.is_some(),
            remote_ml = remote_ml.is_some(),
            "Signal sources configured"
        );

        Self { reputation, generative, remote_ml }
    }

    /// No sources at all: every decision runs on the local scorer.
    pub fn local_only() -> Self {
        Self { reputation: None, generative: None, remote_ml: None }
    }

    pub fn availability(&self) -> ApiAvailability {
        ApiAvailability {
            reputation: self.reputation.is_some(),
            generative: self.generative.is_some(),
            remote_ml: self.remote_ml.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerativeConfig, ReputationConfig};

    #[test]
    fn test_blank_credential_disables_adapter() {
        let config = SignalsConfig {
            reputation: Some(ReputationConfig { api_key: String::new(), base_url: None }),
            generative: Some(GenerativeConfig {
                api_key: "key".into(),
                model: None,
                base_url: None,
            }),
            remote_ml: None,
        };
        let set = SignalSet::from_config(&config);
        let availability = set.availability();
        assert!(!availability.reputation);
        assert!(availability.generative);
        assert!(!availability.remote_ml);
    }

    #[test]
    fn test_local_only_has_no_sources() {
        let availability = SignalSet::local_only().availability();
        assert!(!availability.reputation && !availability.generative && !availability.remote_ml);
    }
}
