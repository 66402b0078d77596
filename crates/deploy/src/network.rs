//! Network registry and environment classification.
//!
//! The registry is the single source of truth for the chain id → ETH/USD price
//! feed mapping on live networks. It is an explicit value built at startup and
//! passed by reference into the resolution flow, so tests can substitute their
//! own tables.

use alloy_core::primitives::{Address, address};

use crate::error::{Error, Result};

/// Network names that designate an ephemeral development chain.
///
/// On these networks the price feed is a locally deployed mock aggregator and
/// the registry is never consulted.
pub const DEVELOPMENT_NETWORKS: &[&str] = &["hardhat", "localhost"];

/// Returns true iff `name` designates a local/ephemeral development network.
pub fn is_development(name: &str) -> bool {
    DEVELOPMENT_NETWORKS.contains(&name)
}

/// A single live network known to the tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEntry {
    pub chain_id: u64,
    pub name: String,
    /// Address of the ETH/USD price feed aggregator on this chain.
    pub price_feed: Address,
}

/// Immutable chain id → [`NetworkEntry`] table.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    entries: Vec<NetworkEntry>,
}

impl NetworkRegistry {
    /// Build a registry from explicit entries.
    ///
    /// Invariant: a chain id identifies at most one entry; duplicates are a
    /// programming error in the table.
    pub fn new(entries: Vec<NetworkEntry>) -> Self {
        debug_assert!(
            entries
                .iter()
                .enumerate()
                .all(|(i, e)| entries[..i].iter().all(|o| o.chain_id != e.chain_id)),
            "duplicate chain id in network registry"
        );
        Self { entries }
    }

    /// An empty registry. Useful for tests on development networks, where the
    /// registry must never be consulted.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Look up the entry for `chain_id`.
    ///
    /// Fails with [`Error::UnknownChain`] if the chain has no registered price
    /// feed; deployment on a live network cannot proceed past this point.
    pub fn entry(&self, chain_id: u64) -> Result<&NetworkEntry> {
        self.entries
            .iter()
            .find(|e| e.chain_id == chain_id)
            .ok_or(Error::UnknownChain { chain_id })
    }

    pub fn entries(&self) -> &[NetworkEntry] {
        &self.entries
    }
}

impl Default for NetworkRegistry {
    /// The built-in table of supported live networks.
    fn default() -> Self {
        Self::new(vec![
            NetworkEntry {
                chain_id: 11155111,
                name: "Sepolia".to_string(),
                price_feed: address!("694AA1769357215DE4FAC081bf1f309aDC325306"),
            },
            NetworkEntry {
                chain_id: 80001,
                name: "PolygonMumbaiTestsNet".to_string(),
                price_feed: address!("0715A7794a1dc8e42615F059dD6e406A6594651A"),
            },
        ])
    }
}

/// The classified execution environment, dispatched once at the top of the
/// resolution flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Ephemeral local chain; the price feed is a locally deployed mock.
    Development { network_name: String },
    /// Live network with a registered price feed.
    Live { entry: NetworkEntry },
}

impl Environment {
    /// Classify the active network.
    ///
    /// Development networks are recognized by name and never touch the
    /// registry. Anything else must have a registry entry or classification
    /// fails with [`Error::UnknownChain`] before any deployment is attempted.
    pub fn classify(registry: &NetworkRegistry, network_name: &str, chain_id: u64) -> Result<Self> {
        if is_development(network_name) {
            return Ok(Environment::Development {
                network_name: network_name.to_string(),
            });
        }

        let entry = registry.entry(chain_id)?;
        Ok(Environment::Live {
            entry: entry.clone(),
        })
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development { .. })
    }

    /// Whether source verification should be attempted at all.
    ///
    /// Verification only makes sense on a live network, and only when an
    /// explorer API credential is configured.
    pub fn should_verify(&self, has_credential: bool) -> bool {
        !self.is_development() && has_credential
    }

    pub fn network_name(&self) -> &str {
        match self {
            Environment::Development { network_name } => network_name,
            Environment::Live { entry } => &entry.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_network_names() {
        assert!(is_development("hardhat"));
        assert!(is_development("localhost"));
        assert!(!is_development("Sepolia"));
        assert!(!is_development("mainnet"));
        assert!(!is_development(""));
    }

    #[test]
    fn test_default_registry_entries() {
        let registry = NetworkRegistry::default();

        let sepolia = registry.entry(11155111).unwrap();
        assert_eq!(sepolia.name, "Sepolia");
        assert_eq!(
            sepolia.price_feed,
            address!("694AA1769357215DE4FAC081bf1f309aDC325306")
        );

        let mumbai = registry.entry(80001).unwrap();
        assert_eq!(mumbai.name, "PolygonMumbaiTestsNet");
        assert_eq!(
            mumbai.price_feed,
            address!("0715A7794a1dc8e42615F059dD6e406A6594651A")
        );
    }

    #[test]
    fn test_unknown_chain_fails() {
        let registry = NetworkRegistry::default();
        let err = registry.entry(999).unwrap_err();
        assert!(matches!(err, Error::UnknownChain { chain_id: 999 }));
    }

    #[test]
    fn test_classify_development_ignores_registry() {
        // An empty registry must not matter for development networks.
        let env = Environment::classify(&NetworkRegistry::empty(), "hardhat", 31337).unwrap();
        assert!(env.is_development());
        assert_eq!(env.network_name(), "hardhat");
    }

    #[test]
    fn test_classify_live_requires_entry() {
        let registry = NetworkRegistry::default();

        let env = Environment::classify(&registry, "Sepolia", 11155111).unwrap();
        assert!(!env.is_development());

        let err = Environment::classify(&registry, "unknown-net", 424242).unwrap_err();
        assert!(matches!(err, Error::UnknownChain { chain_id: 424242 }));
    }

    #[test]
    fn test_verification_gating() {
        let registry = NetworkRegistry::default();
        let dev = Environment::classify(&registry, "localhost", 31337).unwrap();
        let live = Environment::classify(&registry, "Sepolia", 11155111).unwrap();

        // Never on a development network, regardless of credential.
        assert!(!dev.should_verify(true));
        assert!(!dev.should_verify(false));

        // On a live network only with a credential.
        assert!(live.should_verify(true));
        assert!(!live.should_verify(false));
    }
}
