//! Price feed resolution.
//!
//! Decides where the FundMe constructor's aggregator address comes from:
//! a freshly deployed (or reused) mock on development networks, the registry
//! entry everywhere else. The decision was already made when the
//! [`Environment`] was classified; this module just acts on it.

use alloy_core::primitives::Address;

use crate::{error::Result, network::Environment};

/// Resolve the price feed address for the classified environment.
///
/// `deploy_mock` is only invoked for development environments; live
/// environments return the registered address without touching it.
pub async fn resolve_price_feed<F, Fut>(env: &Environment, deploy_mock: F) -> Result<Address>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Address>>,
{
    match env {
        Environment::Development { network_name } => {
            tracing::info!(network = %network_name, "Development network, using mock price feed");
            deploy_mock().await
        }
        Environment::Live { entry } => {
            tracing::info!(
                network = %entry.name,
                chain_id = entry.chain_id,
                price_feed = %entry.price_feed,
                "Using registered price feed"
            );
            Ok(entry.price_feed)
        }
    }
}
