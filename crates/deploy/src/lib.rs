//! fundme-deploy - Deployment, funding, and verification tooling for the
//! FundMe contract.
//!
//! This crate resolves the right ETH/USD price feed for the active network
//! (a locally deployed mock on development chains, a registry entry on live
//! ones), deploys the contract through the node's JSON-RPC interface, records
//! the result, and optionally submits the source for explorer verification.

mod abi;
mod artifact;
mod contract;
mod deployer;
mod error;
mod mock;
mod network;
mod resolver;
pub mod rpc;
mod verify;

pub use contract::{FundMe, eth_to_wei};
pub use deployer::{
    Deployer, DeploymentRecord, DeploymentRequest, DeploymentResult, RECORD_FILENAME,
};
pub use error::{Error, Result};
pub use mock::{DECIMALS, INITIAL_ANSWER, MOCK_RECORD_FILENAME, MockRecord, deploy_mock_aggregator};
pub use network::{
    DEVELOPMENT_NETWORKS, Environment, NetworkEntry, NetworkRegistry, is_development,
};
pub use resolver::resolve_price_feed;
pub use verify::{ExplorerApi, VerificationOutcome, verify};
