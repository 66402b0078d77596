use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// The default target network when none is given.
const DEFAULT_NETWORK: KnownNetwork = KnownNetwork::Localhost;

/// Networks this tooling knows how to reach out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum KnownNetwork {
    Hardhat,
    Localhost,
    Sepolia,
    PolygonMumbai,
}

impl KnownNetwork {
    /// The network name as understood by the environment classifier and the
    /// registry.
    pub fn registry_name(&self) -> &'static str {
        match self {
            KnownNetwork::Hardhat => "hardhat",
            KnownNetwork::Localhost => "localhost",
            KnownNetwork::Sepolia => "Sepolia",
            KnownNetwork::PolygonMumbai => "PolygonMumbaiTestsNet",
        }
    }

    /// Default RPC endpoint for the network, used when `--rpc-url` is absent.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            KnownNetwork::Hardhat | KnownNetwork::Localhost => "http://127.0.0.1:8545",
            KnownNetwork::Sepolia => "https://ethereum-sepolia-rpc.publicnode.com",
            KnownNetwork::PolygonMumbai => "https://polygon-mumbai-bor-rpc.publicnode.com",
        }
    }
}

#[derive(Parser)]
#[command(name = "fundme")]
#[command(
    author,
    version,
    about = "Deploy, fund, and withdraw from the FundMe contract"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "FUNDME_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The target network.
    #[arg(short, long, env = "FUNDME_NETWORK", default_value_t = DEFAULT_NETWORK)]
    pub network: KnownNetwork,

    /// The URL of the node's RPC endpoint.
    ///
    /// If not provided, the network's default endpoint is used (a local node
    /// for hardhat/localhost, a public node otherwise).
    #[arg(long, alias = "rpc", env = "FUNDME_RPC_URL")]
    pub rpc_url: Option<String>,

    /// The path to the output data directory (deployment and mock records).
    ///
    /// If not provided, the data will be stored at: ./data_<network-name>
    #[arg(long, alias = "outdata", env = "FUNDME_OUTDATA")]
    pub outdata: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the price feed, deploy FundMe, and verify on live networks.
    Deploy(DeployArgs),
    /// Send ETH to the deployed contract's fund() method.
    Fund(FundArgs),
    /// Withdraw the contract balance (owner only).
    Withdraw,
}

#[derive(Debug, Clone, Parser)]
pub struct DeployArgs {
    /// Directory holding the compiled contract artifacts
    /// (FundMe.json, MockV3Aggregator.json).
    #[arg(long, env = "FUNDME_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: String,

    /// Block confirmations to wait for after the creation transaction.
    #[arg(long, env = "FUNDME_CONFIRMATIONS", default_value_t = 1)]
    pub confirmations: u64,

    /// Redeploy even if a deployment record already exists for this chain.
    #[arg(long, env = "FUNDME_REDEPLOY", default_value_t = false)]
    pub redeploy: bool,

    /// Block-explorer API credential. When absent, verification is skipped.
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct FundArgs {
    /// Amount of ETH to send along with the fund() call.
    #[arg(long, env = "FUNDME_AMOUNT_ETH", default_value_t = 0.1)]
    pub amount_eth: f64,
}

impl Cli {
    /// The effective RPC endpoint: explicit flag first, network default
    /// otherwise.
    pub fn effective_rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    /// The effective output data directory.
    pub fn effective_outdata(&self) -> String {
        self.outdata
            .clone()
            .unwrap_or_else(|| format!("data_{}", self.network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_network_parsing() {
        assert_eq!(
            KnownNetwork::from_str("sepolia").unwrap(),
            KnownNetwork::Sepolia
        );
        assert_eq!(
            KnownNetwork::from_str("polygon-mumbai").unwrap(),
            KnownNetwork::PolygonMumbai
        );
        assert!(KnownNetwork::from_str("mainnet").is_err());
    }

    #[test]
    fn test_registry_names_match_classifier() {
        assert!(fundme_deploy::is_development(
            KnownNetwork::Hardhat.registry_name()
        ));
        assert!(fundme_deploy::is_development(
            KnownNetwork::Localhost.registry_name()
        ));
        assert!(!fundme_deploy::is_development(
            KnownNetwork::Sepolia.registry_name()
        ));
    }
}
