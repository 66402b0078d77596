use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    abi, artifact,
    error::{Error, Result},
    mock,
    network::{Environment, NetworkRegistry},
    resolver,
    rpc::{self, TxReceipt},
    verify::{self, ExplorerApi},
};

/// The default name for the deployment record file.
pub const RECORD_FILENAME: &str = "Fundme.toml";

/// Artifact file carrying the FundMe creation bytecode.
const FUNDME_ARTIFACT: &str = "FundMe.json";

/// A single contract-creation request. Constructed fresh per deployment, never
/// persisted.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    /// The aggregator address passed to the FundMe constructor.
    pub price_feed: Address,
    /// Block confirmations to wait for before the deployment counts as done.
    pub confirmations: u64,
}

impl DeploymentRequest {
    pub fn new(price_feed: Address) -> Self {
        Self {
            price_feed,
            confirmations: 1,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        // Zero confirmations would return before the receipt exists.
        self.confirmations = confirmations.max(1);
        self
    }
}

/// Outcome of a contract creation: where it landed and the mined receipt.
#[derive(Debug, Clone)]
pub struct DeploymentResult {
    pub address: Address,
    pub receipt: TxReceipt,
}

/// Persisted record of a completed deployment.
///
/// Saved as `Fundme.toml` in the output data directory; the operator commands
/// (`fund`, `withdraw`) resolve their contract handle from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub chain_id: u64,
    pub network_name: String,
    pub address: Address,
    pub price_feed: Address,
    pub transaction_hash: String,
}

impl DeploymentRecord {
    /// Save the record to `Fundme.toml` inside `outdata`.
    pub fn save(&self, outdata: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(outdata)?;
        let path = outdata.join(RECORD_FILENAME);
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::malformed("deployment record", e))?;
        std::fs::write(&path, content)?;
        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }

    /// Load the record from `outdata`, failing with
    /// [`Error::MissingDeployment`] if none has been saved yet.
    pub fn load(outdata: &Path) -> Result<Self> {
        let path = outdata.join(RECORD_FILENAME);
        if !path.exists() {
            return Err(Error::MissingDeployment { path });
        }
        let content = std::fs::read_to_string(&path)?;
        let record =
            toml::from_str(&content).map_err(|e| Error::malformed("deployment record", e))?;
        tracing::debug!(path = %path.display(), "Deployment record loaded");
        Ok(record)
    }
}

/// Orchestrates the resolve → deploy → verify workflow for one network.
#[derive(Debug, Clone)]
pub struct Deployer {
    /// RPC endpoint of the target node.
    pub rpc_url: String,
    /// Network name as understood by the environment classifier.
    pub network_name: String,
    /// Chain id of the target network.
    pub chain_id: u64,
    /// Output data directory (deployment record, mock record).
    pub outdata: PathBuf,
    /// Directory holding the compiled contract artifacts.
    pub artifacts: PathBuf,
    /// Confirmations to wait for after the creation transaction.
    pub confirmations: u64,
    /// Explorer API credential; verification is skipped when absent.
    pub etherscan_api_key: Option<String>,
}

impl Deployer {
    /// Run the full deployment workflow.
    ///
    /// Classifies the environment, resolves the price feed (deploying the mock
    /// on development networks), deploys FundMe, records the result, and on
    /// live networks with a credential submits the source for verification.
    ///
    /// Without `redeploy`, an existing record for the same chain
    /// short-circuits to a no-op.
    pub async fn deploy(&self, registry: &NetworkRegistry, redeploy: bool) -> Result<DeploymentRecord> {
        let env = Environment::classify(registry, &self.network_name, self.chain_id)?;

        if !redeploy {
            if let Ok(existing) = DeploymentRecord::load(&self.outdata) {
                if existing.chain_id == self.chain_id {
                    tracing::info!(
                        address = %existing.address,
                        "FundMe already deployed on this chain, skipping (use --redeploy to force)"
                    );
                    return Ok(existing);
                }
            }
        }

        let client = rpc::create_client()?;

        let price_feed = resolver::resolve_price_feed(&env, || {
            mock::deploy_mock_aggregator(
                &client,
                &self.rpc_url,
                self.chain_id,
                &self.outdata,
                &self.artifacts,
            )
        })
        .await?;

        let request = DeploymentRequest::new(price_feed).with_confirmations(self.confirmations);
        let result = self.submit_creation(&client, &request).await?;

        let record = DeploymentRecord {
            chain_id: self.chain_id,
            network_name: env.network_name().to_string(),
            address: result.address,
            price_feed,
            transaction_hash: result.receipt.transaction_hash.clone(),
        };
        record.save(&self.outdata)?;

        if env.should_verify(self.etherscan_api_key.is_some()) {
            let api_key = self.etherscan_api_key.as_deref().unwrap_or_default();
            let api = ExplorerApi::new(api_key);
            let constructor_args = abi::word_from_address(price_feed);
            // Best-effort: the outcome is logged inside, never escalated.
            let _ = verify::verify(&client, &api, self.chain_id, result.address, &constructor_args)
                .await;
        } else {
            tracing::debug!(
                development = env.is_development(),
                has_credential = self.etherscan_api_key.is_some(),
                "Skipping verification"
            );
        }

        tracing::info!(
            address = %record.address,
            network = %record.network_name,
            tx_hash = %record.transaction_hash,
            "FundMe deployed"
        );
        tracing::info!("-----------------------------------");

        Ok(record)
    }

    /// Submit the FundMe creation transaction and wait for it to settle.
    ///
    /// Transport failures surface as [`Error::Transient`] (the whole run may
    /// be retried); a receipt with status 0 surfaces as [`Error::Reverted`]
    /// and must not be retried with identical arguments.
    pub async fn submit_creation(
        &self,
        client: &reqwest::Client,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResult> {
        let bytecode = artifact::load_creation_bytecode(&self.artifacts.join(FUNDME_ARTIFACT))?;
        let mut data = bytecode;
        data.extend_from_slice(&abi::word_from_address(request.price_feed));

        let from = rpc::deployer_account(client, &self.rpc_url).await?;

        let tx = serde_json::json!({
            "from": from,
            "data": format!("0x{}", hex::encode(data)),
        });

        tracing::info!(
            from = %from,
            price_feed = %request.price_feed,
            confirmations = request.confirmations,
            "Deploying FundMe..."
        );

        let tx_hash: String =
            rpc::json_rpc_call(client, &self.rpc_url, "eth_sendTransaction", vec![tx]).await?;

        let receipt = rpc::wait_for_receipt(client, &self.rpc_url, &tx_hash)
            .await?
            .into_mined()?;

        let address = receipt.contract_address.ok_or_else(|| Error::Rpc {
            method: "eth_getTransactionReceipt".to_string(),
            message: "creation receipt carries no contract address".to_string(),
        })?;

        rpc::wait_for_confirmations(client, &self.rpc_url, &receipt, request.confirmations).await?;

        Ok(DeploymentResult { address, receipt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn test_record_round_trip() {
        let dir = tempdir::TempDir::new("fundme-record").unwrap();
        let record = DeploymentRecord {
            chain_id: 11155111,
            network_name: "Sepolia".to_string(),
            address: address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            price_feed: address!("694AA1769357215DE4FAC081bf1f309aDC325306"),
            transaction_hash: "0xabc".to_string(),
        };

        record.save(dir.path()).unwrap();
        let loaded = DeploymentRecord::load(dir.path()).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_record() {
        let dir = tempdir::TempDir::new("fundme-record").unwrap();
        let err = DeploymentRecord::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingDeployment { .. }));
    }

    #[test]
    fn test_request_confirmations_floor() {
        let request = DeploymentRequest::new(Address::ZERO).with_confirmations(0);
        assert_eq!(request.confirmations, 1);

        let request = DeploymentRequest::new(Address::ZERO).with_confirmations(6);
        assert_eq!(request.confirmations, 6);
    }
}
