//! Mock price-feed aggregator for development networks.
//!
//! On ephemeral chains there is no live Chainlink aggregator to point the
//! contract at, so a MockV3Aggregator stand-in is deployed instead. The
//! deployment is idempotent per output directory: the first deploy records the
//! address in `mock-aggregator.json`, later runs against the same chain reuse
//! it as long as code is still present at that address.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    abi, artifact,
    error::{Error, Result},
    rpc,
};

/// Decimals reported by the mock aggregator.
pub const DECIMALS: u8 = 8;
/// Initial ETH/USD answer: 2000 USD at 8 decimals.
pub const INITIAL_ANSWER: u64 = 200_000_000_000;

/// Record file name inside the output data directory.
pub const MOCK_RECORD_FILENAME: &str = "mock-aggregator.json";

/// Persisted record of a deployed mock aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockRecord {
    pub chain_id: u64,
    pub address: Address,
}

/// Deploy the mock aggregator, or reuse a previously deployed one.
///
/// Reuse requires a record for the same chain id AND live code at the recorded
/// address; a stale record (chain restarted, snapshot reverted) falls through
/// to a fresh deployment and the record is replaced, never silently
/// mismatched.
pub async fn deploy_mock_aggregator(
    client: &reqwest::Client,
    rpc_url: &str,
    chain_id: u64,
    outdata: &Path,
    artifacts: &Path,
) -> Result<Address> {
    if let Some(address) = reusable_mock(client, rpc_url, chain_id, outdata).await {
        tracing::info!(address = %address, "Reusing previously deployed mock aggregator");
        return Ok(address);
    }

    tracing::info!(decimals = DECIMALS, initial_answer = INITIAL_ANSWER, "Deploying mock aggregator...");

    let bytecode = artifact::load_creation_bytecode(&artifacts.join("MockV3Aggregator.json"))?;
    let mut data = bytecode;
    data.extend_from_slice(&abi::word_from_u256(U256::from(DECIMALS)));
    data.extend_from_slice(&abi::word_from_u256(U256::from(INITIAL_ANSWER)));

    let from = rpc::deployer_account(client, rpc_url).await?;
    let tx_hash: String = rpc::json_rpc_call(
        client,
        rpc_url,
        "eth_sendTransaction",
        vec![serde_json::json!({
            "from": from,
            "data": format!("0x{}", hex::encode(data)),
        })],
    )
    .await?;

    let receipt = rpc::wait_for_receipt(client, rpc_url, &tx_hash)
        .await?
        .into_mined()?;

    let address = receipt.contract_address.ok_or_else(|| Error::Rpc {
        method: "eth_getTransactionReceipt".to_string(),
        message: "creation receipt carries no contract address".to_string(),
    })?;

    save_record(outdata, &MockRecord { chain_id, address })?;
    tracing::info!(address = %address, "Mock aggregator deployed");

    Ok(address)
}

/// Check whether a recorded mock deployment is still usable.
async fn reusable_mock(
    client: &reqwest::Client,
    rpc_url: &str,
    chain_id: u64,
    outdata: &Path,
) -> Option<Address> {
    let record = load_record(outdata).ok()??;
    if record.chain_id != chain_id {
        tracing::debug!(
            recorded = record.chain_id,
            active = chain_id,
            "Mock record is for a different chain, redeploying"
        );
        return None;
    }

    let code: String = rpc::json_rpc_call(
        client,
        rpc_url,
        "eth_getCode",
        vec![serde_json::json!(record.address), serde_json::json!("latest")],
    )
    .await
    .ok()?;

    if code == "0x" || code.is_empty() {
        tracing::debug!(address = %record.address, "No code at recorded mock address, redeploying");
        return None;
    }

    Some(record.address)
}

fn record_path(outdata: &Path) -> PathBuf {
    outdata.join(MOCK_RECORD_FILENAME)
}

fn save_record(outdata: &Path, record: &MockRecord) -> Result<()> {
    std::fs::create_dir_all(outdata)?;
    let content = serde_json::to_string_pretty(record)
        .map_err(|e| Error::malformed("mock record", e))?;
    std::fs::write(record_path(outdata), content)?;
    Ok(())
}

/// Load the mock record, if one exists. `Ok(None)` means no record file.
pub fn load_record(outdata: &Path) -> Result<Option<MockRecord>> {
    let path = record_path(outdata);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let record =
        serde_json::from_str(&content).map_err(|e| Error::malformed("mock record", e))?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn test_record_round_trip() {
        let dir = tempdir::TempDir::new("mock-record").unwrap();
        let record = MockRecord {
            chain_id: 31337,
            address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
        };

        save_record(dir.path(), &record).unwrap();
        let loaded = load_record(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.chain_id, 31337);
        assert_eq!(loaded.address, record.address);
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempdir::TempDir::new("mock-record").unwrap();
        assert!(load_record(dir.path()).unwrap().is_none());
    }
}
