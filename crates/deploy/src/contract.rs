//! Handle to an already-deployed FundMe contract.
//!
//! The contract itself is opaque: this module only knows the handful of
//! selectors the operator commands and tests need. State-changing calls are
//! sent from the node's deployer account and block until one confirmation.

use std::path::Path;

use alloy_core::primitives::{Address, U256};

use crate::{
    abi,
    deployer::DeploymentRecord,
    error::{Error, Result},
    rpc::{self, TxReceipt},
};

/// A connected FundMe instance.
pub struct FundMe {
    pub address: Address,
    rpc_url: String,
    client: reqwest::Client,
}

impl FundMe {
    /// Connect to the deployment recorded in `outdata`.
    ///
    /// Fails with [`Error::MissingDeployment`] when nothing has been deployed
    /// yet, and refuses a record written for a different chain than the node
    /// reports.
    pub async fn from_record(outdata: &Path, rpc_url: &str) -> Result<Self> {
        let record = DeploymentRecord::load(outdata)?;
        let client = rpc::create_client()?;

        let active_chain = rpc::chain_id(&client, rpc_url).await?;
        if active_chain != record.chain_id {
            return Err(Error::Rpc {
                method: "eth_chainId".to_string(),
                message: format!(
                    "deployment record is for chain {} but the node reports chain {}",
                    record.chain_id, active_chain
                ),
            });
        }

        Ok(Self {
            address: record.address,
            rpc_url: rpc_url.to_string(),
            client,
        })
    }

    /// Call `fund()` with `value` wei attached and wait for one confirmation.
    pub async fn fund(&self, value: U256) -> Result<TxReceipt> {
        tracing::info!(value_wei = %value, "Funding contract...");
        self.send(abi::encode_call("fund()", &[]), Some(value)).await
    }

    /// Call `withdraw()` and wait for one confirmation.
    pub async fn withdraw(&self) -> Result<TxReceipt> {
        tracing::info!("Withdrawing from contract...");
        self.send(abi::encode_call("withdraw()", &[]), None).await
    }

    /// The aggregator address the contract was constructed with.
    pub async fn price_feed(&self) -> Result<Address> {
        let data = self.call(abi::encode_call("getPriceFeed()", &[])).await?;
        abi::decode_address_word(&data)
    }

    /// Total wei contributed by `funder`.
    pub async fn amount_funded(&self, funder: Address) -> Result<U256> {
        let data = self
            .call(abi::encode_call(
                "getAddressToAmountFunded(address)",
                &[abi::word_from_address(funder)],
            ))
            .await?;
        abi::decode_u256_word(&data)
    }

    /// The funder recorded at `index`; reverts on-chain once the list has been
    /// reset by a withdrawal.
    pub async fn funder(&self, index: u64) -> Result<Address> {
        let data = self
            .call(abi::encode_call(
                "getFunder(uint256)",
                &[abi::word_from_u256(U256::from(index))],
            ))
            .await?;
        abi::decode_address_word(&data)
    }

    /// Current contract balance in wei.
    pub async fn balance(&self) -> Result<U256> {
        let hex: String = rpc::json_rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_getBalance",
            vec![serde_json::json!(self.address), serde_json::json!("latest")],
        )
        .await?;
        rpc::u256_from_hex(&hex)
    }

    /// Submit a state-changing call and wait until it is mined successfully.
    async fn send(&self, calldata: String, value: Option<U256>) -> Result<TxReceipt> {
        let from = rpc::deployer_account(&self.client, &self.rpc_url).await?;

        let mut tx = serde_json::json!({
            "from": from,
            "to": self.address,
            "data": calldata,
        });
        if let Some(value) = value {
            tx["value"] = serde_json::json!(format!("{value:#x}"));
        }

        let tx_hash: String =
            rpc::json_rpc_call(&self.client, &self.rpc_url, "eth_sendTransaction", vec![tx])
                .await?;

        let receipt = rpc::wait_for_receipt(&self.client, &self.rpc_url, &tx_hash)
            .await?
            .into_mined()?;

        tracing::info!(tx_hash = %receipt.transaction_hash, "Transaction confirmed");
        Ok(receipt)
    }

    /// Read-only `eth_call` against the contract.
    async fn call(&self, calldata: String) -> Result<String> {
        rpc::json_rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_call",
            vec![
                serde_json::json!({ "to": self.address, "data": calldata }),
                serde_json::json!("latest"),
            ],
        )
        .await
    }
}

/// Convert an ETH amount to wei.
///
/// Rounds to gwei precision first to avoid floating-point noise; more than
/// sufficient for operator-supplied amounts.
pub fn eth_to_wei(eth: f64) -> U256 {
    let gwei = (eth * 1e9).round() as u128;
    U256::from(gwei) * U256::from(1_000_000_000u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eth_to_wei() {
        assert_eq!(eth_to_wei(1.0), U256::from(10u64.pow(18)));
        assert_eq!(eth_to_wei(0.1), U256::from(100_000_000_000_000_000u64));
        assert_eq!(eth_to_wei(0.7), U256::from(700_000_000_000_000_000u64));
        assert_eq!(eth_to_wei(0.0), U256::ZERO);
    }

    #[test]
    fn test_fund_calldata_is_bare_selector() {
        assert_eq!(abi::encode_call("fund()", &[]), "0xb60d4288");
        assert_eq!(abi::encode_call("withdraw()", &[]), "0x3ccfd60b");
    }
}
