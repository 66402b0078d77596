//! Shared JSON-RPC plumbing for talking to Ethereum nodes.

use std::time::Duration;

use alloy_core::primitives::{Address, U256};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Default timeout for a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between polling attempts while waiting for a receipt or
/// confirmations.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum time to wait for a submitted transaction to be mined.
pub const RECEIPT_TIMEOUT_SECS: u64 = 180;

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()?)
}

/// Make a JSON-RPC call and deserialize the result.
///
/// Transport failures map to [`Error::Transient`]; a structured error response
/// from the node maps to [`Error::Rpc`].
pub async fn json_rpc_call<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await?;

    let result: Value = response.json().await?;
    parse_rpc_response(method, result)
}

/// Interpret a JSON-RPC response envelope: an `error` member becomes
/// [`Error::Rpc`] carrying the node's message, otherwise the `result` member
/// is deserialized.
fn parse_rpc_response<T: serde::de::DeserializeOwned>(method: &str, envelope: Value) -> Result<T> {
    if let Some(error) = envelope.get("error") {
        return Err(Error::Rpc {
            method: method.to_string(),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    let result_value = envelope.get("result").cloned().ok_or_else(|| Error::Rpc {
        method: method.to_string(),
        message: "no result in response".to_string(),
    })?;

    serde_json::from_value(result_value).map_err(|e| Error::Rpc {
        method: method.to_string(),
        message: format!("failed to deserialize result: {e}"),
    })
}

/// A mined transaction receipt, as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Set only for contract-creation transactions.
    #[serde(rename = "contractAddress")]
    pub contract_address: Option<Address>,
    #[serde(rename = "blockNumber", deserialize_with = "deserialize_u64_from_hex")]
    pub block_number: u64,
    /// "0x1" for success, "0x0" for a reverted transaction.
    pub status: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
}

impl TxReceipt {
    pub fn reverted(&self) -> bool {
        self.status == "0x0"
    }

    /// Turn a mined receipt into a result: a reverted transaction becomes
    /// [`Error::Reverted`], which must not be retried with identical
    /// arguments.
    pub fn into_mined(self) -> Result<Self> {
        if self.reverted() {
            return Err(Error::Reverted {
                tx_hash: self.transaction_hash,
            });
        }
        Ok(self)
    }
}

/// Deserialize a u64 from a 0x-prefixed hex string.
pub fn deserialize_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

/// Parse a 0x-prefixed hex quantity into a [`U256`].
pub fn u256_from_hex(s: &str) -> Result<U256> {
    U256::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| Error::malformed("hex quantity", e))
}

/// Fetch the latest block number.
pub async fn latest_block_number(client: &reqwest::Client, url: &str) -> Result<u64> {
    let hex: String = json_rpc_call(client, url, "eth_blockNumber", vec![]).await?;
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| Error::malformed("block number", e))
}

/// Fetch the chain id reported by the node.
pub async fn chain_id(client: &reqwest::Client, url: &str) -> Result<u64> {
    let hex: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| Error::malformed("chain id", e))
}

/// The sender account used for all transactions: the node's first unlocked
/// account (the deployer).
pub async fn deployer_account(client: &reqwest::Client, url: &str) -> Result<Address> {
    let accounts: Vec<Address> = json_rpc_call(client, url, "eth_accounts", vec![]).await?;
    accounts.into_iter().next().ok_or_else(|| Error::Rpc {
        method: "eth_accounts".to_string(),
        message: "node exposes no unlocked accounts".to_string(),
    })
}

/// Poll `eth_getTransactionReceipt` until the transaction is mined.
pub async fn wait_for_receipt(
    client: &reqwest::Client,
    url: &str,
    tx_hash: &str,
) -> Result<TxReceipt> {
    let start = std::time::Instant::now();
    let max_duration = Duration::from_secs(RECEIPT_TIMEOUT_SECS);

    loop {
        let receipt: Option<TxReceipt> = json_rpc_call(
            client,
            url,
            "eth_getTransactionReceipt",
            vec![serde_json::json!(tx_hash)],
        )
        .await?;

        if let Some(receipt) = receipt {
            return Ok(receipt);
        }

        if start.elapsed() > max_duration {
            return Err(Error::Timeout {
                what: format!("receipt of {tx_hash}"),
                timeout_secs: RECEIPT_TIMEOUT_SECS,
            });
        }

        tracing::trace!(tx_hash = %tx_hash, "Transaction not mined yet, retrying...");
        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
    }
}

/// Block until the receipt's block has at least `confirmations` blocks on top
/// of it (inclusive of its own block).
pub async fn wait_for_confirmations(
    client: &reqwest::Client,
    url: &str,
    receipt: &TxReceipt,
    confirmations: u64,
) -> Result<()> {
    if confirmations <= 1 {
        return Ok(());
    }

    tracing::info!(
        tx_hash = %receipt.transaction_hash,
        confirmations,
        "Waiting for confirmations..."
    );

    let start = std::time::Instant::now();
    let max_duration = Duration::from_secs(RECEIPT_TIMEOUT_SECS * confirmations);

    loop {
        let latest = latest_block_number(client, url).await?;
        if latest + 1 >= receipt.block_number + confirmations {
            return Ok(());
        }

        if start.elapsed() > max_duration {
            return Err(Error::Timeout {
                what: format!(
                    "{confirmations} confirmations of {}",
                    receipt.transaction_hash
                ),
                timeout_secs: max_duration.as_secs(),
            });
        }

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_from_hex() {
        assert_eq!(u256_from_hex("0x0").unwrap(), U256::ZERO);
        assert_eq!(
            u256_from_hex("0xde0b6b3a7640000").unwrap(),
            U256::from(10u64.pow(18))
        );
        assert!(u256_from_hex("0xzz").is_err());
    }

    #[test]
    fn test_receipt_deserialization() {
        let json = serde_json::json!({
            "transactionHash": "0xabc",
            "contractAddress": "0x694aa1769357215de4fac081bf1f309adc325306",
            "blockNumber": "0x10",
            "status": "0x1",
            "gasUsed": "0x5208"
        });
        let receipt: TxReceipt = serde_json::from_value(json).unwrap();
        assert_eq!(receipt.block_number, 16);
        assert!(!receipt.reverted());
        assert!(receipt.contract_address.is_some());
    }

    #[test]
    fn test_reverted_status() {
        let json = serde_json::json!({
            "transactionHash": "0xabc",
            "contractAddress": null,
            "blockNumber": "0x1",
            "status": "0x0",
            "gasUsed": "0x5208"
        });
        let receipt: TxReceipt = serde_json::from_value(json).unwrap();
        assert!(receipt.reverted());

        // The call paths map a reverted receipt to the fatal error variant.
        let err = receipt.into_mined().unwrap_err();
        match err {
            Error::Reverted { tx_hash } => assert_eq!(tx_hash, "0xabc"),
            other => panic!("expected Reverted, got {other:?}"),
        }
        assert!(!matches!(
            Error::Reverted {
                tx_hash: "0xabc".to_string()
            },
            e if e.is_transient()
        ));
    }

    #[test]
    fn test_successful_receipt_passes_through() {
        let receipt = TxReceipt {
            transaction_hash: "0xdef".to_string(),
            contract_address: None,
            block_number: 3,
            status: "0x1".to_string(),
            gas_used: "0x5208".to_string(),
        };
        assert!(receipt.into_mined().is_ok());
    }

    #[test]
    fn test_error_envelope_becomes_rpc_error() {
        let envelope = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "sender doesn't have enough funds" }
        });
        let err = parse_rpc_response::<String>("eth_sendTransaction", envelope).unwrap_err();
        match err {
            Error::Rpc { method, message } => {
                assert_eq!(method, "eth_sendTransaction");
                assert_eq!(message, "sender doesn't have enough funds");
            }
            other => panic!("expected Rpc, got {other:?}"),
        }
    }

    #[test]
    fn test_error_envelope_without_message() {
        let envelope = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000 }
        });
        let err = parse_rpc_response::<String>("eth_call", envelope).unwrap_err();
        match err {
            Error::Rpc { message, .. } => assert_eq!(message, "unknown"),
            other => panic!("expected Rpc, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_becomes_rpc_error() {
        let envelope = serde_json::json!({ "jsonrpc": "2.0", "id": 1 });
        let err = parse_rpc_response::<String>("eth_chainId", envelope).unwrap_err();
        match err {
            Error::Rpc { method, message } => {
                assert_eq!(method, "eth_chainId");
                assert!(message.contains("no result"));
            }
            other => panic!("expected Rpc, got {other:?}"),
        }
    }

    #[test]
    fn test_result_member_deserializes() {
        let envelope = serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": "0x7a69" });
        let hex: String = parse_rpc_response("eth_chainId", envelope).unwrap();
        assert_eq!(hex, "0x7a69");
    }
}
