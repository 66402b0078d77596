//! Source verification on an Etherscan-compatible explorer.
//!
//! Verification is best-effort by design: the contract is live whether or not
//! the explorer accepts the submission, so every failure here is logged and
//! reported as a [`VerificationOutcome`], never as an error that aborts the
//! deployment workflow.

use alloy_core::primitives::Address;
use serde::Deserialize;

/// Etherscan v2 unified API endpoint; the chain is selected via the `chainid`
/// query parameter.
pub const DEFAULT_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Outcome of a verification attempt. Informational only, never escalated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The explorer accepted the submission.
    Verified,
    /// The contract source was already verified. Not an error.
    AlreadyVerified,
    /// The submission failed; the reason is logged and the workflow continues.
    Failed(String),
}

/// Explorer API access: endpoint plus credential.
#[derive(Debug, Clone)]
pub struct ExplorerApi {
    pub url: String,
    pub api_key: String,
}

impl ExplorerApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Response envelope of the Etherscan `verifysourcecode` action.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    message: String,
    result: String,
}

/// Submit `(address, constructor args)` for source verification.
///
/// The service reports failures in a structured `{status, message, result}`
/// envelope; the "already verified" case is still only distinguishable by its
/// result text, so that one check falls back to substring matching (including
/// the misspelling some explorers ship).
pub async fn verify(
    client: &reqwest::Client,
    api: &ExplorerApi,
    chain_id: u64,
    address: Address,
    constructor_args: &[u8],
) -> VerificationOutcome {
    tracing::info!(address = %address, chain_id, "Verifying contract source on explorer...");

    let contract_address = address.to_string();
    let args_hex = hex::encode(constructor_args);
    let response = client
        .post(&api.url)
        .query(&[("chainid", chain_id.to_string())])
        .form(&[
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("apikey", api.api_key.as_str()),
            ("contractaddress", contract_address.as_str()),
            // The Etherscan API really does spell it this way.
            ("constructorArguements", args_hex.as_str()),
        ])
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => return log_outcome(VerificationOutcome::Failed(e.to_string())),
    };

    let parsed: VerifyResponse = match response.json().await {
        Ok(parsed) => parsed,
        Err(e) => return log_outcome(VerificationOutcome::Failed(e.to_string())),
    };

    log_outcome(classify_response(&parsed.status, &parsed.message, &parsed.result))
}

/// Map the explorer's response envelope to an outcome.
fn classify_response(status: &str, message: &str, result: &str) -> VerificationOutcome {
    if is_already_verified(result) || is_already_verified(message) {
        return VerificationOutcome::AlreadyVerified;
    }
    if status == "1" {
        return VerificationOutcome::Verified;
    }
    VerificationOutcome::Failed(format!("{message}: {result}"))
}

/// Case-insensitive check for the "already verified" failure text, including
/// the "already verifyed" misspelling seen in the wild.
fn is_already_verified(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("already verified") || lowered.contains("already verifyed")
}

fn log_outcome(outcome: VerificationOutcome) -> VerificationOutcome {
    match &outcome {
        VerificationOutcome::Verified => tracing::info!("Contract verification submitted"),
        VerificationOutcome::AlreadyVerified => {
            tracing::info!("Contract is already verified")
        }
        VerificationOutcome::Failed(reason) => {
            tracing::warn!(reason = %reason, "Contract verification failed (non-fatal)")
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_verified_matching() {
        assert!(is_already_verified("Contract source code already verified"));
        assert!(is_already_verified("ALREADY VERIFIED"));
        assert!(is_already_verified("Already Verifyed"));
        assert!(!is_already_verified("verification pending"));
        assert!(!is_already_verified(""));
    }

    #[test]
    fn test_classify_already_verified_is_not_a_failure() {
        let outcome = classify_response("0", "NOTOK", "Contract source code already verified");
        assert_eq!(outcome, VerificationOutcome::AlreadyVerified);
    }

    #[test]
    fn test_classify_success() {
        let outcome = classify_response("1", "OK", "guid-1234");
        assert_eq!(outcome, VerificationOutcome::Verified);
    }

    #[test]
    fn test_classify_failure_keeps_reason() {
        let outcome = classify_response("0", "NOTOK", "Invalid API Key");
        match outcome {
            VerificationOutcome::Failed(reason) => {
                assert!(reason.contains("Invalid API Key"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
