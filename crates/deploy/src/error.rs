//! Error taxonomy for the deployment workflow.
//!
//! The variants are split along retry semantics: [`Error::Transient`] means the
//! whole run may be retried as-is, [`Error::Reverted`] means the transaction was
//! rejected on-chain and retrying with identical arguments is pointless, and
//! [`Error::UnknownChain`] means the network configuration itself is missing.
//! Verification failures are deliberately absent here; they are reported as a
//! [`crate::VerificationOutcome`] and never abort a run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No price feed is registered for the target chain. Deployment cannot
    /// proceed without a valid aggregator address.
    #[error("no price feed registered for chain id {chain_id}")]
    UnknownChain { chain_id: u64 },

    /// Transport-level failure talking to the RPC endpoint. The run may be
    /// retried.
    #[error("RPC transport failure: {0}")]
    Transient(#[from] reqwest::Error),

    /// Structured error response from the JSON-RPC node.
    #[error("RPC error from {method}: {message}")]
    Rpc { method: String, message: String },

    /// The transaction was mined with status 0. Fatal: the constructor or the
    /// called method rejected the arguments, so the same run must not be
    /// replayed blindly.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    /// An operator command was invoked but no deployment record exists yet.
    #[error("no deployment record found at {}, run `fundme deploy` first", .path.display())]
    MissingDeployment { path: PathBuf },

    /// Timed out waiting for a transaction receipt or confirmations.
    #[error("timed out after {timeout_secs}s waiting for {what}")]
    Timeout { what: String, timeout_secs: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A state file (deployment record, contract artifact) could not be parsed.
    #[error("malformed {what}: {message}")]
    Malformed { what: &'static str, message: String },
}

impl Error {
    pub(crate) fn malformed(what: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Malformed {
            what,
            message: err.to_string(),
        }
    }

    /// Whether retrying the whole run with identical inputs is safe.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_) | Error::Timeout { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
