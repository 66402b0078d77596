//! Minimal ABI encoding for the handful of FundMe and aggregator calls.
//!
//! All calls this tooling makes take static arguments only, so calldata is a
//! 4-byte selector followed by left-padded 32-byte words.

use alloy_core::primitives::{Address, U256, keccak256};

use crate::error::{Error, Result};

/// Compute the 4-byte function selector for a canonical signature, e.g.
/// `"fund()"` or `"getFunder(uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a call as 0x-prefixed hex calldata: selector + static words.
pub fn encode_call(signature: &str, words: &[[u8; 32]]) -> String {
    let mut data = Vec::with_capacity(4 + 32 * words.len());
    data.extend_from_slice(&selector(signature));
    for word in words {
        data.extend_from_slice(word);
    }
    format!("0x{}", hex::encode(data))
}

/// Left-pad an address into a 32-byte ABI word.
pub fn word_from_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// Big-endian encode a [`U256`] into a 32-byte ABI word.
pub fn word_from_u256(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

/// Decode a single returned ABI word (hex string from `eth_call`) as an
/// address.
pub fn decode_address_word(data: &str) -> Result<Address> {
    let bytes = decode_word(data)?;
    Ok(Address::from_slice(&bytes[12..]))
}

/// Decode a single returned ABI word as a [`U256`].
pub fn decode_u256_word(data: &str) -> Result<U256> {
    let bytes = decode_word(data)?;
    Ok(U256::from_be_bytes(bytes))
}

fn decode_word(data: &str) -> Result<[u8; 32]> {
    let raw = hex::decode(data.trim_start_matches("0x"))
        .map_err(|e| Error::malformed("ABI return data", e))?;
    if raw.len() < 32 {
        return Err(Error::malformed(
            "ABI return data",
            format!("expected at least 32 bytes, got {}", raw.len()),
        ));
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&raw[..32]);
    Ok(word)
}
