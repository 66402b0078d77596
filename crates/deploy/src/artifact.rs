//! Loading compiled contract artifacts.
//!
//! The contracts themselves are opaque to this tooling: creation bytecode is
//! read from forge/hardhat-style artifact JSON files and never compiled here.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Read the creation bytecode out of an artifact JSON file.
///
/// Accepts both artifact layouts in the wild: forge's
/// `{"bytecode": {"object": "0x..."}}` and hardhat's `{"bytecode": "0x..."}`.
pub fn load_creation_bytecode(path: &Path) -> Result<Vec<u8>> {
    let content = std::fs::read_to_string(path)?;
    let json: Value =
        serde_json::from_str(&content).map_err(|e| Error::malformed("contract artifact", e))?;

    let bytecode_hex = json["bytecode"]["object"]
        .as_str()
        .or_else(|| json["bytecode"].as_str())
        .ok_or_else(|| {
            Error::malformed(
                "contract artifact",
                format!("no bytecode field in {}", path.display()),
            )
        })?;

    hex::decode(bytecode_hex.trim_start_matches("0x"))
        .map_err(|e| Error::malformed("contract artifact", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_artifact(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_forge_layout() {
        let dir = tempdir::TempDir::new("artifact-test").unwrap();
        let path = write_artifact(
            dir.path(),
            "FundMe.json",
            r#"{"bytecode": {"object": "0x6080604052"}}"#,
        );
        assert_eq!(
            load_creation_bytecode(&path).unwrap(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52]
        );
    }

    #[test]
    fn test_load_hardhat_layout() {
        let dir = tempdir::TempDir::new("artifact-test").unwrap();
        let path = write_artifact(dir.path(), "FundMe.json", r#"{"bytecode": "0xdeadbeef"}"#);
        assert_eq!(
            load_creation_bytecode(&path).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_missing_bytecode_field() {
        let dir = tempdir::TempDir::new("artifact-test").unwrap();
        let path = write_artifact(dir.path(), "FundMe.json", r#"{"abi": []}"#);
        assert!(load_creation_bytecode(&path).is_err());
    }
}
