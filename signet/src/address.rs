//! Content-identifier derivation.
//!
//! Addresses are CIDv1 strings with the raw codec and a SHA2-256
//! multihash, compatible with IPFS-style content addressing.

use std::str::FromStr;

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};

use crate::{Result, SignetError};

/// Raw binary codec for CIDv1.
const RAW_CODEC: u64 = 0x55;

/// Derives a content identifier from raw bytes.
pub trait ContentAddresser: Send + Sync {
    /// Encode bytes into a CIDv1 string.
    fn encode(&self, bytes: &[u8]) -> String;
}

/// Default addresser producing CIDv1 strings over SHA2-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Addresser;

impl ContentAddresser for Sha256Addresser {
    fn encode(&self, bytes: &[u8]) -> String {
        let hash = Code::Sha2_256.digest(bytes);
        Cid::new_v1(RAW_CODEC, hash).to_string()
    }
}

/// Parse a CID string and return its SHA2-256 digest as lowercase hex.
///
/// Fails for malformed CIDs and for CIDs whose multihash is not a
/// 32-byte SHA2-256 digest.
pub fn digest_hex(address: &str) -> Result<String> {
    let cid = Cid::from_str(address)
        .map_err(|e| SignetError::InvalidAddress(format!("{}: {}", address, e)))?;

    let hash_bytes = cid.hash().digest();
    if hash_bytes.len() != 32 {
        return Err(SignetError::InvalidAddress(format!(
            "expected a 32-byte SHA256 digest, got {} bytes",
            hash_bytes.len()
        )));
    }

    Ok(hex::encode(hash_bytes))
}
