//! Storage-proof checking.
//!
//! Proof verification is a trusted predicate: a verifier answers yes or
//! no and the caller acts on the answer. The digest verifier shipped
//! here checks that the prover's payload hashes to the digest committed
//! in the proof's content address.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A storage proof submitted alongside a deal-health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageProof {
    /// Content address the proof commits to
    pub address: String,
    /// Prover-supplied bytes expected to hash to the address digest
    pub payload: Vec<u8>,
}

impl StorageProof {
    pub fn new(address: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            payload,
        }
    }
}

/// Checks storage proofs.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, proof: &StorageProof) -> bool;
}

/// Verifier that recomputes the SHA2-256 digest of the payload and
/// compares it against the digest in the proof's address. Malformed
/// addresses fail verification rather than erroring.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestVerifier;

impl ProofVerifier for DigestVerifier {
    fn verify(&self, proof: &StorageProof) -> bool {
        match crate::address::digest_hex(&proof.address) {
            Ok(expected) => hex::encode(Sha256::digest(&proof.payload)) == expected,
            Err(_) => false,
        }
    }
}
