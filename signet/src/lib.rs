//! Signet - content addressing and storage proofs
//!
//! "Set me as a seal upon thine heart" - Song of Solomon 8:6
//!
//! Stateless capability interfaces for deriving content identifiers and
//! checking storage proofs, plus the default SHA2-256 implementations.
//! Consumers inject these as collaborators; nothing here holds state or
//! performs I/O.

pub mod address;
pub mod proof;

pub use address::{digest_hex, ContentAddresser, Sha256Addresser};
pub use proof::{DigestVerifier, ProofVerifier, StorageProof};

/// Error types for signet operations.
#[derive(Debug, thiserror::Error)]
pub enum SignetError {
    /// Address could not be parsed or uses an unsupported hash
    #[error("Invalid content address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for signet operations.
pub type Result<T> = std::result::Result<T, SignetError>;
