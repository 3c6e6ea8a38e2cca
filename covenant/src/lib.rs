//! Covenant - subscription core for DAO-backed storage deals
//!
//! "I will establish my covenant with you" - Genesis 9:11
//!
//! Covenant tracks the lifecycle of decentralized-storage subscriptions:
//! a DAO registers its terms, members pay periodically to keep access,
//! anyone may propose onboarding a new DAO, and the registered vault
//! resolves those proposals. A deal tracker reconciles externally
//! reported replication facts against each DAO's thresholds.
//!
//! ## Components
//!
//! - **Registry**: policy terms per DAO, in registration order
//! - **Ledger**: payment slots and time-derived subscription validity
//! - **Proposals**: onboarding workflow with vault-gated resolution
//! - **Deals**: replication/repair/renewal due-action signals
//! - **Projection**: one-way change records for external mirrors
//!
//! Every mutation flows through [`Covenant`], which serializes it behind
//! a single write lock; logical time comes from an injected [`Clock`]
//! rather than the wall clock, so hosts can drive the core with block
//! timestamps and tests can advance time deterministically.

pub mod clock;
pub mod config;
pub mod deals;
pub mod ledger;
pub mod projection;
pub mod proposals;
pub mod registry;
pub mod service;
pub mod types;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CovenantConfig;
pub use projection::{ChangeKind, ChangeRecord, LogSink, MemorySink, ProjectionSink};
pub use service::Covenant;
pub use types::{CovenantError, Result};
