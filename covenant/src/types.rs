//! Core types for the covenant subscription system.

use serde::{Deserialize, Serialize};

/// Address-like identity of a registered dao.
pub type DaoId = String;

/// Address-like identity of a payer, vault, proposer or reporter.
pub type Address = String;

/// How members pay a dao.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Native currency attached to the call
    Native,
    /// External token contract referenced by the policy
    Token,
}

/// Whether a dao accepts new subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// New members may subscribe
    Open,
    /// Payments are refused
    Closed,
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Subscription terms a dao registers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoPolicy {
    /// Seconds a payment remains valid
    pub period: u64,
    /// Minimum accepted payment amount
    pub price: u128,
    /// Accumulate payments in escrow instead of consuming them
    pub balance_locked: bool,
    /// Payment discriminator
    pub payment_kind: PaymentKind,
    /// Token contract, meaningful only for [`PaymentKind::Token`]
    pub payment_contract: Option<Address>,
    /// Address authorized to resolve proposals and receive payments
    pub vault: Address,
    /// Whether new members may subscribe
    pub registration_status: RegistrationStatus,
}

impl DaoPolicy {
    /// Create an open, native-payment policy.
    pub fn new(period: u64, price: u128, vault: impl Into<Address>) -> Self {
        Self {
            period,
            price,
            balance_locked: false,
            payment_kind: PaymentKind::Native,
            payment_contract: None,
            vault: vault.into(),
            registration_status: RegistrationStatus::Open,
        }
    }

    /// Escrow payments instead of consuming them.
    pub fn with_locked_balance(mut self) -> Self {
        self.balance_locked = true;
        self
    }

    /// Pay through an external token contract.
    pub fn with_token(mut self, contract: impl Into<Address>) -> Self {
        self.payment_kind = PaymentKind::Token;
        self.payment_contract = Some(contract.into());
        self
    }

    /// Set the registration status.
    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.registration_status = status;
        self
    }
}

/// Deal-health thresholds a dao registers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealPolicy {
    /// Target replication factor
    pub num_copies: u32,
    /// Max seconds since last repair before repair is due
    pub repair_threshold: u64,
    /// Max seconds since last renewal before renewal is due
    pub renew_threshold: u64,
}

impl DealPolicy {
    pub fn new(num_copies: u32, repair_threshold: u64, renew_threshold: u64) -> Self {
        Self {
            num_copies,
            repair_threshold,
            renew_threshold,
        }
    }
}

/// Everything the registry stores about a dao.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoRecord {
    /// Subscription terms
    pub policy: DaoPolicy,
    /// Deal-health thresholds
    pub deal_policy: DealPolicy,
    /// Logical time of registration
    pub registered_at: u64,
}

/// Last payment slot for a (dao, payer) pair. Overwritten per payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Logical time of the last payment
    pub last_payment_time: u64,
    /// Amount of the last payment
    pub amount_paid: u128,
}

/// Lifecycle of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Awaiting vault resolution
    Pending,
    /// Accepted by the vault
    Approved,
    /// Declined by the vault
    Rejected,
}

/// A request to onboard or act on behalf of a target dao.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Globally unique, strictly increasing id
    pub id: u64,
    /// Dao whose vault resolves this proposal
    pub target_dao: DaoId,
    /// Opaque content reference, e.g. a content identifier
    pub content_ref: String,
    /// Who created the proposal
    pub proposer: Address,
    /// Resolution state
    pub status: ProposalStatus,
    /// Logical time of creation
    pub created_at: u64,
}

/// Externally reported deal facts for a dao. Overwritten per report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealHealthState {
    /// Replicas currently held
    pub copies_held: u32,
    /// Logical time of the last repair
    pub last_repair_time: u64,
    /// Logical time of the last renewal
    pub last_renew_time: u64,
}

/// Due-action signals derived from health state and policy. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealHealth {
    /// Repair threshold reached
    pub repair_due: bool,
    /// Renewal threshold reached
    pub renew_due: bool,
    /// Copies missing to reach the target replication factor
    pub replication_deficit: u32,
}

/// Error types for covenant operations.
#[derive(Debug, thiserror::Error)]
pub enum CovenantError {
    /// Dao already has a policy; re-registration never overwrites
    #[error("Dao already registered: {0}")]
    AlreadyRegistered(DaoId),

    /// No policy registered for this dao
    #[error("Unknown dao: {0}")]
    UnknownDao(DaoId),

    /// No proposal with this id
    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    /// Dao is not accepting new payments
    #[error("Registration closed for dao: {0}")]
    RegistrationClosed(DaoId),

    /// Payment below the dao's price
    #[error("Insufficient payment: {amount} offered, {price} required")]
    InsufficientAmount { amount: u128, price: u128 },

    /// Caller is not the target dao's vault
    #[error("Not authorized: {0}")]
    Unauthorized(Address),

    /// Proposal was already approved or rejected
    #[error("Proposal already resolved: {0}")]
    AlreadyResolved(u64),

    /// Policy shape rejected at registration
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Storage proof failed verification
    #[error("Storage proof rejected for dao: {0}")]
    InvalidProof(DaoId),
}

pub type Result<T> = std::result::Result<T, CovenantError>;
