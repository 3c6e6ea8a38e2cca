//! The covenant facade.
//!
//! [`Covenant`] is the single serialization point for the whole core:
//! one lock owns all four component states, so every mutation — a
//! registration, a payment overwrite, a proposal counter increment — is
//! atomic with respect to all others, while read queries share the lock
//! concurrently. Change records are queued only after the mutation
//! commits, and their delivery can never fail or roll back a call.
//!
//! Logical time is sampled once per call from the injected [`Clock`];
//! content addressing and proof checking come from injected `signet`
//! capabilities.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;

use signet::{ContentAddresser, DigestVerifier, ProofVerifier, Sha256Addresser, StorageProof};

use crate::clock::Clock;
use crate::config::CovenantConfig;
use crate::deals::DealStatusTracker;
use crate::ledger::SubscriptionLedger;
use crate::projection::{
    spawn_delivery_task, ChangeKind, ChangeRecord, ProjectionQueue, ProjectionSink,
};
use crate::proposals::ProposalWorkflow;
use crate::registry::DaoRegistry;
use crate::types::{
    DaoId, DaoPolicy, DealHealth, DealHealthState, DealPolicy, PaymentRecord, Proposal, Result,
};

/// All component state behind the single write lock.
#[derive(Default)]
struct CoreState {
    registry: DaoRegistry,
    ledger: SubscriptionLedger,
    proposals: ProposalWorkflow,
    deals: DealStatusTracker,
}

/// The subscription core.
pub struct Covenant {
    state: RwLock<CoreState>,
    clock: Arc<dyn Clock>,
    addresser: Arc<dyn ContentAddresser>,
    verifier: Arc<dyn ProofVerifier>,
    config: CovenantConfig,
    projection: ProjectionQueue,
}

impl Covenant {
    /// Create a covenant core delivering change records to `sink`.
    ///
    /// Spawns the delivery task, so this must run inside a tokio
    /// runtime. Content addressing and proof checking default to the
    /// SHA2-256 implementations.
    pub fn new(config: CovenantConfig, clock: Arc<dyn Clock>, sink: Arc<dyn ProjectionSink>) -> Self {
        let (projection, rx) = ProjectionQueue::new();
        spawn_delivery_task(rx, sink);

        Self {
            state: RwLock::new(CoreState::default()),
            clock,
            addresser: Arc::new(Sha256Addresser),
            verifier: Arc::new(DigestVerifier),
            config,
            projection,
        }
    }

    /// Replace the content addresser.
    pub fn with_addresser(mut self, addresser: Arc<dyn ContentAddresser>) -> Self {
        self.addresser = addresser;
        self
    }

    /// Replace the proof verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    fn emit(&self, record: ChangeRecord) {
        if self.config.projection.enabled {
            self.projection.push(record);
        }
    }

    /// Register a dao with its policy pair and seed its deal health.
    pub async fn register_dao(
        &self,
        dao: impl Into<DaoId>,
        policy: DaoPolicy,
        deal_policy: DealPolicy,
    ) -> Result<()> {
        let dao = dao.into();
        let now = self.clock.now();

        let record = {
            let mut guard = self.state.write().await;
            guard
                .registry
                .register(dao.clone(), policy.clone(), deal_policy, now)?;
            guard.deals.seed(dao.clone(), now);

            ChangeRecord::new(ChangeKind::DaoRegistered, dao, now).with_payload(json!({
                "policy": policy,
                "deal_policy": deal_policy,
            }))
        };
        self.emit(record);
        Ok(())
    }

    /// Record a payment from `payer` to `dao`.
    pub async fn record_payment(
        &self,
        dao: &str,
        payer: &str,
        amount: u128,
    ) -> Result<PaymentRecord> {
        let now = self.clock.now();

        let (payment, record) = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let payment = state
                .ledger
                .record_payment(&state.registry, dao, payer, amount, now)?;
            let period = state.registry.get(dao)?.policy.period;

            let record = ChangeRecord::new(ChangeKind::PaymentRecorded, dao, now).with_payload(
                json!({
                    "payer": payer,
                    "amount": amount.to_string(),
                    "valid_until": now.saturating_add(period),
                }),
            );
            (payment, record)
        };
        self.emit(record);
        Ok(payment)
    }

    /// Create a proposal targeting `dao`. Open to any proposer.
    pub async fn create_proposal(
        &self,
        dao: &str,
        content_ref: &str,
        proposer: &str,
    ) -> Result<Proposal> {
        let now = self.clock.now();
        let cid = self.addresser.encode(content_ref.as_bytes());

        let (proposal, record) = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let proposal = state
                .proposals
                .create(&state.registry, dao, content_ref, proposer, now)?;

            let record = ChangeRecord::new(ChangeKind::ProposalCreated, dao, now).with_payload(
                json!({
                    "proposal": proposal.id,
                    "proposer": proposer,
                    "content_ref": content_ref,
                    "cid": cid,
                }),
            );
            (proposal, record)
        };
        self.emit(record);
        Ok(proposal)
    }

    /// Approve a pending proposal. Only the target dao's vault may.
    pub async fn approve_proposal(&self, id: u64, approver: &str) -> Result<Proposal> {
        self.resolve_proposal(id, approver, true).await
    }

    /// Reject a pending proposal. Only the target dao's vault may.
    pub async fn reject_proposal(&self, id: u64, approver: &str) -> Result<Proposal> {
        self.resolve_proposal(id, approver, false).await
    }

    async fn resolve_proposal(&self, id: u64, approver: &str, approve: bool) -> Result<Proposal> {
        let now = self.clock.now();

        let (proposal, record) = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let proposal = if approve {
                state.proposals.approve(&state.registry, id, approver)?
            } else {
                state.proposals.reject(&state.registry, id, approver)?
            };

            let record = ChangeRecord::new(ChangeKind::ProposalResolved, proposal.target_dao.clone(), now)
                .with_payload(json!({
                    "proposal": proposal.id,
                    "status": proposal.status,
                    "resolver": approver,
                }));
            (proposal, record)
        };
        self.emit(record);
        Ok(proposal)
    }

    /// Overwrite a dao's deal-health state from an external report.
    pub async fn report_deal_health(
        &self,
        dao: &str,
        state: DealHealthState,
        reporter: &str,
        proof: Option<StorageProof>,
    ) -> Result<()> {
        let now = self.clock.now();

        let record = {
            let mut guard = self.state.write().await;
            let core = &mut *guard;
            core.deals.report(
                &core.registry,
                dao,
                state,
                reporter,
                proof.as_ref(),
                self.verifier.as_ref(),
                self.config.vault_only_reports,
            )?;

            ChangeRecord::new(ChangeKind::DealHealthUpdated, dao, now).with_payload(json!({
                "copies_held": state.copies_held,
                "last_repair_time": state.last_repair_time,
                "last_renew_time": state.last_renew_time,
                "reporter": reporter,
            }))
        };
        self.emit(record);
        Ok(())
    }

    /// Whether `payer` currently holds a valid subscription to `dao`.
    pub async fn is_valid(&self, dao: &str, payer: &str) -> bool {
        let now = self.clock.now();
        let guard = self.state.read().await;
        guard.ledger.is_valid(&guard.registry, dao, payer, now)
    }

    /// Due-action signals for a dao at the current logical time.
    pub async fn evaluate(&self, dao: &str) -> Result<DealHealth> {
        let now = self.clock.now();
        let guard = self.state.read().await;
        guard.deals.evaluate(&guard.registry, dao, now)
    }

    /// All registered dao ids, in registration order.
    pub async fn list_daos(&self) -> Vec<DaoId> {
        self.state.read().await.registry.list()
    }

    /// A dao's policy pair.
    pub async fn get_policy(&self, dao: &str) -> Result<(DaoPolicy, DealPolicy)> {
        let guard = self.state.read().await;
        let record = guard.registry.get(dao)?;
        Ok((record.policy.clone(), record.deal_policy))
    }

    /// Look up a proposal by id.
    pub async fn proposal(&self, id: u64) -> Result<Proposal> {
        Ok(self.state.read().await.proposals.get(id)?.clone())
    }

    /// A dao's raw deal-health state.
    pub async fn deal_health(&self, dao: &str) -> Result<DealHealthState> {
        let guard = self.state.read().await;
        guard.registry.get(dao)?;
        guard
            .deals
            .get(dao)
            .copied()
            .ok_or_else(|| crate::types::CovenantError::UnknownDao(dao.to_string()))
    }

    /// A dao's accumulated escrow total. Zero when nothing is locked.
    pub async fn escrow_balance(&self, dao: &str) -> u128 {
        self.state.read().await.ledger.escrow_balance(dao)
    }

    /// Whether `address` is the vault of `dao`.
    pub async fn is_vault(&self, dao: &str, address: &str) -> bool {
        self.state.read().await.registry.is_vault(dao, address)
    }
}
