//! Proposal workflow.
//!
//! Anyone may propose onboarding against a registered dao; only that
//! dao's vault resolves the proposal. Ids come from a single global
//! counter and are assigned atomically with the insert, so the sequence
//! is strictly increasing with no gaps and no reuse.

use std::collections::BTreeMap;

use tracing::info;

use crate::registry::DaoRegistry;
use crate::types::{CovenantError, Proposal, ProposalStatus, Result};

/// Workflow state: the proposal map and the global id counter.
#[derive(Debug, Default)]
pub struct ProposalWorkflow {
    proposals: BTreeMap<u64, Proposal>,
    counter: u64,
}

impl ProposalWorkflow {
    /// Create a proposal targeting a registered dao.
    ///
    /// Open to any proposer; the only check is that the target exists.
    pub fn create(
        &mut self,
        registry: &DaoRegistry,
        target_dao: &str,
        content_ref: &str,
        proposer: &str,
        now: u64,
    ) -> Result<Proposal> {
        registry.get(target_dao)?;

        let id = self.counter + 1;
        let proposal = Proposal {
            id,
            target_dao: target_dao.to_string(),
            content_ref: content_ref.to_string(),
            proposer: proposer.to_string(),
            status: ProposalStatus::Pending,
            created_at: now,
        };
        self.proposals.insert(id, proposal.clone());
        self.counter = id;

        info!(proposal = id, dao = %target_dao, proposer = %proposer, "Created proposal");
        Ok(proposal)
    }

    /// Approve a pending proposal. Vault-only.
    pub fn approve(&mut self, registry: &DaoRegistry, id: u64, approver: &str) -> Result<Proposal> {
        self.resolve(registry, id, approver, ProposalStatus::Approved)
    }

    /// Reject a pending proposal. Vault-only.
    pub fn reject(&mut self, registry: &DaoRegistry, id: u64, approver: &str) -> Result<Proposal> {
        self.resolve(registry, id, approver, ProposalStatus::Rejected)
    }

    fn resolve(
        &mut self,
        registry: &DaoRegistry,
        id: u64,
        approver: &str,
        status: ProposalStatus,
    ) -> Result<Proposal> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(CovenantError::ProposalNotFound(id))?;

        if proposal.status != ProposalStatus::Pending {
            return Err(CovenantError::AlreadyResolved(id));
        }
        if !registry.is_vault(&proposal.target_dao, approver) {
            return Err(CovenantError::Unauthorized(approver.to_string()));
        }

        proposal.status = status;
        info!(proposal = id, status = ?status, approver = %approver, "Resolved proposal");
        Ok(proposal.clone())
    }

    /// Look up a proposal by id.
    pub fn get(&self, id: u64) -> Result<&Proposal> {
        self.proposals
            .get(&id)
            .ok_or(CovenantError::ProposalNotFound(id))
    }
}
