//! Deal-health tracking.
//!
//! Holds the externally reported deal facts per dao and evaluates them
//! against the dao's thresholds. Due-action signals are derived on each
//! evaluation, never stored, so a threshold change at registration time
//! is the only policy the tracker ever consults.

use std::collections::HashMap;

use signet::{ProofVerifier, StorageProof};
use tracing::info;

use crate::registry::DaoRegistry;
use crate::types::{CovenantError, DaoId, DealHealth, DealHealthState, Result};

/// Tracker of per-dao deal-health state.
#[derive(Debug, Default)]
pub struct DealStatusTracker {
    health: HashMap<DaoId, DealHealthState>,
}

impl DealStatusTracker {
    /// Seed a freshly registered dao with zero copies and both times at
    /// the registration timestamp, so evaluation is defined immediately.
    pub fn seed(&mut self, dao: DaoId, now: u64) {
        self.health.entry(dao).or_insert(DealHealthState {
            copies_held: 0,
            last_repair_time: now,
            last_renew_time: now,
        });
    }

    /// Overwrite a dao's health state from an external report.
    ///
    /// The reporting channel is an open oracle unless `vault_only` is
    /// set; a report carrying a proof is accepted only if the proof
    /// verifies. A rejected report leaves the previous state intact.
    #[allow(clippy::too_many_arguments)]
    pub fn report(
        &mut self,
        registry: &DaoRegistry,
        dao: &str,
        state: DealHealthState,
        reporter: &str,
        proof: Option<&StorageProof>,
        verifier: &dyn ProofVerifier,
        vault_only: bool,
    ) -> Result<()> {
        registry.get(dao)?;
        if vault_only && !registry.is_vault(dao, reporter) {
            return Err(CovenantError::Unauthorized(reporter.to_string()));
        }
        if let Some(proof) = proof {
            if !verifier.verify(proof) {
                return Err(CovenantError::InvalidProof(dao.to_string()));
            }
        }

        self.health.insert(dao.to_string(), state);
        info!(
            dao = %dao,
            reporter = %reporter,
            copies = state.copies_held,
            "Updated deal health"
        );
        Ok(())
    }

    /// Derive due-action signals for a dao at `now`.
    ///
    /// Thresholds are inclusive: repair is due the instant the elapsed
    /// time reaches the threshold.
    pub fn evaluate(&self, registry: &DaoRegistry, dao: &str, now: u64) -> Result<DealHealth> {
        let record = registry.get(dao)?;
        let state = self
            .health
            .get(dao)
            .ok_or_else(|| CovenantError::UnknownDao(dao.to_string()))?;
        let policy = &record.deal_policy;

        Ok(DealHealth {
            repair_due: now.saturating_sub(state.last_repair_time) >= policy.repair_threshold,
            renew_due: now.saturating_sub(state.last_renew_time) >= policy.renew_threshold,
            replication_deficit: policy.num_copies.saturating_sub(state.copies_held),
        })
    }

    /// Raw health state for a dao, if tracked.
    pub fn get(&self, dao: &str) -> Option<&DealHealthState> {
        self.health.get(dao)
    }
}
