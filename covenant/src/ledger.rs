//! Subscription payment ledger.
//!
//! One payment slot per (dao, payer) pair, overwritten per payment.
//! Validity is derived from elapsed time against the dao's period, never
//! stored: a slot written at `t` covers `now ∈ [t, t + period)`.

use std::collections::HashMap;

use tracing::info;

use crate::registry::DaoRegistry;
use crate::types::{
    Address, CovenantError, DaoId, PaymentRecord, RegistrationStatus, Result,
};

/// Ledger of last-payment slots and per-dao escrow totals.
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    payments: HashMap<(DaoId, Address), PaymentRecord>,
    escrow: HashMap<DaoId, u128>,
}

impl SubscriptionLedger {
    /// Record a payment, overwriting the payer's slot.
    ///
    /// Checks, in order: the dao exists, its registration is open, and
    /// the amount meets the dao's price. When the policy locks balances
    /// the amount accumulates into the dao's escrow total; withdrawal is
    /// the vault's concern, outside this ledger.
    pub fn record_payment(
        &mut self,
        registry: &DaoRegistry,
        dao: &str,
        payer: &str,
        amount: u128,
        now: u64,
    ) -> Result<PaymentRecord> {
        let record = registry.get(dao)?;
        if record.policy.registration_status == RegistrationStatus::Closed {
            return Err(CovenantError::RegistrationClosed(dao.to_string()));
        }
        if amount < record.policy.price {
            return Err(CovenantError::InsufficientAmount {
                amount,
                price: record.policy.price,
            });
        }

        let payment = PaymentRecord {
            last_payment_time: now,
            amount_paid: amount,
        };
        self.payments
            .insert((dao.to_string(), payer.to_string()), payment);

        if record.policy.balance_locked {
            let total = self.escrow.entry(dao.to_string()).or_default();
            *total = total.saturating_add(amount);
        }

        info!(dao = %dao, payer = %payer, amount = %amount, "Recorded payment");
        Ok(payment)
    }

    /// Whether the payer's last payment still covers the dao's period.
    ///
    /// Total: unknown daos and payers are simply invalid, never errors.
    /// The window is half-open: a payment at `t` with period `p` is
    /// valid strictly below `t + p` and invalid at the boundary.
    pub fn is_valid(&self, registry: &DaoRegistry, dao: &str, payer: &str, now: u64) -> bool {
        let record = match registry.get(dao) {
            Ok(record) => record,
            Err(_) => return false,
        };
        match self.payments.get(&(dao.to_string(), payer.to_string())) {
            Some(payment) => {
                now.saturating_sub(payment.last_payment_time) < record.policy.period
            }
            None => false,
        }
    }

    /// The payer's last payment slot, if any.
    pub fn payment(&self, dao: &str, payer: &str) -> Option<&PaymentRecord> {
        self.payments.get(&(dao.to_string(), payer.to_string()))
    }

    /// Accumulated locked total for a dao. Zero for unknown daos.
    pub fn escrow_balance(&self, dao: &str) -> u128 {
        self.escrow.get(dao).copied().unwrap_or(0)
    }
}
