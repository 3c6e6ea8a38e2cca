//! Dao policy registry.
//!
//! Owns the policy pair for every registered dao and the registration
//! order. Registration is write-once: an existing policy is never
//! overwritten.

use std::collections::HashMap;

use tracing::info;

use crate::types::{
    CovenantError, DaoId, DaoPolicy, DaoRecord, DealPolicy, PaymentKind, Result,
};

/// Registry of dao policies, in registration order.
#[derive(Debug, Default)]
pub struct DaoRegistry {
    records: HashMap<DaoId, DaoRecord>,
    order: Vec<DaoId>,
}

impl DaoRegistry {
    /// Register a dao with its policy pair.
    ///
    /// Rejects duplicates with `AlreadyRegistered`, leaving the first
    /// policy untouched, and rejects token policies that name no
    /// payment contract.
    pub fn register(
        &mut self,
        dao: DaoId,
        policy: DaoPolicy,
        deal_policy: DealPolicy,
        now: u64,
    ) -> Result<()> {
        if self.records.contains_key(&dao) {
            return Err(CovenantError::AlreadyRegistered(dao));
        }
        if policy.payment_kind == PaymentKind::Token && policy.payment_contract.is_none() {
            return Err(CovenantError::InvalidPolicy(
                "token payment requires a payment contract".to_string(),
            ));
        }

        info!(dao = %dao, vault = %policy.vault, "Registered dao");

        self.records.insert(
            dao.clone(),
            DaoRecord {
                policy,
                deal_policy,
                registered_at: now,
            },
        );
        self.order.push(dao);
        Ok(())
    }

    /// Look up a dao's record, failing with `UnknownDao` if absent.
    pub fn get(&self, dao: &str) -> Result<&DaoRecord> {
        self.records
            .get(dao)
            .ok_or_else(|| CovenantError::UnknownDao(dao.to_string()))
    }

    /// All registered dao ids, in registration order.
    pub fn list(&self) -> Vec<DaoId> {
        self.order.clone()
    }

    /// Whether `address` is the vault of `dao`. Unknown daos have no vault.
    pub fn is_vault(&self, dao: &str, address: &str) -> bool {
        self.records
            .get(dao)
            .map(|r| r.policy.vault == address)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegistrationStatus;

    fn make_policies(vault: &str) -> (DaoPolicy, DealPolicy) {
        (
            DaoPolicy::new(3600, 100, vault),
            DealPolicy::new(3, 28800, 28800),
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = DaoRegistry::default();
        let (policy, deal_policy) = make_policies("vault-1");

        registry
            .register("dao-1".to_string(), policy, deal_policy, 50)
            .unwrap();

        let record = registry.get("dao-1").unwrap();
        assert_eq!(record.policy.period, 3600);
        assert_eq!(record.registered_at, 50);
        assert_eq!(record.policy.registration_status, RegistrationStatus::Open);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = DaoRegistry::default();
        let (policy, deal_policy) = make_policies("vault-1");

        registry
            .register("dao-1".to_string(), policy.clone(), deal_policy, 0)
            .unwrap();

        let (second, second_deal) = make_policies("vault-2");
        let err = registry
            .register("dao-1".to_string(), second, second_deal, 1)
            .unwrap_err();
        assert!(matches!(err, CovenantError::AlreadyRegistered(_)));

        // First policy survives
        assert_eq!(registry.get("dao-1").unwrap().policy.vault, "vault-1");
    }

    #[test]
    fn test_token_policy_requires_contract() {
        let mut registry = DaoRegistry::default();
        let mut policy = DaoPolicy::new(3600, 100, "vault-1");
        policy.payment_kind = PaymentKind::Token;

        let err = registry
            .register(
                "dao-1".to_string(),
                policy,
                DealPolicy::new(1, 100, 100),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, CovenantError::InvalidPolicy(_)));
        assert!(registry.get("dao-1").is_err());
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = DaoRegistry::default();
        for dao in ["dao-c", "dao-a", "dao-b"] {
            let (policy, deal_policy) = make_policies("vault");
            registry
                .register(dao.to_string(), policy, deal_policy, 0)
                .unwrap();
        }

        assert_eq!(registry.list(), vec!["dao-c", "dao-a", "dao-b"]);
    }

    #[test]
    fn test_is_vault() {
        let mut registry = DaoRegistry::default();
        let (policy, deal_policy) = make_policies("vault-1");
        registry
            .register("dao-1".to_string(), policy, deal_policy, 0)
            .unwrap();

        assert!(registry.is_vault("dao-1", "vault-1"));
        assert!(!registry.is_vault("dao-1", "stranger"));
        assert!(!registry.is_vault("dao-missing", "vault-1"));
    }
}
