//! Proposal workflow integration tests

use std::sync::Arc;

use covenant::types::{CovenantError, DaoPolicy, DealPolicy, ProposalStatus};
use covenant::{Covenant, CovenantConfig, ManualClock, MemorySink};

async fn make_covenant_with_daos(daos: &[(&str, &str)]) -> Covenant {
    let covenant = Covenant::new(
        CovenantConfig::default(),
        Arc::new(ManualClock::new(0)),
        Arc::new(MemorySink::new()),
    );
    for (dao, vault) in daos {
        covenant
            .register_dao(
                *dao,
                DaoPolicy::new(3600, 100, *vault),
                DealPolicy::new(1, 100, 100),
            )
            .await
            .unwrap();
    }
    covenant
}

#[tokio::test]
async fn test_proposal_requires_registered_target() {
    let covenant = make_covenant_with_daos(&[("dao-1", "vault-1")]).await;

    let err = covenant
        .create_proposal("dao-missing", "bafy-content", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, CovenantError::UnknownDao(_)));
}

#[tokio::test]
async fn test_ids_are_global_and_gapless() {
    let covenant =
        make_covenant_with_daos(&[("dao-1", "vault-1"), ("dao-2", "vault-2")]).await;

    // Ids are one counter across daos and proposers, not per-dao
    let creations = [
        ("dao-1", "alice"),
        ("dao-2", "bob"),
        ("dao-1", "bob"),
        ("dao-2", "alice"),
        ("dao-1", "carol"),
    ];
    for (i, (dao, proposer)) in creations.iter().enumerate() {
        let proposal = covenant
            .create_proposal(dao, "bafy-content", proposer)
            .await
            .unwrap();
        assert_eq!(proposal.id, i as u64 + 1);
    }

    // A failed creation consumes no id
    let _ = covenant
        .create_proposal("dao-missing", "bafy-content", "alice")
        .await;
    let proposal = covenant
        .create_proposal("dao-1", "bafy-content", "dave")
        .await
        .unwrap();
    assert_eq!(proposal.id, creations.len() as u64 + 1);
}

#[tokio::test]
async fn test_authorization_boundary() {
    let covenant =
        make_covenant_with_daos(&[("dao-1", "vault-1"), ("dao-2", "vault-2")]).await;

    let proposal = covenant
        .create_proposal("dao-1", "bafy-content", "alice")
        .await
        .unwrap();
    assert_eq!(proposal.status, ProposalStatus::Pending);

    // Neither the proposer nor another dao's vault may resolve
    for intruder in ["alice", "vault-2"] {
        let err = covenant
            .approve_proposal(proposal.id, intruder)
            .await
            .unwrap_err();
        assert!(matches!(err, CovenantError::Unauthorized(_)));
    }
    assert_eq!(
        covenant.proposal(proposal.id).await.unwrap().status,
        ProposalStatus::Pending
    );

    let approved = covenant
        .approve_proposal(proposal.id, "vault-1")
        .await
        .unwrap();
    assert_eq!(approved.status, ProposalStatus::Approved);

    // Replay by the rightful vault reads as already resolved
    let err = covenant
        .approve_proposal(proposal.id, "vault-1")
        .await
        .unwrap_err();
    assert!(matches!(err, CovenantError::AlreadyResolved(_)));
}

#[tokio::test]
async fn test_rejection_is_final() {
    let covenant = make_covenant_with_daos(&[("dao-1", "vault-1")]).await;

    let proposal = covenant
        .create_proposal("dao-1", "bafy-content", "alice")
        .await
        .unwrap();
    let rejected = covenant
        .reject_proposal(proposal.id, "vault-1")
        .await
        .unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);

    let err = covenant
        .approve_proposal(proposal.id, "vault-1")
        .await
        .unwrap_err();
    assert!(matches!(err, CovenantError::AlreadyResolved(_)));
}

#[tokio::test]
async fn test_proposal_lookup() {
    let covenant = make_covenant_with_daos(&[("dao-1", "vault-1")]).await;

    let created = covenant
        .create_proposal("dao-1", "bafy-manifest", "alice")
        .await
        .unwrap();

    let found = covenant.proposal(created.id).await.unwrap();
    assert_eq!(found.target_dao, "dao-1");
    assert_eq!(found.content_ref, "bafy-manifest");
    assert_eq!(found.proposer, "alice");

    let err = covenant.proposal(42).await.unwrap_err();
    assert!(matches!(err, CovenantError::ProposalNotFound(42)));
}
