//! Integration tests for transactional verification updates.
//!
//! An update either commits and changes both the stored row and the entity,
//! or rolls back and changes neither.

use chrono::{TimeZone, Utc};
use roster_verify::db::{EventRow, MemoryStore, PlayerRow, TeamRow};
use roster_verify::{CompositeKey, RegistryManager, UpdateOutcome, VerificationStatus};
use std::sync::Arc;

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_event(EventRow {
                event_id: "7".to_string(),
                remote_id: "ev-7".to_string(),
                name: "Regional Qualifier".to_string(),
                url: String::new(),
                start_date: Utc.with_ymd_and_hms(2024, 4, 20, 15, 0, 0).unwrap(),
                team_count: 1,
            })
            .with_team(TeamRow {
                event_id: "7".to_string(),
                team_id: "40".to_string(),
                remote_id: "t40".to_string(),
                name: "Falcons".to_string(),
                url: String::new(),
                reg_order: 1,
                dropped: false,
                verification_status: VerificationStatus::Questionable.code(),
                verification_note: "roster pending".to_string(),
            })
            .with_player(PlayerRow {
                event_id: "7".to_string(),
                team_id: "40".to_string(),
                player_id: "400".to_string(),
                remote_id: "p400".to_string(),
                name: "Eve".to_string(),
                url: String::new(),
                dropped: false,
                verification_status: VerificationStatus::Unverified.code(),
                verification_note: String::new(),
            }),
    )
}

fn team_key() -> CompositeKey {
    CompositeKey::team("7", "40").unwrap()
}

fn player_key() -> CompositeKey {
    CompositeKey::player("7", "40", "400").unwrap()
}

#[tokio::test]
async fn test_team_update_commits() {
    let store = seeded_store();
    let manager = RegistryManager::new(store.clone());
    let team = manager.team(&team_key()).await.unwrap().unwrap();

    let outcome = manager
        .update_team_verification(&team, VerificationStatus::Eligible, "ok")
        .await;

    assert_eq!(outcome, UpdateOutcome::Saved);
    assert_eq!(outcome.message(), "Changes saved!");
    assert_eq!(team.verification_status(), VerificationStatus::Eligible);
    assert_eq!(team.verification_note(), "ok");
    assert_eq!(
        store.team_verification(&team_key()),
        Some((VerificationStatus::Eligible.code(), "ok".to_string()))
    );

    // A fresh load sees the committed values
    let reloaded = manager.team(&team_key()).await.unwrap().unwrap();
    assert_eq!(reloaded.verification_status(), VerificationStatus::Eligible);
    assert_eq!(reloaded.verification_note(), "ok");
}

#[tokio::test]
async fn test_team_update_failure_changes_nothing() {
    let store = seeded_store();
    let manager = RegistryManager::new(store.clone());
    let team = manager.team(&team_key()).await.unwrap().unwrap();

    store.set_fail_writes(true);
    let outcome = manager
        .update_team_verification(&team, VerificationStatus::Eligible, "ok")
        .await;

    assert_eq!(outcome, UpdateOutcome::NotSaved);
    assert_eq!(outcome.to_string(), "An error occurred, changes not saved.");
    assert_eq!(team.verification_status(), VerificationStatus::Questionable);
    assert_eq!(team.verification_note(), "roster pending");
    assert_eq!(
        store.team_verification(&team_key()),
        Some((VerificationStatus::Questionable.code(), "roster pending".to_string()))
    );
}

#[tokio::test]
async fn test_player_update_commits() {
    let store = seeded_store();
    let manager = RegistryManager::new(store.clone());
    let eve = manager.player(&player_key()).await.unwrap().unwrap();

    // Inherited from the team until set explicitly
    assert_eq!(eve.verification_status(), VerificationStatus::Questionable);

    let outcome = manager
        .update_player_verification(&eve, VerificationStatus::Ineligible, "transfer window")
        .await;

    assert!(outcome.is_saved());
    assert_eq!(eve.verification_status(), VerificationStatus::Ineligible);
    assert_eq!(eve.verification_note(), "transfer window");
    assert_eq!(
        store.player_verification(&player_key()),
        Some((
            VerificationStatus::Ineligible.code(),
            "transfer window".to_string()
        ))
    );
    assert_eq!(store.calls("write_player_verification").len(), 1);
}

#[tokio::test]
async fn test_player_update_failure_changes_nothing() {
    let store = seeded_store();
    let manager = RegistryManager::new(store.clone());
    let eve = manager.player(&player_key()).await.unwrap().unwrap();

    store.set_fail_writes(true);
    let outcome = manager
        .update_player_verification(&eve, VerificationStatus::Eligible, "cleared")
        .await;

    assert!(!outcome.is_saved());
    assert_eq!(eve.own_verification().status, VerificationStatus::Unverified);
    assert_eq!(eve.verification_note(), "");
    assert_eq!(
        store.player_verification(&player_key()),
        Some((VerificationStatus::Unverified.code(), String::new()))
    );
}

#[tokio::test]
async fn test_failed_update_does_not_block_next_one() {
    let store = seeded_store();
    let manager = RegistryManager::new(store.clone());
    let team = manager.team(&team_key()).await.unwrap().unwrap();

    store.set_fail_writes(true);
    assert!(
        !manager
            .update_team_verification(&team, VerificationStatus::NoData, "")
            .await
            .is_saved()
    );

    store.set_fail_writes(false);
    assert!(
        manager
            .update_team_verification(&team, VerificationStatus::NoData, "")
            .await
            .is_saved()
    );
    assert_eq!(team.verification_status(), VerificationStatus::NoData);
    assert_eq!(team.verification_note(), "");
}
