//! Verification updates.
//!
//! Each update is one transaction in the store. The in-memory entity is only
//! changed after the transaction committed, so a failed update leaves both the
//! database and the entity exactly as they were.

use std::fmt;
use std::sync::Arc;

use crate::db::TournamentStore;
use crate::model::{Player, Team, VerificationStatus};

/// Result of a verification update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Committed and applied to the entity
    Saved,
    /// Rolled back; nothing changed
    NotSaved,
}

impl UpdateOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, UpdateOutcome::Saved)
    }

    /// User-facing confirmation text
    pub fn message(&self) -> &'static str {
        match self {
            UpdateOutcome::Saved => "Changes saved!",
            UpdateOutcome::NotSaved => "An error occurred, changes not saved.",
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Applies verification changes to teams and players
#[derive(Clone)]
pub struct TransactionalUpdater {
    store: Arc<dyn TournamentStore>,
}

impl TransactionalUpdater {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Sets the status and note of a team's registration.
    pub async fn update_team_verification(
        &self,
        team: &Team,
        status: VerificationStatus,
        note: &str,
    ) -> UpdateOutcome {
        match self
            .store
            .write_team_verification(team.key(), status, note)
            .await
        {
            Ok(()) => {
                team.set_verification(status, note);
                log::info!("Team {} verification set to {}", team.key(), status);
                UpdateOutcome::Saved
            }
            Err(e) => {
                log::warn!("Rolled back verification of team {}: {}", team.key(), e);
                UpdateOutcome::NotSaved
            }
        }
    }

    /// Sets the status and note of a player's roster entry.
    pub async fn update_player_verification(
        &self,
        player: &Player,
        status: VerificationStatus,
        note: &str,
    ) -> UpdateOutcome {
        match self
            .store
            .write_player_verification(player.key(), status, note)
            .await
        {
            Ok(()) => {
                player.set_verification(status, note);
                log::info!("Player {} verification set to {}", player.key(), status);
                UpdateOutcome::Saved
            }
            Err(e) => {
                log::warn!("Rolled back verification of player {}: {}", player.key(), e);
                UpdateOutcome::NotSaved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert!(UpdateOutcome::Saved.is_saved());
        assert!(!UpdateOutcome::NotSaved.is_saved());
        assert_eq!(UpdateOutcome::Saved.to_string(), "Changes saved!");
        assert_eq!(
            UpdateOutcome::NotSaved.message(),
            "An error occurred, changes not saved."
        );
    }
}
