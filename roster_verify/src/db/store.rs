//! Store trait for testability and dependency injection.
//!
//! The registry talks to storage only through `TournamentStore`. Every batched
//! lookup takes the shape of the keys in the batch plus their full identifiers;
//! a row matches when its identifier, projected onto that shape, equals one of
//! the identifiers (see `KeyShape::project`).

use async_trait::async_trait;

use super::errors::StoreResult;
use super::rows::{EventRow, KeyRow, PlayerRow, TeamRow};
use crate::model::{CompositeKey, KeyShape, VerificationStatus};

/// Filter for listing the teams of one event
#[derive(Debug, Clone, Default)]
pub struct EventTeamFilter {
    /// Team name prefix, case-insensitive
    pub query: String,
    /// Only teams with exactly this status
    pub status: Option<VerificationStatus>,
    /// Include teams that dropped out
    pub include_dropped: bool,
}

/// Normalizes a user query into a lowercase `LIKE` prefix pattern.
pub fn prefix_pattern(query: &str) -> String {
    format!("{}%", query.trim().to_lowercase())
}

/// Trait for tournament store operations
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Primary keys addressed by a batch of wildcard keys.
    ///
    /// Shapes containing a player segment are resolved against `rosters` and
    /// yield event/team/player triples; all others against `eventTeams`,
    /// yielding event/team pairs.
    async fn expand_keys(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<KeyRow>>;

    /// `events` rows matching the batch
    async fn fetch_events(&self, shape: KeyShape, full_ids: &[String])
    -> StoreResult<Vec<EventRow>>;

    /// `eventTeams ⋈ teams` rows matching the batch
    async fn fetch_teams(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<TeamRow>>;

    /// `rosters ⋈ players` rows matching the batch
    async fn fetch_players(
        &self,
        shape: KeyShape,
        full_ids: &[String],
    ) -> StoreResult<Vec<PlayerRow>>;

    /// Events whose name starts with `query`
    async fn search_events(&self, query: &str) -> StoreResult<Vec<KeyRow>>;

    /// Event registrations whose team name starts with `query`
    async fn search_teams(&self, query: &str) -> StoreResult<Vec<KeyRow>>;

    /// Roster entries whose player name starts with `query`
    async fn search_players(&self, query: &str) -> StoreResult<Vec<KeyRow>>;

    /// Teams registered for one event, filtered
    async fn find_event_teams(
        &self,
        event_id: &str,
        filter: &EventTeamFilter,
    ) -> StoreResult<Vec<KeyRow>>;

    /// Sets status and note of one `eventTeams` row inside its own transaction.
    ///
    /// Either the row is updated and committed, or the transaction is rolled
    /// back and an error returned. Matching no row counts as a failure.
    async fn write_team_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()>;

    /// Sets status and note of one `rosters` row, same contract as
    /// `write_team_verification`.
    async fn write_player_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("  Spring Open "), "spring open%");
        assert_eq!(prefix_pattern(""), "%");
    }
}
