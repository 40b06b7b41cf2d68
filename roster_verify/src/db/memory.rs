//! In-process `TournamentStore` backed by plain vectors.
//!
//! Matching follows the same projection rule as the SQL predicates, so the
//! registry behaves identically on both stores. Every call is recorded in a
//! query log, and reads or writes can be made to fail on demand.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{StoreError, StoreResult};
use super::rows::{EventRow, KeyRow, PlayerRow, TeamRow};
use super::store::{EventTeamFilter, TournamentStore};
use crate::model::{CompositeKey, KeyShape, VerificationStatus};

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub operation: &'static str,
    pub shape: Option<KeyShape>,
    pub full_ids: Vec<String>,
}

#[derive(Default)]
struct Tables {
    events: Vec<EventRow>,
    teams: Vec<TeamRow>,
    players: Vec<PlayerRow>,
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    log: Mutex<Vec<QueryRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn row_matches(shape: KeyShape, full_ids: &[String], event: &str, team: &str, player: &str) -> bool {
    let projected = shape.project(event, team, player);
    full_ids.iter().any(|id| *id == projected)
}

fn starts_with_ci(name: &str, query: &str) -> bool {
    name.to_lowercase()
        .starts_with(&query.trim().to_lowercase())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, row: EventRow) -> Self {
        lock(&self.tables).events.push(row);
        self
    }

    /// Adds a team registration (`teams` and `eventTeams` together).
    pub fn with_team(self, row: TeamRow) -> Self {
        lock(&self.tables).teams.push(row);
        self
    }

    /// Adds a roster entry (`players` and `rosters` together).
    pub fn with_player(self, row: PlayerRow) -> Self {
        lock(&self.tables).players.push(row);
        self
    }

    /// Makes every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent verification write fail and roll back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All calls recorded so far, oldest first.
    pub fn query_log(&self) -> Vec<QueryRecord> {
        lock(&self.log).clone()
    }

    /// Recorded calls of one operation.
    pub fn calls(&self, operation: &str) -> Vec<QueryRecord> {
        lock(&self.log)
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    pub fn clear_log(&self) {
        lock(&self.log).clear();
    }

    /// Persisted status code and note of one `eventTeams` row.
    pub fn team_verification(&self, key: &CompositeKey) -> Option<(i16, String)> {
        lock(&self.tables)
            .teams
            .iter()
            .find(|t| t.event_id == key.event_id() && t.team_id == key.team_id())
            .map(|t| (t.verification_status, t.verification_note.clone()))
    }

    /// Persisted status code and note of one `rosters` row.
    pub fn player_verification(&self, key: &CompositeKey) -> Option<(i16, String)> {
        lock(&self.tables)
            .players
            .iter()
            .find(|p| {
                p.event_id == key.event_id()
                    && p.team_id == key.team_id()
                    && p.player_id == key.player_id()
            })
            .map(|p| (p.verification_status, p.verification_note.clone()))
    }

    fn record(
        &self,
        operation: &'static str,
        shape: Option<KeyShape>,
        full_ids: &[String],
    ) -> StoreResult<()> {
        lock(&self.log).push(QueryRecord {
            operation,
            shape,
            full_ids: full_ids.to_vec(),
        });

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }

    fn check_write(&self, operation: &'static str, key: &CompositeKey) -> StoreResult<()> {
        lock(&self.log).push(QueryRecord {
            operation,
            shape: Some(key.shape()),
            full_ids: vec![key.full_id().to_string()],
        });

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn expand_keys(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<KeyRow>> {
        self.record("expand_keys", Some(shape), full_ids)?;
        let tables = lock(&self.tables);

        let rows = if shape.player {
            tables
                .players
                .iter()
                .filter(|p| row_matches(shape, full_ids, &p.event_id, &p.team_id, &p.player_id))
                .map(|p| KeyRow {
                    event_id: p.event_id.clone(),
                    team_id: p.team_id.clone(),
                    player_id: p.player_id.clone(),
                })
                .collect()
        } else {
            tables
                .teams
                .iter()
                .filter(|t| row_matches(shape, full_ids, &t.event_id, &t.team_id, ""))
                .map(|t| KeyRow {
                    event_id: t.event_id.clone(),
                    team_id: t.team_id.clone(),
                    player_id: String::new(),
                })
                .collect()
        };
        Ok(rows)
    }

    async fn fetch_events(
        &self,
        shape: KeyShape,
        full_ids: &[String],
    ) -> StoreResult<Vec<EventRow>> {
        self.record("fetch_events", Some(shape), full_ids)?;
        Ok(lock(&self.tables)
            .events
            .iter()
            .filter(|e| row_matches(shape, full_ids, &e.event_id, "", ""))
            .cloned()
            .collect())
    }

    async fn fetch_teams(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<TeamRow>> {
        self.record("fetch_teams", Some(shape), full_ids)?;
        Ok(lock(&self.tables)
            .teams
            .iter()
            .filter(|t| row_matches(shape, full_ids, &t.event_id, &t.team_id, ""))
            .cloned()
            .collect())
    }

    async fn fetch_players(
        &self,
        shape: KeyShape,
        full_ids: &[String],
    ) -> StoreResult<Vec<PlayerRow>> {
        self.record("fetch_players", Some(shape), full_ids)?;
        Ok(lock(&self.tables)
            .players
            .iter()
            .filter(|p| row_matches(shape, full_ids, &p.event_id, &p.team_id, &p.player_id))
            .cloned()
            .collect())
    }

    async fn search_events(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.record("search_events", None, &[query.to_string()])?;
        Ok(lock(&self.tables)
            .events
            .iter()
            .filter(|e| starts_with_ci(&e.name, query))
            .map(|e| KeyRow {
                event_id: e.event_id.clone(),
                team_id: String::new(),
                player_id: String::new(),
            })
            .collect())
    }

    async fn search_teams(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.record("search_teams", None, &[query.to_string()])?;
        Ok(lock(&self.tables)
            .teams
            .iter()
            .filter(|t| starts_with_ci(&t.name, query))
            .map(|t| KeyRow {
                event_id: t.event_id.clone(),
                team_id: t.team_id.clone(),
                player_id: String::new(),
            })
            .collect())
    }

    async fn search_players(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.record("search_players", None, &[query.to_string()])?;
        Ok(lock(&self.tables)
            .players
            .iter()
            .filter(|p| starts_with_ci(&p.name, query))
            .map(|p| KeyRow {
                event_id: p.event_id.clone(),
                team_id: p.team_id.clone(),
                player_id: p.player_id.clone(),
            })
            .collect())
    }

    async fn find_event_teams(
        &self,
        event_id: &str,
        filter: &EventTeamFilter,
    ) -> StoreResult<Vec<KeyRow>> {
        self.record("find_event_teams", None, &[event_id.to_string()])?;
        Ok(lock(&self.tables)
            .teams
            .iter()
            .filter(|t| t.event_id == event_id && starts_with_ci(&t.name, &filter.query))
            .filter(|t| filter.include_dropped || !t.dropped)
            .filter(|t| {
                filter
                    .status
                    .is_none_or(|status| status.code() == t.verification_status)
            })
            .map(|t| KeyRow {
                event_id: t.event_id.clone(),
                team_id: t.team_id.clone(),
                player_id: String::new(),
            })
            .collect())
    }

    async fn write_team_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()> {
        self.check_write("write_team_verification", key)?;
        let mut tables = lock(&self.tables);
        let row = tables
            .teams
            .iter_mut()
            .find(|t| t.event_id == key.event_id() && t.team_id == key.team_id())
            .ok_or_else(|| StoreError::RowNotFound {
                table: "eventTeams",
                key: key.full_id().to_string(),
            })?;

        row.verification_status = status.code();
        row.verification_note = note.to_string();
        Ok(())
    }

    async fn write_player_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()> {
        self.check_write("write_player_verification", key)?;
        let mut tables = lock(&self.tables);
        let row = tables
            .players
            .iter_mut()
            .find(|p| {
                p.event_id == key.event_id()
                    && p.team_id == key.team_id()
                    && p.player_id == key.player_id()
            })
            .ok_or_else(|| StoreError::RowNotFound {
                table: "rosters",
                key: key.full_id().to_string(),
            })?;

        row.verification_status = status.code();
        row.verification_note = note.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn roster_row(event: &str, team: &str, player: &str) -> PlayerRow {
        PlayerRow {
            event_id: event.to_string(),
            team_id: team.to_string(),
            player_id: player.to_string(),
            remote_id: String::new(),
            name: format!("Player {player}"),
            url: String::new(),
            dropped: false,
            verification_status: 0,
            verification_note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_expand_player_wildcard() {
        let store = MemoryStore::new()
            .with_player(roster_row("5", "10", "9"))
            .with_player(roster_row("6", "11", "9"))
            .with_player(roster_row("6", "11", "8"));

        let rows = store
            .expand_keys(KeyShape::new(false, false, true), &["::9".to_string()])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(store.calls("expand_keys").len(), 1);
    }

    #[tokio::test]
    async fn test_fail_reads() {
        let store = MemoryStore::new().with_event(EventRow {
            event_id: "5".to_string(),
            remote_id: String::new(),
            name: "Open".to_string(),
            url: String::new(),
            start_date: Utc::now(),
            team_count: 0,
        });
        store.set_fail_reads(true);

        let result = store.fetch_events(KeyShape::EVENT, &["5::".to_string()]).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_write_missing_row() {
        let store = MemoryStore::new();
        let key = CompositeKey::team("5", "10").unwrap();
        let result = store
            .write_team_verification(&key, VerificationStatus::Eligible, "ok")
            .await;
        assert!(matches!(result, Err(StoreError::RowNotFound { .. })));
    }
}
