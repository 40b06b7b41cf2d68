//! Hierarchical batch loading of events, teams and players.
//!
//! Each level loads its parents first, through the loader for the level
//! above, with one call per batch covering the distinct parent keys. Rows are
//! then joined to their parents by full identifier, so every entity comes back
//! with a complete ancestor chain and parent rows are fetched once per batch
//! no matter how many children share them.

use chrono::{DateTime, Months, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{RegistryError, RegistryResult};
use super::expander::{KeyExpander, distinct, full_ids};
use crate::db::TournamentStore;
use crate::model::{CompositeKey, Event, KeyResult, KeyShape, Level, Player, Team};

/// Entities keyed by full identifier
pub type EntityMap<T> = HashMap<String, Arc<T>>;

/// How far back `recent_participation_for` looks.
pub const RECENT_PARTICIPATION_MONTHS: u32 = 3;

/// Batch loader over a `TournamentStore`
#[derive(Clone)]
pub struct HierarchicalLoader {
    store: Arc<dyn TournamentStore>,
    expander: KeyExpander,
}

impl HierarchicalLoader {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            expander: KeyExpander::new(store.clone()),
            store,
        }
    }

    /// Expands `keys` and coarsens any key finer than `level` to it.
    ///
    /// Keys coarser than `level` stay as they are and act as wildcards over
    /// that level (an event key loads every team of the event).
    async fn primary_keys_at(
        &self,
        keys: Vec<CompositeKey>,
        level: Level,
    ) -> RegistryResult<Vec<CompositeKey>> {
        let keys = self.expander.expand(keys).await?;
        if level == Level::Player {
            return Ok(keys);
        }

        let elevated = keys
            .iter()
            .map(|k| k.elevate(level))
            .collect::<KeyResult<Vec<_>>>()?;
        Ok(distinct(elevated))
    }

    /// Distinct parent keys of a primary batch.
    fn parent_keys(keys: &[CompositeKey], parent: Level) -> KeyResult<Vec<CompositeKey>> {
        let parents = keys
            .iter()
            .map(|k| k.elevate(parent))
            .collect::<KeyResult<Vec<_>>>()?;
        Ok(distinct(parents))
    }

    /// Loads events addressed by `keys`.
    ///
    /// # Errors
    ///
    /// * `RegistryError::MixedKeyShape` - the batch mixes shapes
    /// * `RegistryError::Storage` - any query failed; no partial result
    pub async fn load_events(&self, keys: Vec<CompositeKey>) -> RegistryResult<EntityMap<Event>> {
        let keys = self.primary_keys_at(keys, Level::Event).await?;
        let Some(shape) = keys.first().map(CompositeKey::shape) else {
            return Ok(HashMap::new());
        };

        let rows = self.store.fetch_events(shape, &full_ids(&keys)).await?;
        debug!("Loaded {} event row(s) for {} key(s)", rows.len(), keys.len());

        rows.into_iter()
            .map(|row| -> RegistryResult<(String, Arc<Event>)> {
                let event = Event::from_row(row)?;
                Ok((event.key().full_id().to_string(), Arc::new(event)))
            })
            .collect()
    }

    /// Loads teams addressed by `keys`, each with its event.
    ///
    /// # Errors
    ///
    /// * `RegistryError::MixedKeyShape` - the batch mixes shapes
    /// * `RegistryError::Storage` - any query failed; no partial result
    /// * `RegistryError::InternalConsistency` - a team row has no loaded event
    pub async fn load_teams(&self, keys: Vec<CompositeKey>) -> RegistryResult<EntityMap<Team>> {
        let keys = self.primary_keys_at(keys, Level::Team).await?;
        let Some(shape) = keys.first().map(CompositeKey::shape) else {
            return Ok(HashMap::new());
        };

        let events = self
            .load_events(Self::parent_keys(&keys, Level::Event)?)
            .await?;
        let rows = self.store.fetch_teams(shape, &full_ids(&keys)).await?;
        debug!("Loaded {} team row(s) for {} key(s)", rows.len(), keys.len());

        rows.into_iter()
            .map(|row| -> RegistryResult<(String, Arc<Team>)> {
                let parent_id = KeyShape::EVENT.project(&row.event_id, "", "");
                let event = events.get(&parent_id).cloned().ok_or_else(|| {
                    RegistryError::InternalConsistency(format!(
                        "team {}:{} has no loaded event {parent_id}",
                        row.event_id, row.team_id
                    ))
                })?;
                let team = Team::from_row(row, event)?;
                Ok((team.key().full_id().to_string(), Arc::new(team)))
            })
            .collect()
    }

    /// Loads players addressed by `keys`, each with its team and event.
    ///
    /// # Errors
    ///
    /// * `RegistryError::MixedKeyShape` - the batch mixes shapes
    /// * `RegistryError::Storage` - any query failed; no partial result
    /// * `RegistryError::InternalConsistency` - a roster row has no loaded team
    pub async fn load_players(&self, keys: Vec<CompositeKey>) -> RegistryResult<EntityMap<Player>> {
        let keys = self.primary_keys_at(keys, Level::Player).await?;
        let Some(shape) = keys.first().map(CompositeKey::shape) else {
            return Ok(HashMap::new());
        };

        let teams = self
            .load_teams(Self::parent_keys(&keys, Level::Team)?)
            .await?;
        let rows = self.store.fetch_players(shape, &full_ids(&keys)).await?;
        debug!("Loaded {} roster row(s) for {} key(s)", rows.len(), keys.len());

        rows.into_iter()
            .map(|row| -> RegistryResult<(String, Arc<Player>)> {
                let parent_id = KeyShape::TEAM.project(&row.event_id, &row.team_id, "");
                let team = teams.get(&parent_id).cloned().ok_or_else(|| {
                    RegistryError::InternalConsistency(format!(
                        "player {}:{}:{} has no loaded team {parent_id}",
                        row.event_id, row.team_id, row.player_id
                    ))
                })?;
                let player = Player::from_row(row, team)?;
                Ok((player.key().full_id().to_string(), Arc::new(player)))
            })
            .collect()
    }

    /// Loads every roster entry of `teams` and appends each player to the
    /// matching team of the batch.
    ///
    /// Players are appended in listing order. Rosters are append-only: calling
    /// this twice for the same team instance lists its players twice.
    ///
    /// # Errors
    ///
    /// * `RegistryError::InternalConsistency` - a player's team is not in `teams`
    pub async fn populate_rosters(&self, teams: &[Arc<Team>]) -> RegistryResult<()> {
        let keys = teams.iter().map(|t| t.key().clone()).collect();
        let mut players: Vec<Arc<Player>> = self.load_players(keys).await?.into_values().collect();
        players.sort_by(|a, b| a.listing_order(b));

        let mut by_id: HashMap<&str, &Arc<Team>> = HashMap::new();
        for team in teams {
            by_id.entry(team.key().full_id()).or_insert(team);
        }

        for player in players {
            let team_id = player.team().key().full_id();
            let team = by_id.get(team_id).ok_or_else(|| {
                RegistryError::InternalConsistency(format!(
                    "player {} belongs to team {team_id}, which is not in the batch",
                    player.key()
                ))
            })?;
            team.add_to_roster(player.clone());
        }

        Ok(())
    }

    /// Other event/team entries of the same player that started within the
    /// last three months.
    pub async fn recent_participation_for(&self, player: &Player) -> RegistryResult<Vec<Arc<Player>>> {
        self.recent_participation_at(player, Utc::now()).await
    }

    /// `recent_participation_for` against a fixed clock.
    pub async fn recent_participation_at(
        &self,
        player: &Player,
        now: DateTime<Utc>,
    ) -> RegistryResult<Vec<Arc<Player>>> {
        let cutoff = now
            .checked_sub_months(Months::new(RECENT_PARTICIPATION_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let everywhere = CompositeKey::new(None, None, player.id())?;
        let mut recent: Vec<Arc<Player>> = self
            .load_players(vec![everywhere])
            .await?
            .into_values()
            .filter(|p| p.team().event().start() > cutoff)
            .filter(|p| p.key() != player.key())
            .collect();

        recent.sort_by(|a, b| a.listing_order(b));
        Ok(recent)
    }
}
