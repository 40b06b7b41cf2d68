//! Registry manager: the query and update surface used by front ends.

use std::cmp::Ordering;
use std::sync::Arc;

use super::errors::RegistryResult;
use super::expander::key_from_row;
use super::loader::{EntityMap, HierarchicalLoader};
use super::updater::{TransactionalUpdater, UpdateOutcome};
use crate::db::{EventTeamFilter, KeyRow, TournamentStore};
use crate::model::{
    CompositeKey, Event, KeyError, KeyResult, Level, Player, Team, VerificationStatus,
};
use crate::remote::{RemoteConnector, StubConnector};

fn keys_from_rows(rows: &[KeyRow]) -> KeyResult<Vec<CompositeKey>> {
    rows.iter().map(key_from_row).collect()
}

fn sorted<T>(map: EntityMap<T>, order: impl Fn(&T, &T) -> Ordering) -> Vec<Arc<T>> {
    let mut entities: Vec<Arc<T>> = map.into_values().collect();
    entities.sort_by(|a, b| order(a.as_ref(), b.as_ref()));
    entities
}

fn require_level(key: &CompositeKey, level: Level) -> KeyResult<()> {
    if key.shape().level() == Some(level) {
        return Ok(());
    }
    Err(KeyError::InvalidArgument(format!("{key} is not a {level} key")))
}

/// Registry manager
#[derive(Clone)]
pub struct RegistryManager {
    store: Arc<dyn TournamentStore>,
    loader: HierarchicalLoader,
    updater: TransactionalUpdater,
    remote: Arc<dyn RemoteConnector>,
}

impl RegistryManager {
    /// Create a new registry manager
    ///
    /// # Arguments
    ///
    /// * `store` - Storage backend shared by loading and updates
    ///
    /// # Returns
    ///
    /// * `RegistryManager` - Manager with the offline remote connector
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            loader: HierarchicalLoader::new(store.clone()),
            updater: TransactionalUpdater::new(store.clone()),
            store,
            remote: Arc::new(StubConnector),
        }
    }

    /// Replaces the remote connector.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteConnector>) -> Self {
        self.remote = remote;
        self
    }

    pub fn loader(&self) -> &HierarchicalLoader {
        &self.loader
    }

    pub fn updater(&self) -> &TransactionalUpdater {
        &self.updater
    }

    /// Events whose name starts with `query`, newest first.
    pub async fn search_events(&self, query: &str) -> RegistryResult<Vec<Arc<Event>>> {
        let rows = self.store.search_events(query).await?;
        let events = self.loader.load_events(keys_from_rows(&rows)?).await?;
        Ok(sorted(events, Event::listing_order))
    }

    /// Event registrations whose team name starts with `query`.
    pub async fn search_teams(&self, query: &str) -> RegistryResult<Vec<Arc<Team>>> {
        let rows = self.store.search_teams(query).await?;
        let teams = self.loader.load_teams(keys_from_rows(&rows)?).await?;
        Ok(sorted(teams, Team::listing_order))
    }

    /// Roster entries whose player name starts with `query`.
    pub async fn search_players(&self, query: &str) -> RegistryResult<Vec<Arc<Player>>> {
        let rows = self.store.search_players(query).await?;
        let players = self.loader.load_players(keys_from_rows(&rows)?).await?;
        Ok(sorted(players, Player::listing_order))
    }

    /// Teams registered for `event`, in registration order.
    ///
    /// # Arguments
    ///
    /// * `event` - Event whose registrations are listed
    /// * `filter` - Name prefix, status and dropped-team options
    pub async fn event_teams(
        &self,
        event: &Event,
        filter: &EventTeamFilter,
    ) -> RegistryResult<Vec<Arc<Team>>> {
        let rows = self.store.find_event_teams(event.id(), filter).await?;
        let teams = self.loader.load_teams(keys_from_rows(&rows)?).await?;
        Ok(sorted(teams, Team::listing_order))
    }

    /// Players on `team`'s roster, by name.
    pub async fn team_members(&self, team: &Team) -> RegistryResult<Vec<Arc<Player>>> {
        let players = self.loader.load_players(vec![team.key().clone()]).await?;
        Ok(sorted(players, Player::listing_order))
    }

    /// Looks up one event by its `E::` key.
    pub async fn event(&self, key: &CompositeKey) -> RegistryResult<Option<Arc<Event>>> {
        require_level(key, Level::Event)?;
        let mut events = self.loader.load_events(vec![key.clone()]).await?;
        Ok(events.remove(key.full_id()))
    }

    /// Looks up one team registration by its `E:T:` key.
    pub async fn team(&self, key: &CompositeKey) -> RegistryResult<Option<Arc<Team>>> {
        require_level(key, Level::Team)?;
        let mut teams = self.loader.load_teams(vec![key.clone()]).await?;
        Ok(teams.remove(key.full_id()))
    }

    /// Looks up one roster entry by its `E:T:P` key.
    pub async fn player(&self, key: &CompositeKey) -> RegistryResult<Option<Arc<Player>>> {
        require_level(key, Level::Player)?;
        let mut players = self.loader.load_players(vec![key.clone()]).await?;
        Ok(players.remove(key.full_id()))
    }

    pub async fn populate_rosters(&self, teams: &[Arc<Team>]) -> RegistryResult<()> {
        self.loader.populate_rosters(teams).await
    }

    pub async fn recent_participation_for(&self, player: &Player) -> RegistryResult<Vec<Arc<Player>>> {
        self.loader.recent_participation_for(player).await
    }

    pub async fn recent_participation_at(
        &self,
        player: &Player,
        now: chrono::DateTime<chrono::Utc>,
    ) -> RegistryResult<Vec<Arc<Player>>> {
        self.loader.recent_participation_at(player, now).await
    }

    pub async fn update_team_verification(
        &self,
        team: &Team,
        status: VerificationStatus,
        note: &str,
    ) -> UpdateOutcome {
        self.updater.update_team_verification(team, status, note).await
    }

    pub async fn update_player_verification(
        &self,
        player: &Player,
        status: VerificationStatus,
        note: &str,
    ) -> UpdateOutcome {
        self.updater
            .update_player_verification(player, status, note)
            .await
    }

    /// Asks the remote platform for new events.
    ///
    /// # Returns
    ///
    /// * `RegistryResult<String>` - Summary such as `Added 2 events.`
    pub async fn fetch_new_events(&self) -> RegistryResult<String> {
        let drafts = self.remote.fetch_events().await?;
        log::info!("Remote platform returned {} event(s)", drafts.len());
        Ok(format!("Added {} events.", drafts.len()))
    }

    /// Asks the remote platform for the registrants of `event`.
    ///
    /// # Returns
    ///
    /// * `RegistryResult<String>` - Summary such as `Updated 12 teams.`
    pub async fn fetch_event_registrants(&self, event: &Event) -> RegistryResult<String> {
        let drafts = self.remote.fetch_participants(event.remote_id()).await?;
        log::info!(
            "Remote platform returned {} team(s) for event {}",
            drafts.len(),
            event.key()
        );
        Ok(format!("Updated {} teams.", drafts.len()))
    }
}
