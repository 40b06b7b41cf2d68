//! Event, team and player entities.
//!
//! Entities are built only by the registry loader and are read-only outside
//! this crate. The two mutable parts, verification details and a team's roster,
//! are changed through `pub(crate)` methods used by the updater and by roster
//! population.
//!
//! Parents are shared through `Arc`: every team holds its event and every
//! player holds its team, so a parent lives at least as long as any child.
//! Roster players always reference a separately loaded copy of their team,
//! never the team whose roster holds them, so no reference cycle can form.

use chrono::{DateTime, Local, Utc};
use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use super::errors::KeyResult;
use super::key::CompositeKey;
use super::status::VerificationStatus;
use crate::db::rows::{EventRow, PlayerRow, TeamRow};

/// Status and note pair, always read and written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub status: VerificationStatus,
    pub note: String,
}

fn read_lock<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write_lock<T>(lock: &RwLock<T>, update: impl FnOnce(&mut T)) {
    let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
    update(&mut guard);
}

/// Tournament event
#[derive(Debug)]
pub struct Event {
    key: CompositeKey,
    remote_id: String,
    name: String,
    url: String,
    start: DateTime<Utc>,
    team_count: i32,
}

impl Event {
    pub(crate) fn from_row(row: EventRow) -> KeyResult<Self> {
        Ok(Self {
            key: CompositeKey::event(&row.event_id)?,
            remote_id: row.remote_id,
            name: row.name,
            url: row.url,
            start: row.start_date,
            team_count: row.team_count,
        })
    }

    pub fn id(&self) -> &str {
        self.key.event_id()
    }

    pub fn key(&self) -> &CompositeKey {
        &self.key
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Start time in the local timezone, e.g. `Saturday, March 02 2024 at 01:00 PM EST`.
    pub fn start_display(&self) -> String {
        self.start
            .with_timezone(&Local)
            .format("%A, %B %d %Y at %I:%M %p %Z")
            .to_string()
    }

    pub fn team_count(&self) -> i32 {
        self.team_count
    }

    /// Newest first, then by name.
    pub fn listing_order(&self, other: &Event) -> Ordering {
        other
            .start
            .cmp(&self.start)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// A team's registration at one event
#[derive(Debug)]
pub struct Team {
    key: CompositeKey,
    remote_id: String,
    name: String,
    url: String,
    registration_order: i32,
    dropped: bool,
    event: Arc<Event>,
    verification: RwLock<Verification>,
    roster: RwLock<Option<Vec<Arc<Player>>>>,
}

impl Team {
    pub(crate) fn from_row(row: TeamRow, event: Arc<Event>) -> KeyResult<Self> {
        let status = VerificationStatus::from_code(row.verification_status)?;
        Ok(Self {
            key: CompositeKey::team(event.id(), &row.team_id)?,
            remote_id: row.remote_id,
            name: row.name,
            url: row.url,
            registration_order: row.reg_order,
            dropped: row.dropped,
            event,
            verification: RwLock::new(Verification {
                status,
                note: row.verification_note,
            }),
            roster: RwLock::new(None),
        })
    }

    pub fn id(&self) -> &str {
        self.key.team_id()
    }

    pub fn key(&self) -> &CompositeKey {
        &self.key
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn registration_order(&self) -> i32 {
        self.registration_order
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn event(&self) -> &Arc<Event> {
        &self.event
    }

    pub fn verification(&self) -> Verification {
        read_lock(&self.verification)
    }

    pub fn verification_status(&self) -> VerificationStatus {
        self.verification().status
    }

    pub fn verification_note(&self) -> String {
        self.verification().note
    }

    /// `None` until rosters have been populated for this instance.
    pub fn roster(&self) -> Option<Vec<Arc<Player>>> {
        read_lock(&self.roster)
    }

    pub(crate) fn add_to_roster(&self, player: Arc<Player>) {
        write_lock(&self.roster, |roster| {
            roster.get_or_insert_with(Vec::new).push(player)
        });
    }

    pub(crate) fn set_verification(&self, status: VerificationStatus, note: &str) {
        write_lock(&self.verification, |v| {
            v.status = status;
            v.note = note.to_string();
        });
    }

    /// Event order first, then registration order within an event.
    pub fn listing_order(&self, other: &Team) -> Ordering {
        if self.event.id() != other.event.id() {
            return self.event.listing_order(&other.event);
        }
        self.registration_order.cmp(&other.registration_order)
    }
}

/// A player on a team's roster at one event
#[derive(Debug)]
pub struct Player {
    key: CompositeKey,
    remote_id: String,
    url: String,
    name: String,
    dropped: bool,
    team: Arc<Team>,
    verification: RwLock<Verification>,
}

impl Player {
    pub(crate) fn from_row(row: PlayerRow, team: Arc<Team>) -> KeyResult<Self> {
        let status = VerificationStatus::from_code(row.verification_status)?;
        Ok(Self {
            key: CompositeKey::player(team.event().id(), team.id(), &row.player_id)?,
            remote_id: row.remote_id,
            url: row.url,
            name: row.name,
            dropped: row.dropped,
            team,
            verification: RwLock::new(Verification {
                status,
                note: row.verification_note,
            }),
        })
    }

    pub fn id(&self) -> &str {
        self.key.player_id()
    }

    pub fn key(&self) -> &CompositeKey {
        &self.key
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn team(&self) -> &Arc<Team> {
        &self.team
    }

    /// The player's own status and note as persisted.
    pub fn own_verification(&self) -> Verification {
        read_lock(&self.verification)
    }

    /// Effective status: an `Unverified` player reports the team's status
    /// whenever the team has been verified as anything else.
    pub fn verification_status(&self) -> VerificationStatus {
        let own = self.own_verification().status;
        let team = self.team.verification_status();
        if own == VerificationStatus::Unverified && team != VerificationStatus::Unverified {
            return team;
        }
        own
    }

    /// The player's own note. Notes are never inherited from the team.
    pub fn verification_note(&self) -> String {
        self.own_verification().note
    }

    pub(crate) fn set_verification(&self, status: VerificationStatus, note: &str) {
        write_lock(&self.verification, |v| {
            v.status = status;
            v.note = note.to_string();
        });
    }

    /// Teammates by name; everything else falls back to team order.
    pub fn listing_order(&self, other: &Player) -> Ordering {
        let same_team = self.team.key() == other.team.key();
        if same_team && self.id() != other.id() {
            return self.name.cmp(&other.name);
        }
        self.team.listing_order(&other.team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, name: &str, day: u32) -> Arc<Event> {
        Arc::new(
            Event::from_row(EventRow {
                event_id: id.to_string(),
                remote_id: format!("r{id}"),
                name: name.to_string(),
                url: String::new(),
                start_date: Utc.with_ymd_and_hms(2024, 3, day, 18, 0, 0).unwrap(),
                team_count: 2,
            })
            .unwrap(),
        )
    }

    fn team(event: Arc<Event>, id: &str, order: i32, code: i16) -> Arc<Team> {
        Arc::new(
            Team::from_row(
                TeamRow {
                    event_id: event.id().to_string(),
                    team_id: id.to_string(),
                    remote_id: String::new(),
                    name: format!("Team {id}"),
                    url: String::new(),
                    reg_order: order,
                    dropped: false,
                    verification_status: code,
                    verification_note: String::new(),
                },
                event,
            )
            .unwrap(),
        )
    }

    fn player(team: Arc<Team>, id: &str, name: &str, code: i16) -> Player {
        Player::from_row(
            PlayerRow {
                event_id: team.event().id().to_string(),
                team_id: team.id().to_string(),
                player_id: id.to_string(),
                remote_id: String::new(),
                name: name.to_string(),
                url: String::new(),
                dropped: false,
                verification_status: code,
                verification_note: "own note".to_string(),
            },
            team,
        )
        .unwrap()
    }

    #[test]
    fn test_keys_follow_parents() {
        let t = team(event("5", "Open", 2), "10", 1, 0);
        let p = player(t.clone(), "3", "Ann", 0);
        assert_eq!(t.key().full_id(), "5:10:");
        assert_eq!(p.key().full_id(), "5:10:3");
    }

    #[test]
    fn test_unverified_player_inherits_team_status() {
        let t = team(event("5", "Open", 2), "10", 1, 3);
        let p = player(t, "3", "Ann", 0);
        assert_eq!(p.verification_status(), VerificationStatus::Questionable);
        assert_eq!(p.verification_note(), "own note");
    }

    #[test]
    fn test_explicit_player_status_wins() {
        let t = team(event("5", "Open", 2), "10", 1, 3);
        let p = player(t, "3", "Ann", 1);
        assert_eq!(p.verification_status(), VerificationStatus::Eligible);
    }

    #[test]
    fn test_bad_status_code_is_rejected() {
        let e = event("5", "Open", 2);
        let row = TeamRow {
            event_id: "5".to_string(),
            team_id: "10".to_string(),
            remote_id: String::new(),
            name: "Bad".to_string(),
            url: String::new(),
            reg_order: 1,
            dropped: false,
            verification_status: 9,
            verification_note: String::new(),
        };
        assert!(Team::from_row(row, e).is_err());
    }

    #[test]
    fn test_roster_starts_absent() {
        let t = team(event("5", "Open", 2), "10", 1, 0);
        assert!(t.roster().is_none());

        let other = team(event("5", "Open", 2), "10", 1, 0);
        t.add_to_roster(Arc::new(player(other, "3", "Ann", 0)));
        assert_eq!(t.roster().map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_listing_orders() {
        let older = event("1", "B", 1);
        let newer = event("2", "A", 9);
        assert_eq!(newer.listing_order(&older), Ordering::Less);

        let same_day_a = event("3", "Alpha", 4);
        let same_day_b = event("4", "Beta", 4);
        assert_eq!(same_day_a.listing_order(&same_day_b), Ordering::Less);

        let first = team(older.clone(), "10", 1, 0);
        let second = team(older, "11", 2, 0);
        assert_eq!(first.listing_order(&second), Ordering::Less);

        let zed = player(first.clone(), "1", "Zed", 0);
        let amy = player(first, "2", "Amy", 0);
        assert_eq!(amy.listing_order(&zed), Ordering::Less);
    }
}
