//! Raw rows as returned by a store, before decoding into entities.

use chrono::{DateTime, Utc};

/// Identifier columns of one row, absent segments empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    pub event_id: String,
    pub team_id: String,
    pub player_id: String,
}

/// `events` row
#[derive(Debug, Clone)]
pub struct EventRow {
    pub event_id: String,
    pub remote_id: String,
    pub name: String,
    pub url: String,
    pub start_date: DateTime<Utc>,
    pub team_count: i32,
}

/// `eventTeams` joined with `teams`
#[derive(Debug, Clone)]
pub struct TeamRow {
    pub event_id: String,
    pub team_id: String,
    pub remote_id: String,
    pub name: String,
    pub url: String,
    pub reg_order: i32,
    pub dropped: bool,
    pub verification_status: i16,
    pub verification_note: String,
}

/// `rosters` joined with `players`
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub event_id: String,
    pub team_id: String,
    pub player_id: String,
    pub remote_id: String,
    pub name: String,
    pub url: String,
    pub dropped: bool,
    pub verification_status: i16,
    pub verification_note: String,
}
