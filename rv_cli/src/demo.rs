//! Seed data for `--demo`, which runs every command against an in-memory store.

use chrono::{Duration, Utc};
use roster_verify::VerificationStatus;
use roster_verify::db::{EventRow, MemoryStore, PlayerRow, TeamRow};

fn event(id: &str, name: &str, days_ago: i64, team_count: i32) -> EventRow {
    EventRow {
        event_id: id.to_string(),
        remote_id: format!("demo-{id}"),
        name: name.to_string(),
        url: format!("https://example.org/events/{id}"),
        start_date: Utc::now() - Duration::days(days_ago),
        team_count,
    }
}

fn team(
    event_id: &str,
    team_id: &str,
    name: &str,
    reg_order: i32,
    status: VerificationStatus,
    note: &str,
) -> TeamRow {
    TeamRow {
        event_id: event_id.to_string(),
        team_id: team_id.to_string(),
        remote_id: format!("demo-team-{team_id}"),
        name: name.to_string(),
        url: format!("https://example.org/teams/{team_id}"),
        reg_order,
        dropped: false,
        verification_status: status.code(),
        verification_note: note.to_string(),
    }
}

fn player(event_id: &str, team_id: &str, player_id: &str, name: &str) -> PlayerRow {
    PlayerRow {
        event_id: event_id.to_string(),
        team_id: team_id.to_string(),
        player_id: player_id.to_string(),
        remote_id: format!("demo-player-{player_id}"),
        name: name.to_string(),
        url: format!("https://example.org/players/{player_id}"),
        dropped: false,
        verification_status: VerificationStatus::Unverified.code(),
        verification_note: String::new(),
    }
}

/// Three events over the last half year with overlapping rosters.
pub fn seeded_store() -> MemoryStore {
    let mut dropped = team("2", "12", "Otters", 3, VerificationStatus::NoData, "");
    dropped.dropped = true;

    MemoryStore::new()
        .with_event(event("1", "Winter Invitational", 200, 2))
        .with_event(event("2", "Spring Open", 40, 3))
        .with_event(event("3", "City Championship", 10, 2))
        .with_team(team("1", "10", "Owls", 1, VerificationStatus::Eligible, ""))
        .with_team(team("1", "11", "Hawks", 2, VerificationStatus::Eligible, ""))
        .with_team(team(
            "2",
            "10",
            "Owls",
            1,
            VerificationStatus::Questionable,
            "new player without ID",
        ))
        .with_team(team("2", "11", "Hawks", 2, VerificationStatus::Unverified, ""))
        .with_team(dropped)
        .with_team(team("3", "10", "Owls", 1, VerificationStatus::Unverified, ""))
        .with_team(team("3", "13", "Falcons", 2, VerificationStatus::Ineligible, "over age"))
        .with_player(player("1", "10", "100", "Ann Archer"))
        .with_player(player("1", "10", "101", "Ben Brook"))
        .with_player(player("1", "11", "102", "Cara Cole"))
        .with_player(player("2", "10", "100", "Ann Archer"))
        .with_player(player("2", "10", "103", "Dev Dunn"))
        .with_player(player("2", "11", "102", "Cara Cole"))
        .with_player(player("2", "12", "104", "Eli Evans"))
        .with_player(player("3", "10", "100", "Ann Archer"))
        .with_player(player("3", "10", "101", "Ben Brook"))
        .with_player(player("3", "13", "105", "Fay Ford"))
}
