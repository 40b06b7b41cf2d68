//! Plain-text and JSON rendering of registry results.

use roster_verify::{Event, Player, Team};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn event_json(event: &Event) -> Value {
    json!({
        "key": event.key().full_id(),
        "remote_id": event.remote_id(),
        "name": event.name(),
        "url": event.url(),
        "start": event.start().to_rfc3339(),
        "team_count": event.team_count(),
    })
}

pub fn team_json(team: &Team) -> Value {
    let verification = team.verification();
    json!({
        "key": team.key().full_id(),
        "event": team.event().name(),
        "name": team.name(),
        "url": team.url(),
        "registration_order": team.registration_order(),
        "dropped": team.is_dropped(),
        "status": verification.status,
        "note": verification.note,
    })
}

pub fn player_json(player: &Player) -> Value {
    json!({
        "key": player.key().full_id(),
        "event": player.team().event().name(),
        "team": player.team().name(),
        "name": player.name(),
        "url": player.url(),
        "dropped": player.is_dropped(),
        "status": player.verification_status(),
        "note": player.verification_note(),
    })
}

pub fn event_line(event: &Event) -> String {
    format!(
        "{:<12} {}  ({} teams)  {}",
        event.key(),
        event.name(),
        event.team_count(),
        event.start_display()
    )
}

pub fn team_line(team: &Team) -> String {
    let verification = team.verification();
    let mut line = format!(
        "{:<12} #{:<3} {:<24} [{}]",
        team.key(),
        team.registration_order(),
        team.name(),
        verification.status
    );
    if team.is_dropped() {
        line.push_str(" (dropped)");
    }
    if !verification.note.is_empty() {
        line.push_str(&format!("  {}", verification.note));
    }
    line
}

pub fn player_line(player: &Player) -> String {
    let mut line = format!(
        "{:<12} {:<24} {:<24} [{}]",
        player.key(),
        player.name(),
        player.team().event().name(),
        player.verification_status()
    );
    let note = player.verification_note();
    if !note.is_empty() {
        line.push_str(&format!("  {note}"));
    }
    line
}

/// Writes results to stdout in the selected format
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn list<T>(&self, items: &[Arc<T>], to_json: fn(&T) -> Value, to_line: fn(&T) -> String) {
        if self.json {
            let values: Vec<Value> = items.iter().map(|i| to_json(i)).collect();
            println!("{}", Value::Array(values));
            return;
        }
        if items.is_empty() {
            println!("No results.");
        }
        for item in items {
            println!("{}", to_line(item));
        }
    }

    pub fn events(&self, events: &[Arc<Event>]) {
        self.list(events, event_json, event_line);
    }

    pub fn teams(&self, teams: &[Arc<Team>]) {
        self.list(teams, team_json, team_line);
    }

    pub fn players(&self, players: &[Arc<Player>]) {
        self.list(players, player_json, player_line);
    }

    /// A team followed by its roster.
    pub fn roster(&self, team: &Team, players: &[Arc<Player>]) {
        if self.json {
            let mut value = team_json(team);
            value["roster"] = Value::Array(players.iter().map(|p| player_json(p)).collect());
            println!("{value}");
            return;
        }
        println!("{}", team_line(team));
        for player in players {
            println!("  {}", player_line(player));
        }
    }

    pub fn message(&self, message: &str) {
        if self.json {
            println!("{}", json!({ "message": message }));
        } else {
            println!("{message}");
        }
    }
}
