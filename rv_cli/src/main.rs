//! Command-line front end for tournament roster verification.
//!
//! Searches events, teams and players, lists rosters and recent
//! participation, and records verification decisions. Runs against
//! PostgreSQL, or against built-in sample data with `--demo`.

mod config;
mod demo;
mod logging;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Error, anyhow, bail};
use log::info;
use pico_args::Arguments;
use roster_verify::{
    CompositeKey, Database, EventTeamFilter, JsonFeedConnector, PgTournamentStore,
    RegistryError, RegistryManager, TournamentStore, VerificationStatus,
};

use config::CliConfig;
use output::Output;

const HELP: &str = "\
Track eligibility of tournament teams and players

USAGE:
  rv_cli [OPTIONS] <COMMAND> [ARGS]

COMMANDS:
  init-db                               Create any missing tables
  events <query>                        Events whose name starts with query
  teams <query>                         Team registrations whose name starts with query
  players <query>                       Roster entries whose name starts with query
  event-teams <event_id>                Teams registered for an event
  roster <event:team:>                  A team registration and its roster
  history <event:team:player>           The player's other entries from the last three months
  verify-team <event:team:> <status>    Record a team's verification status
  verify-player <event:team:player> <status>
                                        Record a player's verification status
  sync-events                           Ask the remote platform for new events
  sync-teams <event_id>                 Ask the remote platform for an event's registrants

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/verification]
  --feed       PATH        JSON feed for sync commands [default: env REMOTE_FEED]
  --query      TEXT        event-teams: team name prefix
  --status     STATUS      event-teams: only teams with this status
  --note       TEXT        verify-*: note stored with the status

FLAGS:
  --include-dropped        event-teams: include teams that dropped out
  --demo                   Use built-in sample data instead of the database
  --json                   Print results as JSON
  -h, --help               Print help information

STATUS:
  unverified, eligible, no-data, questionable, ineligible (or 0-4)

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size [default: 1]
  REMOTE_FEED              JSON feed for sync commands
  RUST_LOG                 Log filter [default: info,sqlx=warn]
";

struct Args {
    database_url: Option<String>,
    remote_feed: Option<PathBuf>,
    demo: bool,
    json: bool,
    query: String,
    status: Option<VerificationStatus>,
    note: String,
    include_dropped: bool,
}

enum Command {
    InitDb,
    Events(String),
    Teams(String),
    Players(String),
    EventTeams(String),
    Roster(CompositeKey),
    History(CompositeKey),
    VerifyTeam(CompositeKey, VerificationStatus),
    VerifyPlayer(CompositeKey, VerificationStatus),
    SyncEvents,
    SyncTeams(String),
}

fn parse_command(name: &str, pargs: &mut Arguments) -> Result<Command, Error> {
    let command = match name {
        "init-db" => Command::InitDb,
        "events" => Command::Events(pargs.opt_free_from_str()?.unwrap_or_default()),
        "teams" => Command::Teams(pargs.opt_free_from_str()?.unwrap_or_default()),
        "players" => Command::Players(pargs.opt_free_from_str()?.unwrap_or_default()),
        "event-teams" => Command::EventTeams(pargs.free_from_str()?),
        "roster" => Command::Roster(pargs.free_from_str()?),
        "history" => Command::History(pargs.free_from_str()?),
        "verify-team" => Command::VerifyTeam(pargs.free_from_str()?, pargs.free_from_str()?),
        "verify-player" => {
            Command::VerifyPlayer(pargs.free_from_str()?, pargs.free_from_str()?)
        }
        "sync-events" => Command::SyncEvents,
        "sync-teams" => Command::SyncTeams(pargs.free_from_str()?),
        other => bail!("Unknown command \"{other}\". See --help."),
    };
    Ok(command)
}

/// Logs the full error and keeps storage details out of the terminal.
fn client_error(e: RegistryError) -> Error {
    log::error!("{e}");
    anyhow!(e.client_message())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        database_url: pargs.opt_value_from_str("--db-url")?,
        remote_feed: pargs.opt_value_from_str("--feed")?,
        demo: pargs.contains("--demo"),
        json: pargs.contains("--json"),
        query: pargs.opt_value_from_str("--query")?.unwrap_or_default(),
        status: pargs.opt_value_from_str("--status")?,
        note: pargs.opt_value_from_str("--note")?.unwrap_or_default(),
        include_dropped: pargs.contains("--include-dropped"),
    };

    let Some(name) = pargs.opt_free_from_str::<String>()? else {
        print!("{HELP}");
        std::process::exit(2);
    };
    let command = parse_command(&name, &mut pargs)?;

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {remaining:?}");
    }

    logging::init();
    let config = CliConfig::from_env(
        args.database_url.clone(),
        args.remote_feed.clone(),
        args.demo,
    )?;
    let out = Output { json: args.json };

    let store: Arc<dyn TournamentStore> = if args.demo {
        info!("Using built-in demo data");
        if matches!(command, Command::InitDb) {
            out.message("Demo data needs no schema.");
            return Ok(());
        }
        Arc::new(demo::seeded_store())
    } else {
        info!("Connecting to database: {}", config.database.database_url);
        let db = Database::new(&config.database)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        if matches!(command, Command::InitDb) {
            db.apply_schema()
                .await
                .map_err(|e| anyhow!("Failed to apply schema: {}", e))?;
            out.message("Schema applied.");
            return Ok(());
        }
        Arc::new(PgTournamentStore::new(Arc::new(db.pool().clone())))
    };

    let mut manager = RegistryManager::new(store);
    if let Some(path) = &config.remote_feed {
        info!("Serving remote data from {}", path.display());
        let connector = JsonFeedConnector::from_file(path).await?;
        manager = manager.with_remote(Arc::new(connector));
    }

    run(&manager, command, &args, out)
        .await
        .map_err(client_error)
}

async fn run(
    manager: &RegistryManager,
    command: Command,
    args: &Args,
    out: Output,
) -> Result<(), RegistryError> {
    match command {
        Command::InitDb => {}
        Command::Events(query) => out.events(&manager.search_events(&query).await?),
        Command::Teams(query) => out.teams(&manager.search_teams(&query).await?),
        Command::Players(query) => out.players(&manager.search_players(&query).await?),
        Command::EventTeams(event_id) => {
            let Some(event) = manager.event(&CompositeKey::event(&event_id)?).await? else {
                out.message(&format!("No event {event_id}."));
                return Ok(());
            };
            let filter = EventTeamFilter {
                query: args.query.clone(),
                status: args.status,
                include_dropped: args.include_dropped,
            };
            out.teams(&manager.event_teams(&event, &filter).await?);
        }
        Command::Roster(key) => {
            let Some(team) = manager.team(&key).await? else {
                out.message(&format!("No team registration {key}."));
                return Ok(());
            };
            manager.populate_rosters(std::slice::from_ref(&team)).await?;
            out.roster(&team, &team.roster().unwrap_or_default());
        }
        Command::History(key) => {
            let Some(player) = manager.player(&key).await? else {
                out.message(&format!("No roster entry {key}."));
                return Ok(());
            };
            out.players(&manager.recent_participation_for(&player).await?);
        }
        Command::VerifyTeam(key, status) => {
            let Some(team) = manager.team(&key).await? else {
                out.message(&format!("No team registration {key}."));
                return Ok(());
            };
            let outcome = manager
                .update_team_verification(&team, status, &args.note)
                .await;
            logging::log_verification_change(
                "team",
                key.full_id(),
                status.label(),
                outcome.is_saved(),
            );
            out.message(outcome.message());
        }
        Command::VerifyPlayer(key, status) => {
            let Some(player) = manager.player(&key).await? else {
                out.message(&format!("No roster entry {key}."));
                return Ok(());
            };
            let outcome = manager
                .update_player_verification(&player, status, &args.note)
                .await;
            logging::log_verification_change(
                "player",
                key.full_id(),
                status.label(),
                outcome.is_saved(),
            );
            out.message(outcome.message());
        }
        Command::SyncEvents => out.message(&manager.fetch_new_events().await?),
        Command::SyncTeams(event_id) => {
            let Some(event) = manager.event(&CompositeKey::event(&event_id)?).await? else {
                out.message(&format!("No event {event_id}."));
                return Ok(());
            };
            out.message(&manager.fetch_event_registrants(&event).await?);
        }
    }
    Ok(())
}
