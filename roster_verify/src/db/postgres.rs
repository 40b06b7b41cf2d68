//! PostgreSQL implementation of `TournamentStore`.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use log::debug;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::sync::Arc;

use super::errors::{StoreError, StoreResult};
use super::predicate::{
    EVENT_COLUMNS, EVENT_TEAM_COLUMNS, KeyColumns, ROSTER_COLUMNS, push_key_filter,
};
use super::rows::{EventRow, KeyRow, PlayerRow, TeamRow};
use super::store::{EventTeamFilter, TournamentStore, prefix_pattern};
use crate::model::{CompositeKey, KeyShape, VerificationStatus};

/// Default PostgreSQL implementation of `TournamentStore`
#[derive(Clone)]
pub struct PgTournamentStore {
    pool: Arc<PgPool>,
}

impl PgTournamentStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Runs `select` restricted to the rows whose identifier under `shape` is
    /// one of `full_ids`. The batch is bound as a single array parameter.
    async fn fetch_batch(
        &self,
        select: &str,
        shape: KeyShape,
        columns: &KeyColumns,
        full_ids: &[String],
    ) -> StoreResult<Vec<PgRow>> {
        if full_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(select);
        builder.push(" WHERE ");
        push_key_filter(&mut builder, shape, columns, full_ids);
        debug!("Batch query over {} key(s): {}", full_ids.len(), builder.sql());

        Ok(builder.build().fetch_all(self.pool.as_ref()).await?)
    }

    async fn fetch_key_rows(&self, sql: &str, pattern: &str) -> StoreResult<Vec<KeyRow>> {
        let rows = sqlx::query(sql)
            .bind(pattern)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter().map(key_row).collect()
    }

    /// Executes a single-row update in its own transaction.
    ///
    /// The transaction commits only when exactly one row changed; otherwise it
    /// is rolled back. Either way the connection goes back to the pool in
    /// auto-commit mode.
    async fn update_in_transaction(
        &self,
        table: &'static str,
        key: &CompositeKey,
        query: Query<'_, Postgres, PgArguments>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        match query.execute(&mut *tx).await {
            Ok(done) if done.rows_affected() == 1 => {
                tx.commit().await?;
                Ok(())
            }
            Ok(_) => {
                tx.rollback().await?;
                Err(StoreError::RowNotFound {
                    table,
                    key: key.full_id().to_string(),
                })
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }
}

fn optional_text(row: &PgRow, column: &str) -> String {
    row.try_get::<Option<String>, _>(column)
        .ok()
        .flatten()
        .unwrap_or_default()
}

fn key_row(row: &PgRow) -> StoreResult<KeyRow> {
    Ok(KeyRow {
        event_id: row.try_get("event_id")?,
        team_id: optional_text(row, "team_id"),
        player_id: optional_text(row, "player_id"),
    })
}

fn event_row(r: PgRow) -> StoreResult<EventRow> {
    Ok(EventRow {
        event_id: r.try_get("event_id")?,
        remote_id: r.try_get("remote_id")?,
        name: r.try_get("name")?,
        url: r.try_get("url")?,
        start_date: r
            .try_get::<chrono::NaiveDateTime, _>("start_date")?
            .and_utc(),
        team_count: r.try_get("team_count")?,
    })
}

fn team_row(r: PgRow) -> StoreResult<TeamRow> {
    Ok(TeamRow {
        event_id: r.try_get("event_id")?,
        team_id: r.try_get("team_id")?,
        remote_id: r.try_get("remote_id")?,
        name: r.try_get("name")?,
        url: r.try_get("url")?,
        reg_order: r.try_get("reg_order")?,
        dropped: r.try_get::<i16, _>("dropped")? != 0,
        verification_status: r.try_get("verification_status")?,
        verification_note: r.try_get("verification_note")?,
    })
}

fn player_row(r: PgRow) -> StoreResult<PlayerRow> {
    Ok(PlayerRow {
        event_id: r.try_get("event_id")?,
        team_id: r.try_get("team_id")?,
        player_id: r.try_get("player_id")?,
        remote_id: r.try_get("remote_id")?,
        name: r.try_get("name")?,
        url: r.try_get("url")?,
        dropped: r.try_get::<i16, _>("dropped")? != 0,
        verification_status: r.try_get("verification_status")?,
        verification_note: r.try_get("verification_note")?,
    })
}

#[async_trait]
impl TournamentStore for PgTournamentStore {
    async fn expand_keys(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<KeyRow>> {
        let rows = if shape.player {
            self.fetch_batch(
                r#"
                SELECT CAST(r.event_id AS TEXT) AS event_id,
                       CAST(r.team_id AS TEXT) AS team_id,
                       CAST(r.player_id AS TEXT) AS player_id
                FROM rosters r
                "#,
                shape,
                &ROSTER_COLUMNS,
                full_ids,
            )
            .await?
        } else {
            self.fetch_batch(
                r#"
                SELECT CAST(et.event_id AS TEXT) AS event_id,
                       CAST(et.team_id AS TEXT) AS team_id
                FROM eventTeams et
                "#,
                shape,
                &EVENT_TEAM_COLUMNS,
                full_ids,
            )
            .await?
        };

        rows.iter().map(key_row).collect()
    }

    async fn fetch_events(
        &self,
        shape: KeyShape,
        full_ids: &[String],
    ) -> StoreResult<Vec<EventRow>> {
        self.fetch_batch(
            r#"
            SELECT CAST(e.event_id AS TEXT) AS event_id, e.remote_id, e.name, e.url,
                   e.startDate AS start_date, e.teamCount AS team_count
            FROM events e
            "#,
            shape,
            &EVENT_COLUMNS,
            full_ids,
        )
        .await?
        .into_iter()
        .map(event_row)
        .collect()
    }

    async fn fetch_teams(&self, shape: KeyShape, full_ids: &[String]) -> StoreResult<Vec<TeamRow>> {
        self.fetch_batch(
            r#"
            SELECT CAST(et.event_id AS TEXT) AS event_id, CAST(et.team_id AS TEXT) AS team_id,
                   t.remote_id, t.name, t.url, et.reg_order, et.dropped,
                   et.verification_status, et.verification_note
            FROM eventTeams et
            INNER JOIN teams t ON et.team_id = t.team_id
            "#,
            shape,
            &EVENT_TEAM_COLUMNS,
            full_ids,
        )
        .await?
        .into_iter()
        .map(team_row)
        .collect()
    }

    async fn fetch_players(
        &self,
        shape: KeyShape,
        full_ids: &[String],
    ) -> StoreResult<Vec<PlayerRow>> {
        self.fetch_batch(
            r#"
            SELECT CAST(r.event_id AS TEXT) AS event_id, CAST(r.team_id AS TEXT) AS team_id,
                   CAST(r.player_id AS TEXT) AS player_id, p.remote_id, p.name, p.url,
                   r.dropped, r.verification_status, r.verification_note
            FROM rosters r
            INNER JOIN players p ON r.player_id = p.player_id
            "#,
            shape,
            &ROSTER_COLUMNS,
            full_ids,
        )
        .await?
        .into_iter()
        .map(player_row)
        .collect()
    }

    async fn search_events(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.fetch_key_rows(
            "SELECT CAST(event_id AS TEXT) AS event_id FROM events WHERE LOWER(name) LIKE $1",
            &prefix_pattern(query),
        )
        .await
    }

    async fn search_teams(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.fetch_key_rows(
            r#"
            SELECT CAST(et.event_id AS TEXT) AS event_id, CAST(et.team_id AS TEXT) AS team_id
            FROM eventTeams et
            INNER JOIN teams t ON et.team_id = t.team_id
            WHERE LOWER(t.name) LIKE $1
            "#,
            &prefix_pattern(query),
        )
        .await
    }

    async fn search_players(&self, query: &str) -> StoreResult<Vec<KeyRow>> {
        self.fetch_key_rows(
            r#"
            SELECT CAST(r.event_id AS TEXT) AS event_id, CAST(r.team_id AS TEXT) AS team_id,
                   CAST(r.player_id AS TEXT) AS player_id
            FROM rosters r
            INNER JOIN players p ON r.player_id = p.player_id
            WHERE LOWER(p.name) LIKE $1
            "#,
            &prefix_pattern(query),
        )
        .await
    }

    async fn find_event_teams(
        &self,
        event_id: &str,
        filter: &EventTeamFilter,
    ) -> StoreResult<Vec<KeyRow>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT CAST(et.event_id AS TEXT) AS event_id, CAST(et.team_id AS TEXT) AS team_id
            FROM eventTeams et
            INNER JOIN teams t ON et.team_id = t.team_id
            WHERE CAST(et.event_id AS TEXT) = "#,
        );
        builder.push_bind(event_id.to_string());
        builder.push(" AND LOWER(t.name) LIKE ");
        builder.push_bind(prefix_pattern(&filter.query));

        if !filter.include_dropped {
            builder.push(" AND et.dropped = 0");
        }
        if let Some(status) = filter.status {
            builder.push(" AND et.verification_status = ");
            builder.push_bind(status.code());
        }

        let rows = builder.build().fetch_all(self.pool.as_ref()).await?;
        rows.iter().map(key_row).collect()
    }

    async fn write_team_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()> {
        let query = sqlx::query(
            r#"
            UPDATE eventTeams
            SET verification_status = $1, verification_note = $2
            WHERE CAST(event_id AS TEXT) = $3 AND CAST(team_id AS TEXT) = $4
            "#,
        )
        .bind(status.code())
        .bind(note)
        .bind(key.event_id())
        .bind(key.team_id());

        self.update_in_transaction("eventTeams", key, query).await
    }

    async fn write_player_verification(
        &self,
        key: &CompositeKey,
        status: VerificationStatus,
        note: &str,
    ) -> StoreResult<()> {
        let query = sqlx::query(
            r#"
            UPDATE rosters
            SET verification_status = $1, verification_note = $2
            WHERE CAST(event_id AS TEXT) = $3
              AND CAST(team_id AS TEXT) = $4
              AND CAST(player_id AS TEXT) = $5
            "#,
        )
        .bind(status.code())
        .bind(note)
        .bind(key.event_id())
        .bind(key.team_id())
        .bind(key.player_id());

        self.update_in_transaction("rosters", key, query).await
    }
}
