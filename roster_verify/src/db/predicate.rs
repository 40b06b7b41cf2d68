//! SQL builder for composite-key predicates.
//!
//! Only the structure of the predicate varies with the key shape: which of the
//! three identifier columns take part in the composite expression. Identifier
//! values are always bound, and a whole batch travels as one `TEXT[]`
//! parameter, so a batch of any size is a single query.

use sqlx::{Postgres, QueryBuilder};

use crate::model::KeyShape;

/// Qualified identifier columns of one table or join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColumns {
    pub event: &'static str,
    pub team: &'static str,
    pub player: &'static str,
}

/// `events e`
pub const EVENT_COLUMNS: KeyColumns = KeyColumns {
    event: "e.event_id",
    team: "e.team_id",
    player: "e.player_id",
};

/// `eventTeams et`
pub const EVENT_TEAM_COLUMNS: KeyColumns = KeyColumns {
    event: "et.event_id",
    team: "et.team_id",
    player: "et.player_id",
};

/// `rosters r`
pub const ROSTER_COLUMNS: KeyColumns = KeyColumns {
    event: "r.event_id",
    team: "r.team_id",
    player: "r.player_id",
};

/// Composite identifier expression for `shape`, e.g. for `E:T:`
/// `CAST(et.event_id AS TEXT) || ':' || CAST(et.team_id AS TEXT) || ':' || ''`.
///
/// Columns absent from the shape are replaced by the empty string literal, so
/// the expression evaluates to exactly what `KeyShape::project` builds.
/// Columns a table does not have must not appear in the shape.
pub fn composite_expr(shape: KeyShape, columns: &KeyColumns) -> String {
    [
        (shape.event, columns.event),
        (shape.team, columns.team),
        (shape.player, columns.player),
    ]
    .iter()
    .map(|(present, column)| {
        if *present {
            format!("CAST({column} AS TEXT)")
        } else {
            "''".to_string()
        }
    })
    .collect::<Vec<_>>()
    .join(" || ':' || ")
}

/// Appends `(<composite expr>) = ANY(<batch>)` to `builder`, binding every
/// full identifier as one array parameter.
pub fn push_key_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    shape: KeyShape,
    columns: &KeyColumns,
    full_ids: &[String],
) {
    builder
        .push("(")
        .push(composite_expr(shape, columns))
        .push(") = ANY(")
        .push_bind(full_ids.to_vec())
        .push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_shape_expr() {
        assert_eq!(
            composite_expr(KeyShape::TEAM, &EVENT_TEAM_COLUMNS),
            "CAST(et.event_id AS TEXT) || ':' || CAST(et.team_id AS TEXT) || ':' || ''"
        );
    }

    #[test]
    fn test_player_only_expr() {
        assert_eq!(
            composite_expr(KeyShape::new(false, false, true), &ROSTER_COLUMNS),
            "'' || ':' || '' || ':' || CAST(r.player_id AS TEXT)"
        );
    }

    #[test]
    fn test_event_shape_never_mentions_missing_columns() {
        let expr = composite_expr(KeyShape::EVENT, &EVENT_COLUMNS);
        assert!(expr.contains("e.event_id"));
        assert!(!expr.contains("team_id"));
        assert!(!expr.contains("player_id"));
    }

    #[test]
    fn test_key_filter_binds_one_array() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM events e WHERE ");
        let ids = vec!["5::".to_string(), "6::".to_string()];
        push_key_filter(&mut builder, KeyShape::EVENT, &EVENT_COLUMNS, &ids);
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM events e WHERE (CAST(e.event_id AS TEXT) || ':' || '' || ':' || '') = ANY($1)"
        );
    }

    #[test]
    fn test_key_filter_size_independent_of_batch() {
        let ids: Vec<String> = (0..70_000).map(|i| format!("{i}::")).collect();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM events e WHERE ");
        push_key_filter(&mut builder, KeyShape::EVENT, &EVENT_COLUMNS, &ids);
        assert!(builder.sql().ends_with("= ANY($1)"));
        assert!(!builder.sql().contains("$2"));
    }
}
