//! Expansion of wildcard key batches into primary keys.

use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use super::errors::{RegistryError, RegistryResult};
use crate::db::{KeyRow, TournamentStore};
use crate::model::{CompositeKey, KeyResult};

/// Builds a key from identifier columns.
pub(crate) fn key_from_row(row: &KeyRow) -> KeyResult<CompositeKey> {
    CompositeKey::new(
        row.event_id.as_str(),
        row.team_id.as_str(),
        row.player_id.as_str(),
    )
}

/// Full identifiers of a batch, in order.
pub(crate) fn full_ids(keys: &[CompositeKey]) -> Vec<String> {
    keys.iter().map(|k| k.full_id().to_string()).collect()
}

/// Drops repeated keys, keeping the first occurrence of each full identifier.
pub(crate) fn distinct(keys: impl IntoIterator<Item = CompositeKey>) -> Vec<CompositeKey> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|k| seen.insert(k.full_id().to_string()))
        .collect()
}

/// Turns uniform-shape key batches into the primary keys they address
#[derive(Clone)]
pub struct KeyExpander {
    store: Arc<dyn TournamentStore>,
}

impl KeyExpander {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Expands `keys` into primary keys.
    ///
    /// A batch that is already primary is returned as is without touching the
    /// store. Otherwise one lookup resolves the whole batch; a wildcard key may
    /// fan out into many primary keys.
    ///
    /// # Errors
    ///
    /// * `RegistryError::MixedKeyShape` - the batch mixes shapes
    /// * `RegistryError::Storage` - the lookup failed
    pub async fn expand(&self, keys: Vec<CompositeKey>) -> RegistryResult<Vec<CompositeKey>> {
        let shape = match keys.first() {
            Some(sample) => sample.shape(),
            None => return Ok(keys),
        };

        if let Some(odd) = keys.iter().find(|k| k.shape() != shape) {
            return Err(RegistryError::MixedKeyShape {
                expected: shape.to_string(),
                found: odd.shape().to_string(),
            });
        }

        if shape.is_primary() {
            return Ok(keys);
        }

        let rows = self.store.expand_keys(shape, &full_ids(&keys)).await?;
        debug!(
            "Expanded {} {} key(s) into {} primary key(s)",
            keys.len(),
            shape,
            rows.len()
        );

        Ok(rows.iter().map(key_from_row).collect::<KeyResult<_>>()?)
    }
}
