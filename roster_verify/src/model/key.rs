//! Composite event/team/player keys.
//!
//! Every row in the store is addressed by up to three identifier segments.
//! A key with some segments left empty addresses a *set* of rows (a wildcard);
//! the shapes `E::`, `E:T:` and `E:T:P` each address exactly one row in the
//! event, team and roster tables and are called primary.

use std::fmt;
use std::str::FromStr;

use super::errors::{KeyError, KeyResult};

/// Hierarchy level of a primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Event,
    Team,
    Player,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Event => write!(f, "EVENT"),
            Level::Team => write!(f, "TEAM"),
            Level::Player => write!(f, "PLAYER"),
        }
    }
}

/// Which segments of a key are set.
///
/// Renders as the three-position pattern used throughout the store layer,
/// e.g. `E:T:` or `::P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyShape {
    pub event: bool,
    pub team: bool,
    pub player: bool,
}

impl KeyShape {
    pub const EVENT: KeyShape = KeyShape::new(true, false, false);
    pub const TEAM: KeyShape = KeyShape::new(true, true, false);
    pub const PLAYER: KeyShape = KeyShape::new(true, true, true);

    pub const fn new(event: bool, team: bool, player: bool) -> Self {
        Self {
            event,
            team,
            player,
        }
    }

    /// True for `E::`, `E:T:` and `E:T:P`.
    pub fn is_primary(&self) -> bool {
        self.level().is_some()
    }

    /// The table level a primary shape addresses, `None` for wildcard shapes.
    pub fn level(&self) -> Option<Level> {
        match (self.event, self.team, self.player) {
            (true, false, false) => Some(Level::Event),
            (true, true, false) => Some(Level::Team),
            (true, true, true) => Some(Level::Player),
            _ => None,
        }
    }

    /// Builds the identifier a row would have when compared under this shape.
    ///
    /// Segments absent from the shape are blanked, so a row `(5, 10, 9)` under
    /// `::P` projects to `"::9"`. This is the in-process counterpart of the SQL
    /// expression produced by the predicate builder.
    pub fn project(&self, event_id: &str, team_id: &str, player_id: &str) -> String {
        format!(
            "{}:{}:{}",
            if self.event { event_id } else { "" },
            if self.team { team_id } else { "" },
            if self.player { player_id } else { "" },
        )
    }
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            if self.event { "E" } else { "" },
            if self.team { "T" } else { "" },
            if self.player { "P" } else { "" },
        )
    }
}

/// Immutable three-segment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    event_id: String,
    team_id: String,
    player_id: String,
    full_id: String,
}

impl CompositeKey {
    /// Creates a key. Absent segments are stored as empty strings.
    ///
    /// # Errors
    ///
    /// * `KeyError::InvalidKey` - all three segments are empty
    /// * `KeyError::InvalidArgument` - a segment contains the `:` separator
    pub fn new<'a>(
        event_id: impl Into<Option<&'a str>>,
        team_id: impl Into<Option<&'a str>>,
        player_id: impl Into<Option<&'a str>>,
    ) -> KeyResult<Self> {
        let event_id = event_id.into().unwrap_or_default().to_string();
        let team_id = team_id.into().unwrap_or_default().to_string();
        let player_id = player_id.into().unwrap_or_default().to_string();

        if event_id.is_empty() && team_id.is_empty() && player_id.is_empty() {
            return Err(KeyError::InvalidKey);
        }

        if let Some(segment) = [&event_id, &team_id, &player_id]
            .into_iter()
            .find(|segment| segment.contains(':'))
        {
            return Err(KeyError::InvalidArgument(format!(
                "key segment \"{segment}\" contains ':'"
            )));
        }

        let full_id = format!("{event_id}:{team_id}:{player_id}");
        Ok(Self {
            event_id,
            team_id,
            player_id,
            full_id,
        })
    }

    /// Key of a single event row.
    pub fn event(event_id: &str) -> KeyResult<Self> {
        Self::new(event_id, None, None)
    }

    /// Key of a single event-team row.
    pub fn team(event_id: &str, team_id: &str) -> KeyResult<Self> {
        Self::new(event_id, team_id, None)
    }

    /// Key of a single roster row.
    pub fn player(event_id: &str, team_id: &str, player_id: &str) -> KeyResult<Self> {
        Self::new(event_id, team_id, player_id)
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Colon-joined `event:team:player`.
    pub fn full_id(&self) -> &str {
        &self.full_id
    }

    pub fn shape(&self) -> KeyShape {
        KeyShape::new(
            !self.event_id.is_empty(),
            !self.team_id.is_empty(),
            !self.player_id.is_empty(),
        )
    }

    pub fn matches_shape(&self, other: &CompositeKey) -> bool {
        self.shape() == other.shape()
    }

    pub fn is_primary(&self) -> bool {
        self.shape().is_primary()
    }

    /// Returns the primary key of this key's ancestor at `level`.
    ///
    /// A key already at or above `level` is returned unchanged, so elevation
    /// never produces a finer key than the receiver.
    ///
    /// # Errors
    ///
    /// * `KeyError::NotPrimary` - the receiver is a wildcard key
    /// * `KeyError::InvalidArgument` - `level` is not `Team` or `Event`
    pub fn elevate(&self, level: Level) -> KeyResult<CompositeKey> {
        if !self.is_primary() {
            return Err(KeyError::NotPrimary(self.full_id.clone()));
        }

        let shape = self.shape();
        match level {
            Level::Team if shape.player => Self::new(self.event_id(), self.team_id(), None),
            Level::Team => Ok(self.clone()),
            Level::Event if shape.team || shape.player => Self::new(self.event_id(), None, None),
            Level::Event => Ok(self.clone()),
            Level::Player => Err(KeyError::InvalidArgument(format!(
                "cannot elevate to level \"{level}\""
            ))),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.full_id)
    }
}

impl FromStr for CompositeKey {
    type Err = KeyError;

    /// Parses the `event:team:player` wire format by position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(':').collect();
        match segments.as_slice() {
            [event, team, player] => Self::new(*event, *team, *player),
            _ => Err(KeyError::InvalidArgument(format!(
                "expected \"event:team:player\", got \"{s}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_player_key() {
        let key = CompositeKey::new("5", "10", "3").unwrap();
        assert_eq!(key.shape().to_string(), "E:T:P");
        assert!(key.is_primary());
        assert_eq!(key.full_id(), "5:10:3");
        assert_eq!(key.to_string(), "5:10:3");
    }

    #[test]
    fn test_all_empty_is_invalid() {
        assert!(matches!(
            CompositeKey::new(None, None, None),
            Err(KeyError::InvalidKey)
        ));
        assert!(matches!(
            CompositeKey::new("", "", ""),
            Err(KeyError::InvalidKey)
        ));
    }

    #[test]
    fn test_absent_segments_normalized() {
        let a = CompositeKey::new("5", None, None).unwrap();
        let b = CompositeKey::new("5", "", "").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.full_id(), "5::");
        assert_eq!(a.shape().to_string(), "E::");
    }

    #[test]
    fn test_primary_shapes() {
        assert!(CompositeKey::event("5").unwrap().is_primary());
        assert!(CompositeKey::team("5", "10").unwrap().is_primary());
        assert!(CompositeKey::player("5", "10", "3").unwrap().is_primary());

        assert!(!CompositeKey::new(None, None, "3").unwrap().is_primary());
        assert!(!CompositeKey::new(None, "10", None).unwrap().is_primary());
        assert!(!CompositeKey::new("5", None, "3").unwrap().is_primary());
        assert!(!CompositeKey::new(None, "10", "3").unwrap().is_primary());
    }

    #[test]
    fn test_matches_shape() {
        let a = CompositeKey::team("5", "10").unwrap();
        let b = CompositeKey::team("6", "11").unwrap();
        let c = CompositeKey::event("5").unwrap();
        assert!(a.matches_shape(&b));
        assert!(!a.matches_shape(&c));
    }

    #[test]
    fn test_elevate_player_to_team() {
        let key = CompositeKey::player("5", "10", "3").unwrap();
        let team = key.elevate(Level::Team).unwrap();
        assert_eq!(team.shape().to_string(), "E:T:");
        assert_eq!(team.event_id(), "5");
        assert_eq!(team.team_id(), "10");

        // Already at team level
        assert_eq!(team.elevate(Level::Team).unwrap(), team);
    }

    #[test]
    fn test_elevate_to_event_is_idempotent() {
        let key = CompositeKey::player("5", "10", "3").unwrap();
        let event = key.elevate(Level::Event).unwrap();
        assert_eq!(event.shape().to_string(), "E::");
        assert_eq!(event.elevate(Level::Event).unwrap(), event);
    }

    #[test]
    fn test_elevate_never_refines() {
        let event = CompositeKey::event("5").unwrap();
        assert_eq!(event.elevate(Level::Team).unwrap(), event);
    }

    #[test]
    fn test_elevate_non_primary_fails() {
        let key = CompositeKey::new(None, None, "9").unwrap();
        assert!(matches!(key.elevate(Level::Team), Err(KeyError::NotPrimary(_))));
        assert!(matches!(key.elevate(Level::Event), Err(KeyError::NotPrimary(_))));
    }

    #[test]
    fn test_elevate_to_player_is_invalid() {
        let key = CompositeKey::player("5", "10", "3").unwrap();
        assert!(matches!(
            key.elevate(Level::Player),
            Err(KeyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_round_trip() {
        let key: CompositeKey = "5:10:3".parse().unwrap();
        assert_eq!(key.event_id(), "5");
        assert_eq!(key.team_id(), "10");
        assert_eq!(key.player_id(), "3");

        let wildcard: CompositeKey = "::9".parse().unwrap();
        assert_eq!(wildcard.shape().to_string(), "::P");

        assert!("5:10".parse::<CompositeKey>().is_err());
        assert!("::".parse::<CompositeKey>().is_err());
    }

    #[test]
    fn test_project() {
        let shape = KeyShape::new(false, false, true);
        assert_eq!(shape.project("5", "10", "9"), "::9");
        assert_eq!(KeyShape::TEAM.project("5", "10", "9"), "5:10:");
    }

    #[test]
    fn test_separator_in_segment_rejected() {
        assert!(matches!(
            CompositeKey::new("a:b", "c", None),
            Err(KeyError::InvalidArgument(_))
        ));
        assert!(matches!(
            CompositeKey::new("a", "b:c", None),
            Err(KeyError::InvalidArgument(_))
        ));
        assert!(CompositeKey::new(None, None, ":").is_err());
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[0-9]{1,4}"]
    }

    fn segment_with_separator() -> impl Strategy<Value = String> {
        "[0-9]{0,2}:[0-9:]{0,2}"
    }

    proptest! {
        #[test]
        fn prop_shape_marks_set_positions(e in segment(), t in segment(), p in segment()) {
            let result = CompositeKey::new(e.as_str(), t.as_str(), p.as_str());
            if e.is_empty() && t.is_empty() && p.is_empty() {
                prop_assert!(matches!(result, Err(KeyError::InvalidKey)));
            } else {
                let key = result.unwrap();
                let shape = key.shape();
                prop_assert_eq!(shape.event, !e.is_empty());
                prop_assert_eq!(shape.team, !t.is_empty());
                prop_assert_eq!(shape.player, !p.is_empty());

                let parsed: CompositeKey = key.full_id().parse().unwrap();
                prop_assert_eq!(parsed, key);
            }
        }

        #[test]
        fn prop_separator_never_accepted(
            bad in segment_with_separator(),
            t in segment(),
            p in segment(),
            position in 0usize..3,
        ) {
            let result = match position {
                0 => CompositeKey::new(bad.as_str(), t.as_str(), p.as_str()),
                1 => CompositeKey::new(t.as_str(), bad.as_str(), p.as_str()),
                _ => CompositeKey::new(t.as_str(), p.as_str(), bad.as_str()),
            };
            prop_assert!(matches!(result, Err(KeyError::InvalidArgument(_))));
        }
    }
}
