//! # Roster Verify
//!
//! Eligibility tracking for tournament events, the teams registered at them,
//! and the players on each team's roster.
//!
//! Every row is addressed by a three-segment [`CompositeKey`]
//! (`event:team:player`). Keys with empty segments act as wildcards and are
//! expanded into the primary keys they cover before anything is loaded.
//!
//! ## Core Modules
//!
//! - [`model`]: keys, verification status and the event/team/player entities
//! - [`db`]: the [`TournamentStore`] trait, its PostgreSQL and in-memory
//!   implementations, and connection pool setup
//! - [`registry`]: key expansion, hierarchical batch loading and
//!   transactional verification updates
//! - [`remote`]: connectors to the platform events originate on
//!
//! ## Loading
//!
//! Loading a batch of players loads their teams first, which loads the teams'
//! events first. Each level issues one query for the whole batch, so a parent
//! shared by many children is fetched once.
//!
//! ## Example
//!
//! ```
//! use roster_verify::{CompositeKey, Level};
//!
//! let key: CompositeKey = "5:10:3".parse().unwrap();
//! assert!(key.is_primary());
//! assert_eq!(key.elevate(Level::Team).unwrap().full_id(), "5:10:");
//! ```

/// Storage backends and connection pool.
pub mod db;
pub use db::{
    Database, DatabaseConfig, EventTeamFilter, MemoryStore, PgTournamentStore, StoreError,
    TournamentStore,
};

/// Keys, statuses and entities.
pub mod model;
pub use model::{
    CompositeKey, Event, KeyError, KeyShape, Level, Player, Team, Verification,
    VerificationStatus,
};

/// Batch loading and verification updates.
pub mod registry;
pub use registry::{
    HierarchicalLoader, KeyExpander, RegistryError, RegistryManager, RegistryResult,
    TransactionalUpdater, UpdateOutcome,
};

/// Remote platform connectors.
pub mod remote;
pub use remote::{JsonFeedConnector, RemoteConnector, StubConnector};
