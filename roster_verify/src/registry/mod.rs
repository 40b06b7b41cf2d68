//! Registry: batch loading, key expansion and verification updates over a
//! `TournamentStore`.

pub mod errors;
pub mod expander;
pub mod loader;
pub mod manager;
pub mod updater;

pub use errors::{RegistryError, RegistryResult};
pub use expander::KeyExpander;
pub use loader::{EntityMap, HierarchicalLoader, RECENT_PARTICIPATION_MONTHS};
pub use manager::RegistryManager;
pub use updater::{TransactionalUpdater, UpdateOutcome};
