//! Domain model: composite keys, verification status and the event/team/player
//! entities the registry hands out.

pub mod entities;
pub mod errors;
pub mod key;
pub mod status;

pub use entities::{Event, Player, Team, Verification};
pub use errors::{KeyError, KeyResult};
pub use key::{CompositeKey, KeyShape, Level};
pub use status::VerificationStatus;
