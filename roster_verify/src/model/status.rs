//! Verification status of teams and players.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{KeyError, KeyResult};

/// Eligibility verification outcome.
///
/// The numeric code is the persisted representation and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Eligible,
    NoData,
    Questionable,
    Ineligible,
}

impl VerificationStatus {
    /// Every status in code order
    pub const ALL: [VerificationStatus; 5] = [
        VerificationStatus::Unverified,
        VerificationStatus::Eligible,
        VerificationStatus::NoData,
        VerificationStatus::Questionable,
        VerificationStatus::Ineligible,
    ];

    pub fn code(self) -> i16 {
        match self {
            VerificationStatus::Unverified => 0,
            VerificationStatus::Eligible => 1,
            VerificationStatus::NoData => 2,
            VerificationStatus::Questionable => 3,
            VerificationStatus::Ineligible => 4,
        }
    }

    /// Decodes a persisted status code.
    ///
    /// # Errors
    ///
    /// * `KeyError::InvalidArgument` - the code is outside 0..=4
    pub fn from_code(code: i16) -> KeyResult<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| {
                KeyError::InvalidArgument(format!("unknown verification status code {code}"))
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "Unverified",
            VerificationStatus::Eligible => "Eligible",
            VerificationStatus::NoData => "No Data",
            VerificationStatus::Questionable => "Questionable",
            VerificationStatus::Ineligible => "Ineligible",
        }
    }

    /// Display color as `#rrggbb`.
    pub fn color_hex(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "#ffffff",
            VerificationStatus::Eligible => "#34A853",
            VerificationStatus::NoData => "#FBBC04",
            VerificationStatus::Questionable => "#FF6D01",
            VerificationStatus::Ineligible => "#EA4335",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VerificationStatus {
    type Err = KeyError;

    /// Accepts the label, the variant name, or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        if let Ok(code) = normalized.parse::<i16>() {
            return Self::from_code(code);
        }

        Self::ALL
            .into_iter()
            .find(|status| status.label().replace(' ', "").to_ascii_lowercase() == normalized)
            .ok_or_else(|| KeyError::InvalidArgument(format!("unknown verification status \"{s}\"")))
    }
}
