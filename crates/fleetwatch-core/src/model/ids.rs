// ── Numeric identities ──
//
// Units are numbered by the tracking API, clients by the operator. Both
// serialize as bare integers so persisted documents stay compatible with
// other readers of the same store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device id assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

/// Operator-assigned client id. `0` means "not assigned yet".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl ClientId {
    pub fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

macro_rules! numeric_id {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $ty {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $ty {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(UnitId);
numeric_id!(ClientId);
