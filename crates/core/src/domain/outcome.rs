// Mutation outcomes
//
// A rejected precondition is an expected result, not an error. Store failures
// travel separately as `AppError`.

use serde::{Deserialize, Serialize};

/// Why a mutation was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    EntryNotFound,
    NotWaiting,
    NotOwner,
    AlreadyFirst,
    AlreadyLast,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::EntryNotFound => write!(f, "entry_not_found"),
            Rejection::NotWaiting => write!(f, "not_waiting"),
            Rejection::NotOwner => write!(f, "not_owner"),
            Rejection::AlreadyFirst => write!(f, "already_first"),
            Rejection::AlreadyLast => write!(f, "already_last"),
        }
    }
}

/// Result of a queue mutation that reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Applied => None,
            Outcome::Rejected(r) => Some(*r),
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(r: Rejection) -> Self {
        Outcome::Rejected(r)
    }
}
