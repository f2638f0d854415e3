// Queue Entry Domain Model

use crate::domain::catalog::ServiceId;
use crate::domain::error::DomainError;
use crate::domain::user::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Queue entry ID (assigned by the store)
pub type EntryId = i64;

/// 1-based rank among waiting entries
pub type Position = i64;

/// Entry lifecycle status
///
/// `Waiting` is the only non-terminal status. Once an entry is `Completed` or
/// `Cancelled` it never returns to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Waiting,
    Completed,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Waiting => "waiting",
            EntryStatus::Completed => "completed",
            EntryStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Waiting)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(EntryStatus::Waiting),
            "completed" => Ok(EntryStatus::Completed),
            "cancelled" => Ok(EntryStatus::Cancelled),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Terminal status a waiting entry can be moved into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    Completed,
    Cancelled,
}

impl Termination {
    pub fn status(self) -> EntryStatus {
        match self {
            Termination::Completed => EntryStatus::Completed,
            Termination::Cancelled => EntryStatus::Cancelled,
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status().as_str())
    }
}

impl FromStr for Termination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<EntryStatus>()? {
            EntryStatus::Completed => Ok(Termination::Completed),
            EntryStatus::Cancelled => Ok(Termination::Cancelled),
            EntryStatus::Waiting => Err(DomainError::InvalidStatus(
                "waiting is not a terminal status".to_string(),
            )),
        }
    }
}

/// Manual reorder direction (up = towards position 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(DomainError::InvalidDirection(other.to_string())),
        }
    }
}

/// Queue Entry Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub scheduled_time: i64, // epoch ms
    pub status: EntryStatus,
    /// Only meaningful while `status` is `Waiting`
    pub position: Position,
    pub created_at: i64, // epoch ms
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == EntryStatus::Waiting
    }
}

/// Entry about to be inserted (position already allocated)
#[derive(Debug, Clone)]
pub struct NewQueueEntry {
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub scheduled_time: i64,
    pub position: Position,
    pub created_at: i64,
}

/// Target position for one waiting entry, produced by the ordering engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAssignment {
    pub entry_id: EntryId,
    pub position: Position,
}

/// Client display fields joined onto a board listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub full_name: String,
    pub username: Option<String>,
}

/// Read-side view of a waiting entry with display data.
///
/// The joined fields are a presentation convenience; ordering is carried by
/// `entry.position` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub entry: QueueEntry,
    pub service_name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    /// Present on board listings, absent on a client's own listing
    pub client: Option<ClientInfo>,
}
