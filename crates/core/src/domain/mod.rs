// Domain Layer - Pure business logic and entities

pub mod catalog;
pub mod entry;
pub mod error;
pub mod outcome;
pub mod slot;
pub mod user;

// Re-exports
pub use catalog::{NewService, Service, ServiceId};
pub use entry::{
    ClientInfo, Direction, EntryId, EntryStatus, NewQueueEntry, Position, PositionAssignment,
    QueueEntry, QueueItem, Termination,
};
pub use error::DomainError;
pub use outcome::{Outcome, Rejection};
pub use user::{NewUser, User, UserId};
