// Waitline Infrastructure - SQLite Adapter
// Implements: QueueRepository, TransactionalQueueRepository, UserDirectory, ServiceCatalog

mod connection;
mod error;
mod migration;
mod queue_repository;
mod service_catalog;
mod transaction;
mod user_directory;

pub use connection::{create_pool, BUSY_TIMEOUT};
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use service_catalog::SqliteServiceCatalog;
pub use transaction::SqliteQueueTransaction;
pub use user_directory::SqliteUserDirectory;
