// Application Layer - Use Cases and the queue ordering engine

pub mod queue;

// Re-exports
pub use queue::{EnqueueRequest, IntegrityReport, QueueService};
