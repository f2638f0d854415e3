// Position Allocator

use crate::domain::Position;
use crate::error::Result;
use crate::port::QueueTransaction;

/// Append position following `max_waiting` (1 for an empty queue)
pub fn next_position(max_waiting: Option<Position>) -> Position {
    max_waiting.map_or(1, |max| max + 1)
}

/// Allocate the next append position.
///
/// Must run inside the transaction that inserts the entry; the transaction's
/// write exclusion is what keeps two enqueues from reading the same maximum.
pub async fn allocate_next_position(tx: &mut dyn QueueTransaction) -> Result<Position> {
    let max = tx.max_waiting_position().await?;
    Ok(next_position(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_queue_starts_at_one() {
        assert_eq!(next_position(None), 1);
    }

    #[test]
    fn test_appends_after_max() {
        assert_eq!(next_position(Some(4)), 5);
    }
}
