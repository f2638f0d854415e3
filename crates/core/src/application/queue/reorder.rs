// Reorder Engine - compacts waiting positions to {1..N} after a removal

use crate::domain::{EntryId, Position, PositionAssignment};
use crate::error::Result;
use crate::port::QueueTransaction;
use tracing::debug;

/// Assignments that renumber `waiting` to 1..N, keeping relative order.
///
/// Only entries whose position changes are returned, so an already compact
/// sequence yields nothing.
pub fn compact(waiting: &[(EntryId, Position)]) -> Vec<PositionAssignment> {
    let mut ordered = waiting.to_vec();
    ordered.sort_by_key(|&(_, position)| position);

    ordered
        .into_iter()
        .zip(1..)
        .filter(|&((_, current), target)| current != target)
        .map(|((entry_id, _), position)| PositionAssignment { entry_id, position })
        .collect()
}

/// Renumber the remaining waiting entries inside `tx`.
///
/// Returns the number of entries whose position changed.
pub async fn reorder_after_removal(tx: &mut dyn QueueTransaction) -> Result<usize> {
    let waiting = tx.waiting_positions().await?;
    let changes = compact(&waiting);

    if !changes.is_empty() {
        tx.assign_positions(&changes).await?;
    }

    debug!(
        waiting = waiting.len(),
        renumbered = changes.len(),
        "Reorder pass completed"
    );
    Ok(changes.len())
}
