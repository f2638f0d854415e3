// Swap Engine - manual up/down moves as adjacent transpositions

use crate::domain::{
    Direction, EntryId, Outcome, Position, PositionAssignment, Rejection,
};
use crate::error::Result;
use crate::port::QueueTransaction;
use tracing::{debug, warn};

/// Position the mover would take, or why it cannot move
pub fn target_position(
    current: Position,
    direction: Direction,
    max_waiting: Position,
) -> std::result::Result<Position, Rejection> {
    match direction {
        Direction::Up if current <= 1 => Err(Rejection::AlreadyFirst),
        Direction::Up => Ok(current - 1),
        Direction::Down if current >= max_waiting => Err(Rejection::AlreadyLast),
        Direction::Down => Ok(current + 1),
    }
}

/// Writes for moving `mover` from `from` to `to`, handing `from` to the partner
pub fn swap_assignments(
    mover: EntryId,
    from: Position,
    to: Position,
    partner: Option<EntryId>,
) -> Vec<PositionAssignment> {
    let mut assignments = vec![PositionAssignment {
        entry_id: mover,
        position: to,
    }];
    if let Some(partner) = partner {
        assignments.push(PositionAssignment {
            entry_id: partner,
            position: from,
        });
    }
    assignments
}

/// Move a waiting entry one rank inside `tx`.
///
/// Rejections leave the transaction untouched.
pub async fn move_within(
    tx: &mut dyn QueueTransaction,
    entry_id: EntryId,
    direction: Direction,
) -> Result<Outcome> {
    let Some(entry) = tx.find_by_id(entry_id).await? else {
        return Ok(Rejection::EntryNotFound.into());
    };
    if !entry.is_waiting() {
        return Ok(Rejection::NotWaiting.into());
    }

    let max_waiting = tx
        .max_waiting_position()
        .await?
        .unwrap_or(entry.position);
    let target = match target_position(entry.position, direction, max_waiting) {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };

    let partner = tx.find_waiting_at(target).await?;
    if partner.is_none() {
        warn!(
            entry_id = entry_id,
            target = target,
            "No waiting entry at target position, moving without a swap partner"
        );
    }

    tx.assign_positions(&swap_assignments(entry_id, entry.position, target, partner))
        .await?;

    debug!(
        entry_id = entry_id,
        from = entry.position,
        to = target,
        partner = ?partner,
        "Swapped adjacent entries"
    );
    Ok(Outcome::Applied)
}
