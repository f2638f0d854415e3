// Termination Use Cases (complete / cancel)

use crate::application::queue::reorder;
use crate::domain::{EntryId, EntryStatus, Outcome, Rejection, Termination, UserId};
use crate::error::Result;
use crate::port::QueueTransaction;

/// Move an entry into a terminal status and renumber the rest inside `tx`.
///
/// With `owner` set, the entry must belong to that user and still be waiting.
/// Without it, repeating the entry's current terminal status is an applied
/// no-op; switching between terminal statuses is rejected.
pub async fn terminate_within(
    tx: &mut dyn QueueTransaction,
    entry_id: EntryId,
    termination: Termination,
    owner: Option<UserId>,
) -> Result<Outcome> {
    let Some(entry) = tx.find_by_id(entry_id).await? else {
        return Ok(Rejection::EntryNotFound.into());
    };
    if owner.is_some_and(|owner| owner != entry.user_id) {
        return Ok(Rejection::NotOwner.into());
    }

    let target = termination.status();
    match entry.status {
        EntryStatus::Waiting => {
            if !tx
                .update_status(entry_id, EntryStatus::Waiting, target)
                .await?
            {
                return Ok(Rejection::NotWaiting.into());
            }
        }
        current if current == target && owner.is_none() => {}
        _ => return Ok(Rejection::NotWaiting.into()),
    }

    reorder::reorder_after_removal(tx).await?;
    Ok(Outcome::Applied)
}
