use alloc::rc::Rc;

use crate::*;

/// Applies one engine batch to the session as a single commit.
///
/// On failure nothing is committed and the session keeps its previous snapshot.
pub fn apply_batch(session: &mut BoardSession, batch: &ChangeBatch) -> Result<Rc<BoardSnapshot>> {
    let mut transaction = session.begin();
    stage_batch(&mut transaction, batch).inspect_err(|err| {
        log::error!("rejected batch with {} changes: {}", batch.changes.len(), err);
    })?;
    Ok(session.commit(transaction))
}

/// Stages counters, the reported phase and every cell patch, in that order.
///
/// Patches run in array order, so a later entry for the same cell wins field by field.
pub fn stage_batch(transaction: &mut Transaction, batch: &ChangeBatch) -> Result<()> {
    transaction.set_counters(Counters::from(batch));

    if let Some(outcome) = SessionPhase::from_reported(batch.game_state) {
        transaction.apply_outcome(outcome)?;
    }

    for patch in &batch.changes {
        log::trace!(
            "patch ({}, {}): state {:?}, value {:?}",
            patch.x,
            patch.y,
            patch.state,
            patch.value
        );
        transaction.patch(patch)?;
    }

    Ok(())
}
