use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use serde::{Deserialize, Serialize};

use crate::*;

/// A request as it reached the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCall {
    GenerateBoard(GenerateBoard),
    Poke(Coord2),
    Mark(Coord2),
    SetGameSettings(GameSettings),
}

/// Engine that answers from a recorded transcript instead of playing the game.
///
/// Boards are handed out in order to `generate_board`, batches in order to `poke` and `mark` alike. Every request
/// is recorded, including the ones that fail.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    boards: RefCell<VecDeque<CellRows>>,
    batches: RefCell<VecDeque<ChangeBatch>>,
    next_failure: RefCell<Option<EngineRequestError>>,
    calls: RefCell<Vec<EngineCall>>,
}

impl ScriptedEngine {
    pub fn new(
        boards: impl IntoIterator<Item = CellRows>,
        batches: impl IntoIterator<Item = ChangeBatch>,
    ) -> Self {
        Self {
            boards: RefCell::new(boards.into_iter().collect()),
            batches: RefCell::new(batches.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn push_board(&self, rows: CellRows) {
        self.boards.borrow_mut().push_back(rows);
    }

    pub fn push_batch(&self, batch: ChangeBatch) {
        self.batches.borrow_mut().push_back(batch);
    }

    /// Makes the next request fail with `error`, whatever it is.
    pub fn fail_next(&self, error: EngineRequestError) {
        self.next_failure.replace(Some(error));
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    pub fn pending_batches(&self) -> usize {
        self.batches.borrow().len()
    }

    fn record(&self, call: EngineCall) -> EngineResult<()> {
        log::trace!("engine call: {:?}", call);
        self.calls.borrow_mut().push(call);
        match self.next_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_batch(&self) -> EngineResult<ChangeBatch> {
        self.batches
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| EngineRequestError::Failed("transcript has no batch left".to_string()))
    }
}

impl GameEngine for ScriptedEngine {
    async fn generate_board(&self, request: GenerateBoard) -> EngineResult<CellRows> {
        self.record(EngineCall::GenerateBoard(request))?;
        self.boards
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| EngineRequestError::Failed("transcript has no board left".to_string()))
    }

    async fn poke(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch> {
        self.record(EngineCall::Poke((x, y)))?;
        self.next_batch()
    }

    async fn mark(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch> {
        self.record(EngineCall::Mark((x, y)))?;
        self.next_batch()
    }

    async fn set_game_settings(&self, settings: GameSettings) -> EngineResult<()> {
        self.record(EngineCall::SetGameSettings(settings))
    }
}

/// Board of `height` rows of `width` hidden, zero-valued cells.
pub fn hidden_board(width: Coord, height: Coord) -> CellRows {
    vec![vec![Cell::default(); usize::from(width)]; usize::from(height)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn answers_in_order_and_records_calls() {
        let first = ChangeBatch {
            flag_count: 1,
            ..Default::default()
        };
        let second = ChangeBatch {
            flag_count: 2,
            ..Default::default()
        };
        let engine = ScriptedEngine::new([hidden_board(4, 4)], [first.clone(), second.clone()]);

        assert_eq!(block_on(engine.mark(1, 1)), Ok(first));
        assert_eq!(block_on(engine.poke(2, 2)), Ok(second));
        assert!(block_on(engine.poke(2, 2)).is_err());
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Mark((1, 1)),
                EngineCall::Poke((2, 2)),
                EngineCall::Poke((2, 2)),
            ]
        );
    }

    #[test]
    fn injected_failure_hits_only_the_next_request() {
        let engine = ScriptedEngine::default();
        engine.fail_next(EngineRequestError::Failed("offline".to_string()));

        assert_eq!(
            block_on(engine.set_game_settings(GameSettings::default())),
            Err(EngineRequestError::Failed("offline".to_string()))
        );
        assert_eq!(block_on(engine.set_game_settings(GameSettings::default())), Ok(()));
        assert_eq!(engine.calls().len(), 2);
    }

    #[test]
    fn failed_request_keeps_scripted_answer() {
        let engine = ScriptedEngine::new([hidden_board(1, 1)], [ChangeBatch::default()]);
        engine.fail_next(EngineRequestError::Failed("timeout".to_string()));

        assert!(block_on(engine.poke(0, 0)).is_err());
        assert_eq!(engine.pending_batches(), 1);
        assert!(block_on(engine.poke(0, 0)).is_ok());
    }

    #[test]
    fn hidden_board_is_row_major() {
        let rows = hidden_board(3, 2);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 3));
    }
}
