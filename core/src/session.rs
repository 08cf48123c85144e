use alloc::rc::Rc;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - BeforeGame -> Playing
/// - Playing -> Paused
/// - Paused -> Playing
/// - Playing -> GameOver
/// - Playing -> GameWon
/// - any -> BeforeGame, on reset
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Board not generated yet, waiting for the first reveal
    BeforeGame,
    Playing,
    /// Only entered through an external pause control
    Paused,
    GameOver,
    GameWon,
}

impl SessionPhase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::GameWon)
    }

    pub const fn accepts_reveal(self) -> bool {
        matches!(self, Self::BeforeGame | Self::Playing)
    }

    pub const fn accepts_mark(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Phase the engine asks for at the end of a batch, if any.
    pub const fn from_reported(state: ReportedState) -> Option<Self> {
        match state {
            ReportedState::Playing => Some(Self::Playing),
            ReportedState::GameOver => Some(Self::GameOver),
            ReportedState::GameWon => Some(Self::GameWon),
            ReportedState::Unchanged => None,
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::BeforeGame
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    MainMenu,
    Game,
}

impl Default for Screen {
    fn default() -> Self {
        Self::MainMenu
    }
}

/// Follow-up a navigation asks of whoever can talk to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavigateEffect {
    None,
    PushSettings,
}

impl NavigateEffect {
    pub const fn pushes_settings(self) -> bool {
        matches!(self, Self::PushSettings)
    }
}

/// Session-level counters, replaced wholesale by every batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub hidden_cell_count: CellCount,
    pub flag_count: CellCount,
    /// Negative once more flags than mines are placed.
    pub mines_remaining: i32,
}

impl Counters {
    /// What a fresh game screen shows before the engine has said anything.
    pub fn initial(board: &BoardConfig) -> Self {
        Self {
            hidden_cell_count: board.total_cells(),
            flag_count: 0,
            mines_remaining: i32::try_from(board.mines).unwrap_or(i32::MAX),
        }
    }
}

impl From<&ChangeBatch> for Counters {
    fn from(batch: &ChangeBatch) -> Self {
        Self {
            hidden_cell_count: batch.hidden_cell_count,
            flag_count: batch.flag_count,
            mines_remaining: batch.mines_remaining,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: SessionPhase,
    screen: Screen,
}

impl PhaseMachine {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn begin_playing(&mut self) -> Result<()> {
        self.transition(SessionPhase::BeforeGame, SessionPhase::Playing)
    }

    /// Applies the phase reported by the engine.
    ///
    /// Reporting the current phase again is a no-op, the engine repeats its state in every batch.
    pub fn apply_outcome(&mut self, outcome: SessionPhase) -> Result<()> {
        use SessionPhase::*;

        match (self.phase, outcome) {
            (_, BeforeGame | Paused) => Err(SyncError::InvalidTransition {
                from: self.phase,
                to: outcome,
            }),
            (current, target) if current == target => Ok(()),
            (Playing, GameOver | GameWon) => {
                log::debug!("game ended: {:?}", outcome);
                self.phase = outcome;
                Ok(())
            }
            (from, to) => Err(SyncError::InvalidTransition { from, to }),
        }
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Paused {
            return Ok(());
        }
        self.transition(SessionPhase::Playing, SessionPhase::Paused)
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Playing {
            return Ok(());
        }
        self.transition(SessionPhase::Paused, SessionPhase::Playing)
    }

    pub fn reset_for_new_game(&mut self) {
        self.phase = SessionPhase::BeforeGame;
    }

    /// Switches screens. Both directions start over: the game screen always opens on a fresh board.
    pub fn navigate(&mut self, screen: Screen) -> NavigateEffect {
        self.screen = screen;
        self.reset_for_new_game();
        match screen {
            Screen::Game => NavigateEffect::PushSettings,
            Screen::MainMenu => NavigateEffect::None,
        }
    }

    fn transition(&mut self, from: SessionPhase, to: SessionPhase) -> Result<()> {
        if self.phase != from {
            return Err(SyncError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }
}

/// Immutable view of a session as observers see it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    grid: Grid,
    machine: PhaseMachine,
    counters: Counters,
}

impl BoardSnapshot {
    pub fn read(&self, x: Coord, y: Coord) -> Cell {
        self.grid.read(x, y)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn screen(&self) -> Screen {
        self.machine.screen()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }
}

/// Staged copy of a snapshot. Nothing is visible until [`BoardSession::commit`] swaps it in, and dropping it
/// discards every staged change.
#[derive(Debug)]
#[must_use = "a transaction does nothing until it is committed"]
pub struct Transaction {
    staged: BoardSnapshot,
}

impl Transaction {
    pub fn staged(&self) -> &BoardSnapshot {
        &self.staged
    }

    pub fn populate(&mut self, width: Coord, height: Coord, rows: &[Vec<Cell>]) -> Result<()> {
        self.staged.grid.populate(width, height, rows)
    }

    pub fn patch(&mut self, patch: &CellPatch) -> Result<()> {
        self.staged
            .grid
            .patch(patch.x, patch.y, patch.state, patch.value)
    }

    pub fn set_counters(&mut self, counters: Counters) {
        self.staged.counters = counters;
    }

    pub fn begin_playing(&mut self) -> Result<()> {
        self.staged.machine.begin_playing()
    }

    pub fn apply_outcome(&mut self, outcome: SessionPhase) -> Result<()> {
        self.staged.machine.apply_outcome(outcome)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.staged.machine.pause()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.staged.machine.resume()
    }

    /// Back to BeforeGame with the board destroyed.
    pub fn reset_for_new_game(&mut self) {
        self.staged.machine.reset_for_new_game();
        self.staged.grid.clear();
        self.staged.counters = Counters::default();
    }

    pub fn navigate(&mut self, screen: Screen, board: &BoardConfig) -> NavigateEffect {
        let effect = self.staged.machine.navigate(screen);
        self.staged.grid.clear();
        self.staged.counters = match screen {
            Screen::Game => Counters::initial(board),
            Screen::MainMenu => Counters::default(),
        };
        effect
    }
}

/// The single owner of a game session's state.
///
/// Every change goes through a [`Transaction`], so readers only ever see whole commits.
#[derive(Debug, Default)]
pub struct BoardSession {
    snapshot: Rc<BoardSnapshot>,
    revision: u64,
}

impl BoardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Rc<BoardSnapshot> {
        Rc::clone(&self.snapshot)
    }

    /// Number of commits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn read(&self, x: Coord, y: Coord) -> Cell {
        self.snapshot.read(x, y)
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot.phase()
    }

    pub fn screen(&self) -> Screen {
        self.snapshot.screen()
    }

    pub fn counters(&self) -> Counters {
        self.snapshot.counters()
    }

    pub fn begin(&self) -> Transaction {
        Transaction {
            staged: BoardSnapshot::clone(&self.snapshot),
        }
    }

    pub fn commit(&mut self, transaction: Transaction) -> Rc<BoardSnapshot> {
        self.snapshot = Rc::new(transaction.staged);
        self.revision += 1;
        log::debug!(
            "commit #{}: {:?} on {:?}, {:?}",
            self.revision,
            self.snapshot.phase(),
            self.snapshot.screen(),
            self.snapshot.counters()
        );
        self.snapshot()
    }
}
