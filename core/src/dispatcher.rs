use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell as FlagCell, RefCell};

use crate::*;

/// What became of a user intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Not allowed in the current phase, nothing was sent
    Ignored,
    /// The engine answered and its batch was committed
    Applied,
}

impl IntentOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Applied => true,
        }
    }
}

type Observer = Box<dyn Fn(&BoardSnapshot)>;

/// Marks an engine round trip as outstanding for as long as it lives.
struct RoundTrip<'a> {
    outstanding: &'a FlagCell<bool>,
}

impl<'a> RoundTrip<'a> {
    fn start(outstanding: &'a FlagCell<bool>) -> Result<Self> {
        if outstanding.replace(true) {
            log::warn!("intent rejected, a round trip is still outstanding");
            return Err(SyncError::RoundTripOutstanding);
        }
        Ok(Self { outstanding })
    }
}

impl Drop for RoundTrip<'_> {
    fn drop(&mut self) {
        self.outstanding.set(false);
    }
}

/// Turns user intents into engine requests and feeds the answers back into the session.
///
/// One intent is in flight at a time: anything arriving while a round trip is outstanding fails with
/// [`SyncError::RoundTripOutstanding`] and has no effect.
pub struct IntentDispatcher<E> {
    engine: E,
    session: RefCell<BoardSession>,
    config: RefCell<SessionConfig>,
    observers: RefCell<Vec<Observer>>,
    outstanding: FlagCell<bool>,
}

impl<E: GameEngine> IntentDispatcher<E> {
    pub fn new(engine: E, config: SessionConfig) -> Self {
        Self {
            engine,
            session: RefCell::new(BoardSession::new()),
            config: RefCell::new(config),
            observers: RefCell::new(Vec::new()),
            outstanding: FlagCell::new(false),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> SessionConfig {
        *self.config.borrow()
    }

    /// Edits the configuration the next generation and the next settings push will use.
    pub fn update_config(&self, update: impl FnOnce(&mut SessionConfig)) {
        update(&mut self.config.borrow_mut());
    }

    pub fn snapshot(&self) -> Rc<BoardSnapshot> {
        self.session.borrow().snapshot()
    }

    pub fn revision(&self) -> u64 {
        self.session.borrow().revision()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.borrow().phase()
    }

    pub fn screen(&self) -> Screen {
        self.session.borrow().screen()
    }

    pub fn counters(&self) -> Counters {
        self.session.borrow().counters()
    }

    pub fn read(&self, x: Coord, y: Coord) -> Cell {
        self.session.borrow().read(x, y)
    }

    pub fn is_round_trip_outstanding(&self) -> bool {
        self.outstanding.get()
    }

    /// Registers a callback run once per commit with the new snapshot.
    ///
    /// Callbacks may read from the dispatcher but must not subscribe from inside a notification.
    pub fn subscribe(&self, observer: impl Fn(&BoardSnapshot) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    /// Reveals a cell, generating the board first if this is the opening move. Ignored off the game screen.
    pub async fn reveal(&self, x: Coord, y: Coord) -> Result<IntentOutcome> {
        let _round_trip = RoundTrip::start(&self.outstanding)?;

        let (phase, screen) = (self.phase(), self.screen());
        if screen != Screen::Game || !phase.accepts_reveal() {
            log::warn!("ignoring reveal at ({}, {}) while {:?} on {:?}", x, y, phase, screen);
            return Ok(IntentOutcome::Ignored);
        }

        if phase == SessionPhase::BeforeGame {
            self.generate_board((x, y)).await?;
        }

        log::debug!("reveal ({}, {})", x, y);
        let batch = self.engine.poke(x, y).await.inspect_err(|err| {
            log::warn!("reveal at ({}, {}) abandoned: {}", x, y, err);
        })?;
        self.apply(&batch)?;
        Ok(IntentOutcome::Applied)
    }

    /// Advances the mark cycle of a cell. Only does anything while playing.
    pub async fn mark(&self, x: Coord, y: Coord) -> Result<IntentOutcome> {
        let _round_trip = RoundTrip::start(&self.outstanding)?;

        let phase = self.phase();
        if !phase.accepts_mark() {
            log::warn!("ignoring mark at ({}, {}) while {:?}", x, y, phase);
            return Ok(IntentOutcome::Ignored);
        }

        log::debug!("mark ({}, {})", x, y);
        let batch = self.engine.mark(x, y).await.inspect_err(|err| {
            log::warn!("mark at ({}, {}) abandoned: {}", x, y, err);
        })?;
        self.apply(&batch)?;
        Ok(IntentOutcome::Applied)
    }

    /// Switches screens, starting a fresh session either way.
    ///
    /// Entering the game screen pushes the current settings to the engine first, the switch is only committed
    /// once the engine has accepted them.
    pub async fn navigate(&self, screen: Screen) -> Result<NavigateEffect> {
        let _round_trip = RoundTrip::start(&self.outstanding)?;

        let SessionConfig { board, settings } = self.config();
        log::debug!("navigate to {:?}", screen);
        let mut transaction = self.session.borrow().begin();
        let effect = transaction.navigate(screen, &board);

        if effect.pushes_settings() {
            self.engine
                .set_game_settings(settings)
                .await
                .inspect_err(|err| log::warn!("could not push settings: {}", err))?;
        }

        let snapshot = self.session.borrow_mut().commit(transaction);
        self.publish(&snapshot);
        Ok(effect)
    }

    /// Pause control for collaborators outside of the board, the dispatcher never pauses on its own.
    pub fn set_paused(&self, paused: bool) -> Result<()> {
        if self.is_round_trip_outstanding() {
            return Err(SyncError::RoundTripOutstanding);
        }
        self.commit_with(|transaction| {
            if paused {
                transaction.pause()
            } else {
                transaction.resume()
            }
        })
    }

    async fn generate_board(&self, first: Coord2) -> Result<()> {
        let request = self.config().board.generate_request(first);
        log::debug!(
            "generate {}x{} board with {} mines around {:?}",
            request.width,
            request.height,
            request.mines,
            first
        );

        let rows = self
            .engine
            .generate_board(request)
            .await
            .inspect_err(|err| log::warn!("board generation failed: {}", err))?;
        check_board_shape(&rows, request.width, request.height)?;

        self.commit_with(|transaction| {
            transaction.populate(request.width, request.height, &rows)?;
            transaction.begin_playing()
        })
    }

    fn apply(&self, batch: &ChangeBatch) -> Result<()> {
        let snapshot = apply_batch(&mut self.session.borrow_mut(), batch)?;
        self.publish(&snapshot);
        Ok(())
    }

    fn commit_with<T>(&self, stage: impl FnOnce(&mut Transaction) -> Result<T>) -> Result<T> {
        let (value, snapshot) = {
            let mut session = self.session.borrow_mut();
            let mut transaction = session.begin();
            let value = stage(&mut transaction)?;
            (value, session.commit(transaction))
        };
        self.publish(&snapshot);
        Ok(value)
    }

    fn publish(&self, snapshot: &BoardSnapshot) {
        for observer in self.observers.borrow().iter() {
            observer(snapshot);
        }
    }
}

fn check_board_shape(rows: &[Vec<Cell>], width: Coord, height: Coord) -> EngineResult<()> {
    let actual_height = rows.len();
    let matches = actual_height == usize::from(height)
        && rows.iter().all(|row| row.len() == usize::from(width));
    if matches {
        Ok(())
    } else {
        Err(EngineRequestError::Malformed(format!(
            "expected {} rows of {} cells, got {} rows",
            height, width, actual_height
        )))
    }
}

impl<E> core::fmt::Debug for IntentDispatcher<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntentDispatcher")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("observers", &self.observers.borrow().len())
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}
