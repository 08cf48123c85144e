use alloc::string::String;
use thiserror::Error;

use crate::*;

/// Failure of a request sent to the authoritative engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineRequestError {
    #[error("Engine request failed: {0}")]
    Failed(String),
    #[error("Engine response was malformed: {0}")]
    Malformed(String),
}

pub type EngineResult<T> = core::result::Result<T, EngineRequestError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Cell ({x}, {y}) is outside of the board")]
    OutOfBounds { x: Coord, y: Coord },
    #[error("Cell ({x}, {y}) cannot hold value {value}")]
    InvalidCellValue { x: Coord, y: Coord, value: u8 },
    #[error("Board was already generated for this session")]
    DuplicateGeneration,
    #[error("Board table does not match declared size {width}x{height}")]
    InvalidBoardShape { width: Coord, height: Coord },
    #[error("Cannot go from {from:?} to {to:?}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },
    #[error("Another engine round trip is still outstanding")]
    RoundTripOutstanding,
    #[error(transparent)]
    Engine(#[from] EngineRequestError),
}

impl SyncError {
    /// Whether the session is still usable after this error.
    ///
    /// Grid errors point at a mismatch between engine and client and end the session.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::RoundTripOutstanding | Self::Engine(_)
        )
    }
}

pub type Result<T> = core::result::Result<T, SyncError>;
