#![no_std]

extern crate alloc;

pub use applier::*;
pub use config::*;
pub use dispatcher::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use scripted::*;
pub use session::*;
pub use types::*;

pub use customines_protocol::{
    Cell, CellPatch, CellRows, CellState, ChangeBatch, GameSettings, GenerateBoard, MINE_VALUE,
    ReportedState,
};

mod applier;
mod config;
mod dispatcher;
mod engine;
mod error;
mod grid;
mod scripted;
mod session;
mod types;
