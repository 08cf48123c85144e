//! Messages exchanged between the board client and the authoritative engine.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u16;

/// Count type used for mine counts and cell counts.
pub type CellCount = u32;

/// Cell value the engine uses to denote a mine.
pub const MINE_VALUE: u8 = 9;

/// Player-visible state of a cell, named as the engine names them on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Questioned,
    #[serde(rename = "ShowValue")]
    Revealed,
    #[serde(rename = "ShowInvalidMine")]
    RevealedInvalidMine,
    #[serde(rename = "ShowMineExploded")]
    RevealedExplodedMine,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(
            self,
            Self::Revealed | Self::RevealedInvalidMine | Self::RevealedExplodedMine
        )
    }

    pub const fn is_marked(self) -> bool {
        matches!(self, Self::Flagged | Self::Questioned)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Locally known state of one grid position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub state: CellState,
    /// Adjacent mine count, or [`MINE_VALUE`]. Only meaningful once revealed.
    pub value: u8,
}

impl Cell {
    pub const fn new(state: CellState, value: u8) -> Self {
        Self { state, value }
    }

    pub const fn revealed_value(self) -> Option<u8> {
        if self.state.is_revealed() {
            Some(self.value)
        } else {
            None
        }
    }

    pub const fn is_revealed_mine(self) -> bool {
        self.state.is_revealed() && self.value == MINE_VALUE
    }
}

/// Field-level update of a single cell. Absent fields are left untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPatch {
    pub x: Coord,
    pub y: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CellState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
}

impl CellPatch {
    pub const fn state(x: Coord, y: Coord, state: CellState) -> Self {
        Self {
            x,
            y,
            state: Some(state),
            value: None,
        }
    }

    pub const fn value(x: Coord, y: Coord, value: u8) -> Self {
        Self {
            x,
            y,
            state: None,
            value: Some(value),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.state.is_none() && self.value.is_none()
    }
}

/// Game state as reported by the engine at the end of a batch.
///
/// Anything the client does not act on (including `"BeforeGame"`) decodes as
/// [`ReportedState::Unchanged`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportedState {
    Playing,
    GameOver,
    GameWon,
    #[default]
    Unchanged,
}

impl From<String> for ReportedState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Playing" => Self::Playing,
            "GameOver" => Self::GameOver,
            "GameWon" => Self::GameWon,
            _ => Self::Unchanged,
        }
    }
}

impl From<ReportedState> for String {
    fn from(value: ReportedState) -> Self {
        match value {
            ReportedState::Playing => "Playing",
            ReportedState::GameOver => "GameOver",
            ReportedState::GameWon => "GameWon",
            ReportedState::Unchanged => "Unchanged",
        }
        .to_string()
    }
}

/// One atomic unit of authoritative updates sent in reply to a poke or a mark.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub hidden_cell_count: CellCount,
    pub flag_count: CellCount,
    pub mines_remaining: i32,
    #[serde(default)]
    pub game_state: ReportedState,
    #[serde(default)]
    pub changes: Vec<CellPatch>,
}

impl ChangeBatch {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Parameters of the one-shot board generation request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBoard {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    pub first_x: Coord,
    pub first_y: Coord,
}

/// Row-major table of cells as returned by board generation: `height` rows of `width` cells.
pub type CellRows = Vec<Vec<Cell>>;

/// Gameplay options pushed to the engine whenever a game screen is entered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Flagged cells cycle through a question mark before going back to hidden.
    pub questions_enabled: bool,
    /// Poking a revealed number uncovers its neighbors.
    pub quick_uncover: bool,
    /// Quick uncover only fires when the number of adjacent flags matches.
    pub protected_quick_uncover: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            questions_enabled: true,
            quick_uncover: true,
            protected_quick_uncover: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_states_use_engine_names() {
        let json = r#"[
            {"state": "Hidden", "value": 0},
            {"state": "ShowValue", "value": 3},
            {"state": "ShowMineExploded", "value": 9}
        ]"#;

        let cells: Vec<Cell> = serde_json::from_str(json).unwrap();

        assert_eq!(cells[0], Cell::default());
        assert_eq!(cells[1].revealed_value(), Some(3));
        assert_eq!(cells[2].state, CellState::RevealedExplodedMine);
        assert!(cells[2].is_revealed_mine());
        assert_eq!(
            serde_json::to_string(&CellState::RevealedInvalidMine).unwrap(),
            r#""ShowInvalidMine""#
        );
    }

    #[test]
    fn hidden_cell_hides_its_value() {
        let cell = Cell::new(CellState::Flagged, 9);

        assert_eq!(cell.revealed_value(), None);
        assert!(!cell.is_revealed_mine());
        assert!(cell.state.is_marked());
    }

    #[test]
    fn patch_distinguishes_zero_value_from_absent() {
        let batch = ChangeBatch::from_json(
            r#"{
                "hidden_cell_count": 40,
                "flag_count": 1,
                "mines_remaining": 9,
                "game_state": "Playing",
                "changes": [
                    {"x": 1, "y": 2, "state": "ShowValue", "value": 0},
                    {"x": 3, "y": 4, "state": null, "value": null},
                    {"x": 5, "y": 6, "state": "Flagged"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(batch.game_state, ReportedState::Playing);
        assert_eq!(batch.changes[0].value, Some(0));
        assert!(batch.changes[1].is_empty());
        assert_eq!(batch.changes[2], CellPatch::state(5, 6, CellState::Flagged));
    }

    #[test]
    fn unknown_or_missing_game_state_is_unchanged() {
        let before_game = ChangeBatch::from_json(
            r#"{"hidden_cell_count": 1, "flag_count": 0, "mines_remaining": 1,
                "game_state": "BeforeGame", "changes": []}"#,
        )
        .unwrap();
        let missing = ChangeBatch::from_json(
            r#"{"hidden_cell_count": 1, "flag_count": 0, "mines_remaining": -2}"#,
        )
        .unwrap();

        assert_eq!(before_game.game_state, ReportedState::Unchanged);
        assert_eq!(missing.game_state, ReportedState::Unchanged);
        assert_eq!(missing.mines_remaining, -2);
        assert!(missing.changes.is_empty());
    }

    #[test]
    fn absent_patch_fields_are_not_serialized() {
        let json = serde_json::to_string(&CellPatch::value(0, 1, 2)).unwrap();

        assert_eq!(json, r#"{"x":0,"y":1,"value":2}"#);
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: GameSettings =
            serde_json::from_str(r#"{"questions_enabled": false}"#).unwrap();

        assert!(!settings.questions_enabled);
        assert!(settings.quick_uncover);
        assert!(settings.protected_quick_uncover);
    }
}
