use serde::{Deserialize, Serialize};

use crate::*;

/// Board dimensions and mine count chosen on the main menu.
///
/// The adjusters keep the values inside the bounds the menu offers. Nothing downstream clamps them again, the
/// engine receives them as they are.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const MIN_SIDE: Coord = 4;
    pub const MAX_SIDE: Coord = 100;
    /// Cells around the first reveal that the engine keeps free of mines.
    pub const SAFE_ZONE: CellCount = 9;

    pub const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn max_mines_for(width: Coord, height: Coord) -> CellCount {
        mult(width, height).saturating_sub(Self::SAFE_ZONE)
    }

    pub const fn max_mines(&self) -> CellCount {
        Self::max_mines_for(self.width, self.height)
    }

    pub fn increase_width(&mut self) -> bool {
        if self.width >= Self::MAX_SIDE {
            return false;
        }
        let was_max = self.mines == self.max_mines();
        self.width += 1;
        if was_max {
            self.mines = self.max_mines();
        }
        true
    }

    pub fn increase_height(&mut self) -> bool {
        if self.height >= Self::MAX_SIDE {
            return false;
        }
        let was_max = self.mines == self.max_mines();
        self.height += 1;
        if was_max {
            self.mines = self.max_mines();
        }
        true
    }

    pub fn decrease_width(&mut self) -> bool {
        if self.width <= Self::MIN_SIDE {
            return false;
        }
        self.width -= 1;
        self.mines = self.mines.min(self.max_mines());
        true
    }

    pub fn decrease_height(&mut self) -> bool {
        if self.height <= Self::MIN_SIDE {
            return false;
        }
        self.height -= 1;
        self.mines = self.mines.min(self.max_mines());
        true
    }

    pub fn increase_mines(&mut self) -> bool {
        if self.mines >= self.max_mines() {
            return false;
        }
        self.mines += 1;
        true
    }

    pub fn decrease_mines(&mut self) -> bool {
        if self.mines <= 1 {
            return false;
        }
        self.mines -= 1;
        true
    }

    pub const fn generate_request(&self, (first_x, first_y): Coord2) -> GenerateBoard {
        GenerateBoard {
            width: self.width,
            height: self.height,
            mines: self.mines,
            first_x,
            first_y,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new_unchecked(9, 7, 10)
    }
}

/// Everything the menu hands to a game session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub board: BoardConfig,
    pub settings: GameSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growing_a_side_keeps_mines_at_max() {
        let mut config = BoardConfig::default();
        config.mines = config.max_mines();
        assert_eq!(config.mines, 9 * 7 - 9);

        assert!(config.increase_width());

        assert_eq!(config.width, 10);
        assert_eq!(config.mines, 10 * 7 - 9);

        assert!(config.increase_height());

        assert_eq!(config.mines, 10 * 8 - 9);
    }

    #[test]
    fn growing_a_side_leaves_mines_below_max_alone() {
        let mut config = BoardConfig::default();

        config.increase_width();
        config.increase_height();

        assert_eq!(config.mines, 10);
    }

    #[test]
    fn shrinking_a_side_clamps_mines() {
        let mut config = BoardConfig::new_unchecked(5, 5, 16);

        assert!(config.decrease_width());

        assert_eq!(config.mines, 4 * 5 - 9);

        assert!(config.decrease_height());

        assert_eq!(config.mines, 4 * 4 - 9);
        assert!(!config.decrease_height());
        assert!(!config.decrease_width());
    }

    #[test]
    fn sides_stop_at_bounds() {
        let mut config = BoardConfig::new_unchecked(BoardConfig::MAX_SIDE, 4, 10);

        assert!(!config.increase_width());
        assert!(!config.decrease_height());
        assert_eq!(config, BoardConfig::new_unchecked(BoardConfig::MAX_SIDE, 4, 10));
    }

    #[test]
    fn mines_stay_between_one_and_max() {
        let mut config = BoardConfig::new_unchecked(4, 4, 1);

        assert!(!config.decrease_mines());
        for _ in 0..20 {
            config.increase_mines();
        }

        assert_eq!(config.mines, 7);
        assert!(!config.increase_mines());
    }

    #[test]
    fn generate_request_carries_first_move() {
        let request = BoardConfig::default().generate_request((3, 3));

        assert_eq!(
            request,
            GenerateBoard {
                width: 9,
                height: 7,
                mines: 10,
                first_x: 3,
                first_y: 3,
            }
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"board": {"width": 16}, "settings": {"quick_uncover": false}}"#)
                .unwrap();

        assert_eq!(config.board, BoardConfig::new_unchecked(16, 7, 10));
        assert!(!config.settings.quick_uncover);
        assert!(config.settings.questions_enabled);
    }
}
