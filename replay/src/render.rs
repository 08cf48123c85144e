use std::fmt::Write;

use customines_core::{BoardSnapshot, Cell, CellState, MINE_VALUE};

fn cell_char(cell: Cell) -> char {
    use CellState::*;
    match cell.state {
        Hidden => '#',
        Flagged => 'F',
        Questioned => '?',
        Revealed if cell.value == MINE_VALUE => '*',
        Revealed if cell.value == 0 => '.',
        Revealed => char::from(b'0' + cell.value),
        RevealedInvalidMine => 'x',
        RevealedExplodedMine => 'X',
    }
}

/// Text picture of the board, one line per row, followed by phase and counters.
pub(crate) fn render(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    for row in snapshot.grid().rows() {
        out.extend(row.iter().map(|&cell| cell_char(cell)));
        out.push('\n');
    }
    let counters = snapshot.counters();
    let _ = writeln!(
        out,
        "{:?} on {:?}: {} hidden, {} flagged, {} mines left",
        snapshot.phase(),
        snapshot.screen(),
        counters.hidden_cell_count,
        counters.flag_count,
        counters.mines_remaining
    );
    out
}
