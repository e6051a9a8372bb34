use alloc::vec::Vec;

use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

pub const TICTACTOE_SIZE: Coord = 3;
pub const TICTACTOE_OFFSET: Coord = 1;
pub const TICTACTOE_CELL: Coord = 5;
pub const TICTACTOE_GAP: Coord = 1;

pub const TICTACTOE_HINTS: u8 = 3;
pub const TICTACTOE_HINT_TICKS: Tick = 20;

const DIM: usize = TICTACTOE_SIZE as usize;

const LINES: [[Coord2; 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

const X_SPRITE: [[u8; 5]; 5] = [
    [1, 0, 0, 0, 1],
    [0, 1, 0, 1, 0],
    [0, 0, 1, 0, 0],
    [0, 1, 0, 1, 0],
    [1, 0, 0, 0, 1],
];

const O_SPRITE: [[u8; 5]; 5] = [
    [0, 1, 1, 1, 0],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [0, 1, 1, 1, 0],
];

/// `X` is always the human, `O` the computer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub const fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Mark::X => palette::RED,
            Mark::O => palette::BLUE,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "X" | "x" => Some(Mark::X),
            "O" | "o" => Some(Mark::O),
            _ => None,
        }
    }

    fn sprite(self) -> &'static [[u8; 5]; 5] {
        match self {
            Mark::X => &X_SPRITE,
            Mark::O => &O_SPRITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicTacToeSnapshot {
    pub board: Vec<Vec<Option<Mark>>>,
    #[serde(default)]
    pub cursor: Option<Coord2>,
    #[serde(default)]
    pub winner: Option<Outcome<Mark>>,
    #[serde(default = "default_hints")]
    pub hints_left: u8,
}

fn default_hints() -> u8 {
    TICTACTOE_HINTS
}

#[derive(Clone, Debug, PartialEq)]
pub struct TicTacToeState {
    board: Array2<Option<Mark>>,
    cursor: Coord2,
    turn: Mark,
    winner: Option<Outcome<Mark>>,
    hints_left: u8,
    hint: Option<Coord2>,
    hint_ticks: Tick,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeState {
    pub fn new() -> Self {
        Self {
            board: Array2::from_elem((DIM, DIM), None),
            cursor: (1, 1),
            turn: Mark::X,
            winner: None,
            hints_left: TICTACTOE_HINTS,
            hint: None,
            hint_ticks: 0,
        }
    }

    /// Resumes a saved round, `None` when the board has the wrong shape.
    pub fn from_snapshot(snapshot: TicTacToeSnapshot) -> Option<Self> {
        let board = board_from_rows(&snapshot.board, DIM)?;
        let mut state = Self {
            board,
            ..Self::new()
        };
        if let Some(cursor) = snapshot
            .cursor
            .filter(|c| c.0 < TICTACTOE_SIZE && c.1 < TICTACTOE_SIZE)
        {
            state.cursor = cursor;
        }
        state.winner = snapshot.winner.or_else(|| state.find_outcome());
        state.hints_left = snapshot.hints_left.min(TICTACTOE_HINTS);
        Some(state)
    }

    pub fn snapshot(&self) -> TicTacToeSnapshot {
        TicTacToeSnapshot {
            board: board_to_rows(&self.board),
            cursor: Some(self.cursor),
            winner: self.winner,
            hints_left: self.hints_left,
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<Mark> {
        self.board.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn winner(&self) -> Option<Outcome<Mark>> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn hints_left(&self) -> u8 {
        self.hints_left
    }

    /// Highlighted hint cell, while its timer runs.
    pub fn hint(&self) -> Option<Coord2> {
        self.hint
    }

    pub fn mark_count(&self) -> usize {
        self.board.iter().filter(|cell| cell.is_some()).count()
    }

    /// Final score of a finished round from the human's side.
    pub fn score(&self) -> Option<u32> {
        match self.winner? {
            Outcome::Won(Mark::X) => Some(10),
            Outcome::Draw => Some(5),
            Outcome::Won(Mark::O) => Some(0),
        }
    }

    pub fn winning_line(&self) -> Option<[Coord2; 3]> {
        LINES.into_iter().find(|line| {
            let first = self.cell(line[0]);
            first.is_some() && line.iter().all(|&coords| self.cell(coords) == first)
        })
    }

    fn empty_cells(&self) -> Vec<Coord2> {
        self.board
            .indexed_iter()
            .filter(|(_, cell)| cell.is_none())
            .map(|((row, col), _)| (row as Coord, col as Coord))
            .collect()
    }

    fn find_outcome(&self) -> Option<Outcome<Mark>> {
        if let Some(line) = self.winning_line() {
            return self.cell(line[0]).map(Outcome::Won);
        }
        (self.mark_count() == DIM * DIM).then_some(Outcome::Draw)
    }

    fn completing_move(&self, mark: Mark) -> Option<Coord2> {
        self.empty_cells().into_iter().find(|&coords| {
            let mut probe = self.board.clone();
            probe[coords.to_nd_index()] = Some(mark);
            LINES
                .iter()
                .any(|line| line.iter().all(|&c| probe[c.to_nd_index()] == Some(mark)))
        })
    }

    fn place(&mut self, coords: Coord2, mark: Mark) {
        self.board[coords.to_nd_index()] = Some(mark);
        self.winner = self.find_outcome();
        self.turn = mark.opponent();
    }

    pub fn update<R: Rng + ?Sized>(&self, button: Button, rng: &mut R) -> Self {
        if let Some(dir) = button.direction() {
            let mut next = self.clone();
            if !self.is_over() {
                next.cursor = dir.step_clamped(self.cursor, TICTACTOE_SIZE);
            }
            return next;
        }

        match button {
            Button::Enter if self.is_over() => {
                log::debug!("tictactoe reset");
                Self::new()
            }
            Button::Enter if self.cell(self.cursor).is_none() => {
                let mut next = self.clone();
                next.hint = None;
                next.hint_ticks = 0;
                next.place(self.cursor, Mark::X);
                if !next.is_over() {
                    if let Some(&reply) = next.empty_cells().choose(rng) {
                        log::trace!("tictactoe computer answers at {:?}", reply);
                        next.place(reply, Mark::O);
                    }
                }
                next.turn = Mark::X;
                next
            }
            Button::Help if !self.is_over() && self.hints_left > 0 => {
                let mut next = self.clone();
                next.hint = self
                    .completing_move(Mark::X)
                    .or_else(|| self.completing_move(Mark::O))
                    .or_else(|| self.empty_cells().choose(rng).copied());
                if next.hint.is_some() {
                    next.hints_left -= 1;
                    next.hint_ticks = TICTACTOE_HINT_TICKS;
                }
                next
            }
            _ => self.clone(),
        }
    }

    /// Moves the cursor onto `coords` and presses ENTER.
    pub fn play_at<R: Rng + ?Sized>(&self, coords: Coord2, rng: &mut R) -> Self {
        if coords.0 >= TICTACTOE_SIZE || coords.1 >= TICTACTOE_SIZE {
            return self.clone();
        }
        let mut next = self.clone();
        if !next.is_over() {
            next.cursor = coords;
        }
        next.update(Button::Enter, rng)
    }

    /// Advances the hint highlight timer.
    pub fn tick(&self) -> Self {
        if self.hint.is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.hint_ticks = next.hint_ticks.saturating_sub(1);
        if next.hint_ticks == 0 {
            next.hint = None;
        }
        next
    }
}

/// Top-left matrix position of a board cell.
pub fn tictactoe_cell_origin((row, col): Coord2) -> (i32, i32) {
    let pitch = (TICTACTOE_CELL + TICTACTOE_GAP) as i32;
    let offset = TICTACTOE_OFFSET as i32;
    (offset + row as i32 * pitch, offset + col as i32 * pitch)
}

/// Board cell under a matrix dot, `None` for grid lines and margins.
pub fn tictactoe_cell_at(row: Coord, col: Coord) -> Option<Coord2> {
    let at = |pixel| {
        cell_from_pixel(pixel, TICTACTOE_OFFSET, TICTACTOE_CELL, TICTACTOE_GAP, TICTACTOE_SIZE)
    };
    Some((at(row)?, at(col)?))
}

impl Render for TicTacToeState {
    fn render(&self, tick: Tick) -> Frame {
        let mut frame = create_empty_grid();
        for i in 1..TICTACTOE_SIZE as i32 {
            let line = tictactoe_cell_origin((i as Coord, 0)).0 - 1;
            frame.fill_rect(line, 1, 1, 17, palette::GREY);
            frame.fill_rect(1, line, 17, 1, palette::GREY);
        }

        if let Some(hint) = self.hint {
            let (top, left) = tictactoe_cell_origin(hint);
            let size = TICTACTOE_CELL as i32;
            frame.fill_rect(top, left, size, size, palette::YELLOW.dim());
        }

        let line = if self.is_over() { self.winning_line() } else { None };
        for ((row, col), cell) in self.board.indexed_iter() {
            let Some(mark) = *cell else {
                continue;
            };
            let coords = (row as Coord, col as Coord);
            let color = match line {
                Some(line) if line.contains(&coords) => palette::YELLOW,
                _ => mark.color(),
            };
            let (top, left) = tictactoe_cell_origin(coords);
            frame.draw_sprite(Some(mark.sprite().as_slice()), top, left, color);
        }

        if !self.is_over() && blink(tick, 3) {
            let (top, left) = tictactoe_cell_origin(self.cursor);
            let size = TICTACTOE_CELL as i32;
            let last = size - 1;
            for i in 0..size {
                frame.set(top, left + i, palette::WHITE);
                frame.set(top + last, left + i, palette::WHITE);
                frame.set(top + i, left, palette::WHITE);
                frame.set(top + i, left + last, palette::WHITE);
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn with_board(rows: [[Option<Mark>; 3]; 3]) -> TicTacToeState {
        let snapshot = TicTacToeSnapshot {
            board: rows.iter().map(|row| row.to_vec()).collect(),
            cursor: None,
            winner: None,
            hints_left: TICTACTOE_HINTS,
        };
        TicTacToeState::from_snapshot(snapshot).unwrap()
    }

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn computer_answers_immediately() {
        let state = TicTacToeState::new();
        let next = state.update(Button::Enter, &mut rng());

        assert_eq!(next.cell((1, 1)), Some(Mark::X));
        assert_eq!(next.mark_count(), 2);
        assert_eq!(next.turn(), Mark::X);
        assert!(!next.is_over());
    }

    #[test]
    fn occupied_cell_is_a_no_op() {
        let state = TicTacToeState::new().update(Button::Enter, &mut rng());
        assert_eq!(state.update(Button::Enter, &mut rng()), state);
    }

    #[test]
    fn winning_ply_skips_the_reply() {
        let state = with_board([[X, X, E], [O, O, E], [E, E, E]]);
        let next = state.play_at((0, 2), &mut rng());

        assert_eq!(next.winner(), Some(Outcome::Won(Mark::X)));
        assert_eq!(next.mark_count(), 5);
        assert_eq!(next.score(), Some(10));
        assert_eq!(next.winning_line(), Some([(0, 0), (0, 1), (0, 2)]));
    }

    #[test]
    fn last_cell_draws() {
        let state = with_board([[X, O, X], [X, O, O], [O, X, E]]);
        let next = state.play_at((2, 2), &mut rng());
        assert_eq!(next.winner(), Some(Outcome::Draw));
        assert_eq!(next.score(), Some(5));
    }

    #[test]
    fn computer_can_win() {
        // both cells left after X plays complete a line for O
        let state = with_board([[O, O, E], [O, E, X], [E, X, X]]);
        let next = state.play_at((1, 1), &mut rng());
        assert_eq!(next.winner(), Some(Outcome::Won(Mark::O)));
        assert_eq!(next.score(), Some(0));
    }

    #[test]
    fn terminal_state_ignores_directions_and_resets_on_enter() {
        let state = with_board([[X, X, X], [O, O, E], [E, E, E]]);
        assert!(state.is_over());
        assert_eq!(state.update(Button::Left, &mut rng()), state);
        assert_eq!(state.update(Button::Help, &mut rng()), state);
        assert_eq!(state.update(Button::Enter, &mut rng()), TicTacToeState::new());
    }

    #[test]
    fn hint_prefers_win_then_block() {
        let win = with_board([[X, X, E], [O, O, E], [E, E, E]]).update(Button::Help, &mut rng());
        assert_eq!(win.hint(), Some((0, 2)));
        assert_eq!(win.hints_left(), TICTACTOE_HINTS - 1);

        let block = with_board([[X, E, E], [O, O, E], [X, E, E]]).update(Button::Help, &mut rng());
        assert_eq!(block.hint(), Some((1, 2)));
    }

    #[test]
    fn hint_expires_and_budget_runs_out() {
        let mut state = TicTacToeState::new();
        for _ in 0..TICTACTOE_HINTS {
            state = state.update(Button::Help, &mut rng());
        }
        assert_eq!(state.hints_left(), 0);
        assert_eq!(state.update(Button::Help, &mut rng()), state);

        for _ in 0..TICTACTOE_HINT_TICKS {
            assert!(state.hint().is_some());
            state = state.tick();
        }
        assert_eq!(state.hint(), None);
    }

    #[test]
    fn click_geometry_skips_grid_lines() {
        assert_eq!(tictactoe_cell_at(0, 0), None);
        assert_eq!(tictactoe_cell_at(1, 1), Some((0, 0)));
        assert_eq!(tictactoe_cell_at(6, 3), None);
        assert_eq!(tictactoe_cell_at(7, 13), Some((1, 2)));
        assert_eq!(tictactoe_cell_at(17, 17), Some((2, 2)));
        assert_eq!(tictactoe_cell_at(18, 1), None);
    }

    #[test]
    fn render_draws_marks_in_their_cells() {
        let state = TicTacToeState::new().update(Button::Enter, &mut rng());
        let frame = state.render(3);
        // X sprite has its center dot in the middle of the cell
        assert_eq!(frame.dot(9, 9), palette::RED);
        assert_eq!(frame.dot(6, 3), palette::GREY);
    }

    #[test]
    fn snapshot_keeps_board_and_hints() {
        let state = TicTacToeState::new()
            .update(Button::Help, &mut rng())
            .update(Button::Enter, &mut rng());
        let restored = TicTacToeState::from_snapshot(state.snapshot()).unwrap();
        assert_eq!(restored.snapshot(), state.snapshot());
        assert_eq!(restored.hints_left(), TICTACTOE_HINTS - 1);
    }
}
