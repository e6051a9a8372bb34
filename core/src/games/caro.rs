use alloc::vec::Vec;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Side length of every Caro board.
pub const CARO_SIZE: Coord = 20;

const DIM: usize = CARO_SIZE as usize;
const TOTAL_CELLS: u16 = (DIM * DIM) as u16;

/// Horizontal, vertical and both diagonals.
pub(crate) const LINE_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    pub const fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Player::Red => palette::RED,
            Player::Blue => palette::BLUE,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Player::Red => "RED",
            Player::Blue => "BLUE",
        }
    }
}

pub type Board = Array2<Option<Player>>;

pub type WinningLine = SmallVec<[Coord2; 8]>;

/// Contiguous run through a cell in one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub len: u8,
    /// How many of the two cells just past the run are on the board and empty.
    pub open_ends: u8,
}

impl Run {
    pub const fn is_open_both_ends(self) -> bool {
        self.open_ends == 2
    }
}

pub(crate) fn neighbor((row, col): Coord2, (d_row, d_col): (i8, i8)) -> Option<Coord2> {
    let row = row.checked_add_signed(d_row)?;
    let col = col.checked_add_signed(d_col)?;
    (row < CARO_SIZE && col < CARO_SIZE).then_some((row, col))
}

/// Collects the `player` cells after `from` along `dir`, plus the first cell past them.
fn walk(
    board: &Board,
    from: Coord2,
    dir: (i8, i8),
    player: Player,
    cells: &mut WinningLine,
) -> Option<Coord2> {
    let mut pos = from;
    loop {
        let next = neighbor(pos, dir)?;
        if board[next.to_nd_index()] != Some(player) {
            return Some(next);
        }
        cells.push(next);
        pos = next;
    }
}

/// Run through `coords` as if `player` owned it, whatever it currently holds.
pub(crate) fn run_at(board: &Board, coords: Coord2, player: Player, dir: (i8, i8)) -> Run {
    let mut cells = WinningLine::new();
    let forward_end = walk(board, coords, dir, player, &mut cells);
    let backward_end = walk(board, coords, (-dir.0, -dir.1), player, &mut cells);
    let open_ends = [forward_end, backward_end]
        .into_iter()
        .flatten()
        .filter(|end| board[end.to_nd_index()].is_none())
        .count() as u8;
    Run {
        len: cells.len() as u8 + 1,
        open_ends,
    }
}

/// Full contiguous run through `coords` along `dir`, ordered from one end to the other.
fn line_at(board: &Board, coords: Coord2, player: Player, dir: (i8, i8)) -> WinningLine {
    let mut backward = WinningLine::new();
    walk(board, coords, (-dir.0, -dir.1), player, &mut backward);
    let mut line: WinningLine = backward.into_iter().rev().collect();
    line.push(coords);
    walk(board, coords, dir, player, &mut line);
    line
}

/// Serializable form of a [`CaroState`], used in save payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaroSnapshot {
    pub board: Vec<Vec<Option<Player>>>,
    #[serde(default)]
    pub cursor: Option<Coord2>,
    pub turn: Player,
    #[serde(default)]
    pub winner: Option<Outcome<Player>>,
    #[serde(default)]
    pub winning_line: Option<Vec<Coord2>>,
    pub win_length: u8,
}

/// N-in-a-row on a fixed 20×20 board.
#[derive(Clone, Debug, PartialEq)]
pub struct CaroState {
    board: Board,
    cursor: Coord2,
    turn: Player,
    winner: Option<Outcome<Player>>,
    winning_line: Option<WinningLine>,
    win_length: u8,
    placed: u16,
}

impl CaroState {
    pub const CENTER: Coord2 = (CARO_SIZE / 2, CARO_SIZE / 2);

    pub fn new(win_length: u8) -> Self {
        Self {
            board: Array2::from_elem((DIM, DIM), None),
            cursor: Self::CENTER,
            turn: Player::Red,
            winner: None,
            winning_line: None,
            win_length: win_length.clamp(3, CARO_SIZE),
            placed: 0,
        }
    }

    /// Builds a state around an existing board, used when resuming and in tests.
    pub fn from_board(board: Board, turn: Player, win_length: u8) -> Option<Self> {
        if board.dim() != (DIM, DIM) {
            return None;
        }
        let placed = board.iter().filter(|cell| cell.is_some()).count() as u16;
        Some(Self {
            board,
            turn,
            placed,
            ..Self::new(win_length)
        })
    }

    pub fn from_snapshot(snapshot: CaroSnapshot) -> Option<Self> {
        let board = board_from_rows(&snapshot.board, DIM)?;
        let mut state = Self::from_board(board, snapshot.turn, snapshot.win_length)?;
        if let Some(cursor) = snapshot.cursor {
            if cursor.0 < CARO_SIZE && cursor.1 < CARO_SIZE {
                state.cursor = cursor;
            }
        }
        state.winner = snapshot.winner;
        state.winning_line = snapshot
            .winning_line
            .map(|line| line.into_iter().collect());
        Some(state)
    }

    pub fn snapshot(&self) -> CaroSnapshot {
        CaroSnapshot {
            board: board_to_rows(&self.board),
            cursor: Some(self.cursor),
            turn: self.turn,
            winner: self.winner,
            winning_line: self.winning_line.as_ref().map(|line| line.to_vec()),
            win_length: self.win_length,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, coords: Coord2) -> Option<Player> {
        self.board.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn winner(&self) -> Option<Outcome<Player>> {
        self.winner
    }

    pub fn winning_line(&self) -> Option<&[Coord2]> {
        self.winning_line.as_deref()
    }

    pub fn win_length(&self) -> u8 {
        self.win_length
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_board_empty(&self) -> bool {
        self.placed == 0
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.board
            .indexed_iter()
            .filter(|(_, cell)| cell.is_none())
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    /// Whether `player` taking `coords` would complete a winning run.
    pub fn is_winning_move(&self, coords: Coord2, player: Player) -> bool {
        self.cell(coords).is_none()
            && LINE_DIRECTIONS
                .iter()
                .any(|&dir| run_at(&self.board, coords, player, dir).len >= self.win_length)
    }

    pub fn update(&self, button: Button) -> Self {
        if let Some(dir) = button.direction() {
            let mut next = self.clone();
            if !self.is_over() {
                next.cursor = dir.step_clamped(self.cursor, CARO_SIZE);
            }
            return next;
        }

        match button {
            Button::Enter if self.is_over() => {
                log::debug!("caro reset, win length {}", self.win_length);
                Self::new(self.win_length)
            }
            Button::Enter => {
                let mut next = self.clone();
                next.place(self.cursor);
                next
            }
            _ => self.clone(),
        }
    }

    /// Moves the cursor to `coords` (unless the game is over) and presses ENTER.
    pub fn play_at(&self, coords: Coord2) -> Self {
        if coords.0 >= CARO_SIZE || coords.1 >= CARO_SIZE {
            return self.clone();
        }
        let mut next = self.clone();
        if !next.is_over() {
            next.cursor = coords;
        }
        next.update(Button::Enter)
    }

    fn place(&mut self, coords: Coord2) {
        if self.cell(coords).is_some() {
            return;
        }
        let player = self.turn;
        self.board[coords.to_nd_index()] = Some(player);
        self.placed += 1;
        log::trace!("caro {:?} placed at {:?}", player, coords);

        let winning_line = LINE_DIRECTIONS
            .iter()
            .map(|&dir| line_at(&self.board, coords, player, dir))
            .find(|line| line.len() >= self.win_length as usize);

        if let Some(line) = winning_line {
            log::debug!("caro {:?} wins with {} in a row", player, line.len());
            self.winner = Some(Outcome::Won(player));
            self.winning_line = Some(line);
        } else if self.placed >= TOTAL_CELLS {
            log::debug!("caro board full, draw");
            self.winner = Some(Outcome::Draw);
        } else {
            self.turn = player.opponent();
        }
    }
}

impl Render for CaroState {
    fn render(&self, tick: Tick) -> Frame {
        let mut frame = create_empty_grid();
        for ((row, col), cell) in self.board.indexed_iter() {
            if let Some(player) = cell {
                frame.set(row as i32, col as i32, player.color());
            }
        }
        for &coords in self.winning_line().unwrap_or_default() {
            frame.set_coord(coords, palette::YELLOW);
        }
        if !self.is_over() && blink(tick, 3) {
            frame.set_coord(self.cursor, palette::WHITE);
        }
        frame
    }
}
