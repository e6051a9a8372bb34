use alloc::string::ToString;
use alloc::vec::Vec;
use core::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::ConsoleError;

/// Single coordinate axis used for rows, columns and board sizes.
pub type Coord = u8;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Monotonic tick counter, one tick every [`TICK_MILLIS`].
pub type Tick = u64;

pub const TICK_MILLIS: u64 = 100;
pub const TICKS_PER_SECOND: u64 = 1000 / TICK_MILLIS;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// The fixed console button vocabulary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Back,
    Help,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Enter,
        Button::Back,
        Button::Help,
    ];

    pub const fn direction(self) -> Option<Direction> {
        match self {
            Button::Left => Some(Direction::Left),
            Button::Right => Some(Direction::Right),
            Button::Up => Some(Direction::Up),
            Button::Down => Some(Direction::Down),
            Button::Enter | Button::Back | Button::Help => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Enter => "ENTER",
            Button::Back => "BACK",
            Button::Help => "HELP",
        }
    }
}

impl FromStr for Button {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .into_iter()
            .find(|button| button.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConsoleError::UnknownButton(s.to_string()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// `(d_row, d_col)` displacement of one step.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Applies one step and returns the new position, `None` when it leaves `[0, bound)`.
    pub fn step(self, (row, col): Coord2, bound: Coord) -> Option<Coord2> {
        let (d_row, d_col) = self.delta();
        let row = row.checked_add_signed(d_row)?;
        let col = col.checked_add_signed(d_col)?;
        (row < bound && col < bound).then_some((row, col))
    }

    /// Applies one step, clamping each axis to `[0, bound)`.
    pub fn step_clamped(self, coords: Coord2, bound: Coord) -> Coord2 {
        self.step(coords, bound).unwrap_or(coords)
    }
}

/// Maps a matrix position back to a board cell for layouts of `offset + i * (size + gap)`.
///
/// Returns `None` for positions in the margin or in a gap.
pub fn cell_from_pixel(pixel: Coord, offset: Coord, size: Coord, gap: Coord, count: Coord) -> Option<Coord> {
    let rel = pixel.checked_sub(offset)?;
    let pitch = size + gap;
    let index = rel / pitch;
    (index < count && rel % pitch < size).then_some(index)
}

/// Converts a board into row vectors, the shape used in save payloads.
pub fn board_to_rows<T: Clone>(board: &Array2<T>) -> Vec<Vec<T>> {
    board.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Rebuilds a square board from row vectors, `None` when the shape does not match.
pub fn board_from_rows<T: Clone>(rows: &[Vec<T>], size: usize) -> Option<Array2<T>> {
    if rows.len() != size || rows.iter().any(|row| row.len() != size) {
        return None;
    }
    let flat: Vec<T> = rows.iter().flatten().cloned().collect();
    Array2::from_shape_vec((size, size), flat).ok()
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use super::*;

    #[test]
    fn step_clamped_stays_on_board() {
        assert_eq!(Direction::Left.step_clamped((0, 0), 3), (0, 0));
        assert_eq!(Direction::Down.step_clamped((2, 1), 3), (2, 1));
        assert_eq!(Direction::Right.step_clamped((1, 1), 3), (1, 2));
    }

    #[test]
    fn cell_from_pixel_rejects_gaps_and_margins() {
        // offset 1, size 5, gap 1, three cells
        assert_eq!(cell_from_pixel(0, 1, 5, 1, 3), None);
        assert_eq!(cell_from_pixel(1, 1, 5, 1, 3), Some(0));
        assert_eq!(cell_from_pixel(5, 1, 5, 1, 3), Some(0));
        assert_eq!(cell_from_pixel(6, 1, 5, 1, 3), None);
        assert_eq!(cell_from_pixel(7, 1, 5, 1, 3), Some(1));
        assert_eq!(cell_from_pixel(17, 1, 5, 1, 3), Some(2));
        assert_eq!(cell_from_pixel(19, 1, 5, 1, 3), None);
    }

    #[test]
    fn board_rows_reject_wrong_shape() {
        let rows = vec![vec![1, 2], vec![3]];
        assert_eq!(board_from_rows(&rows, 2), None);

        let rows = vec![vec![1, 2], vec![3, 4]];
        let board = board_from_rows(&rows, 2).unwrap();
        assert_eq!(board[[1, 0]], 3);
        assert_eq!(board_to_rows(&board), rows);
    }

    #[test]
    fn button_parses_case_insensitively() {
        assert_eq!("enter".parse::<Button>(), Ok(Button::Enter));
        assert!("jump".parse::<Button>().is_err());
    }
}
