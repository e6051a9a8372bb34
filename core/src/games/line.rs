use alloc::vec::Vec;

use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

pub const LINE_SIZE: Coord = 5;
pub const LINE_OFFSET: Coord = 1;
pub const LINE_TILE: Coord = 3;
pub const LINE_GAP: Coord = 1;

const DIM: usize = LINE_SIZE as usize;

const TILE_COLORS: [Color; 5] = [
    palette::RED,
    palette::BLUE,
    palette::GREEN,
    palette::YELLOW,
    palette::PURPLE,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub tiles: Vec<Vec<Color>>,
    #[serde(default)]
    pub cursor: Option<Coord2>,
    #[serde(default)]
    pub selected: Option<Coord2>,
}

/// A grid of coloured tiles with a cursor and at most one selected tile.
///
/// Tiles are never exchanged; selecting is purely a highlight.
#[derive(Clone, Debug, PartialEq)]
pub struct LineState {
    tiles: Array2<Color>,
    cursor: Coord2,
    selected: Option<Coord2>,
}

fn on_grid((row, col): Coord2) -> bool {
    row < LINE_SIZE && col < LINE_SIZE
}

impl LineState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let tiles = Array2::from_shape_simple_fn((DIM, DIM), || {
            TILE_COLORS.choose(rng).copied().unwrap_or(palette::WHITE)
        });
        Self {
            tiles,
            cursor: (0, 0),
            selected: None,
        }
    }

    pub fn from_snapshot(snapshot: LineSnapshot) -> Option<Self> {
        let tiles = board_from_rows(&snapshot.tiles, DIM)?;
        Some(Self {
            tiles,
            cursor: snapshot.cursor.filter(|&c| on_grid(c)).unwrap_or((0, 0)),
            selected: snapshot.selected.filter(|&c| on_grid(c)),
        })
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            tiles: board_to_rows(&self.tiles),
            cursor: Some(self.cursor),
            selected: self.selected,
        }
    }

    pub fn tile(&self, coords: Coord2) -> Option<Color> {
        self.tiles.get(coords.to_nd_index()).copied()
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn selected(&self) -> Option<Coord2> {
        self.selected
    }

    pub fn update(&self, button: Button) -> Self {
        let mut next = self.clone();
        if let Some(dir) = button.direction() {
            next.cursor = dir.step_clamped(self.cursor, LINE_SIZE);
        } else if button == Button::Enter {
            next.selected = match self.selected {
                Some(selected) if selected == self.cursor => None,
                _ => Some(self.cursor),
            };
        }
        next
    }

    /// Moves the cursor onto `coords` and presses ENTER.
    pub fn select_at(&self, coords: Coord2) -> Self {
        if !on_grid(coords) {
            return self.clone();
        }
        let mut next = self.clone();
        next.cursor = coords;
        next.update(Button::Enter)
    }
}

/// Top-left matrix position of a tile.
pub fn line_tile_origin((row, col): Coord2) -> (i32, i32) {
    let pitch = (LINE_TILE + LINE_GAP) as i32;
    let offset = LINE_OFFSET as i32;
    (offset + row as i32 * pitch, offset + col as i32 * pitch)
}

pub fn line_tile_at(row: Coord, col: Coord) -> Option<Coord2> {
    let at = |pixel| cell_from_pixel(pixel, LINE_OFFSET, LINE_TILE, LINE_GAP, LINE_SIZE);
    Some((at(row)?, at(col)?))
}

impl Render for LineState {
    fn render(&self, tick: Tick) -> Frame {
        let mut frame = create_empty_grid();
        let size = LINE_TILE as i32;
        for ((row, col), &color) in self.tiles.indexed_iter() {
            let coords = (row as Coord, col as Coord);
            let (top, left) = line_tile_origin(coords);
            let color = if self.selected == Some(coords) && !blink(tick, 2) {
                palette::WHITE
            } else {
                color
            };
            frame.fill_rect(top, left, size, size, color);
        }
        if blink(tick, 3) {
            let (top, left) = line_tile_origin(self.cursor);
            frame.set(top + 1, left + 1, palette::WHITE);
        }
        frame
    }
}
