use alloc::vec::Vec;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub const PAINT_COLORS: [Color; 10] = [
    palette::RED,
    palette::ORANGE,
    palette::YELLOW,
    palette::LIME,
    palette::GREEN,
    palette::CYAN,
    palette::BLUE,
    palette::PURPLE,
    palette::PINK,
    palette::WHITE,
];

/// Matrix row holding the colour swatches.
pub const PALETTE_ROW: Coord = 0;
pub const SWATCH_WIDTH: Coord = 2;
/// First matrix row of the canvas.
pub const CANVAS_TOP: Coord = 2;
pub const CANVAS_ROWS: Coord = MATRIX_SIZE - CANVAS_TOP;
pub const CANVAS_COLS: Coord = MATRIX_SIZE;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaintSnapshot {
    pub canvas: Vec<Vec<Option<Color>>>,
    #[serde(default)]
    pub selected: usize,
    #[serde(default)]
    pub cursor: Option<Coord2>,
}

/// What a click on the matrix means for the paint tool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintTarget {
    Swatch(usize),
    Canvas(Coord2),
}

impl PaintTarget {
    pub fn at(row: Coord, col: Coord) -> Option<Self> {
        if col >= MATRIX_SIZE {
            return None;
        }
        if row == PALETTE_ROW {
            let swatch = usize::from(col / SWATCH_WIDTH);
            return (swatch < PAINT_COLORS.len()).then_some(PaintTarget::Swatch(swatch));
        }
        let canvas_row = row.checked_sub(CANVAS_TOP)?;
        (canvas_row < CANVAS_ROWS).then_some(PaintTarget::Canvas((canvas_row, col)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaintState {
    canvas: Array2<Option<Color>>,
    selected: usize,
    cursor: Coord2,
}

impl Default for PaintState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintState {
    pub fn new() -> Self {
        Self {
            canvas: Array2::from_elem((CANVAS_ROWS as usize, CANVAS_COLS as usize), None),
            selected: 0,
            cursor: (CANVAS_ROWS / 2, CANVAS_COLS / 2),
        }
    }

    pub fn from_snapshot(snapshot: PaintSnapshot) -> Option<Self> {
        let (rows, cols) = (CANVAS_ROWS as usize, CANVAS_COLS as usize);
        if snapshot.canvas.len() != rows || snapshot.canvas.iter().any(|row| row.len() != cols) {
            return None;
        }
        let flat = snapshot.canvas.into_iter().flatten().collect();
        let canvas = Array2::from_shape_vec((rows, cols), flat).ok()?;
        let mut state = Self {
            canvas,
            ..Self::new()
        };
        state.selected = snapshot.selected.min(PAINT_COLORS.len() - 1);
        if let Some(cursor) = snapshot
            .cursor
            .filter(|c| c.0 < CANVAS_ROWS && c.1 < CANVAS_COLS)
        {
            state.cursor = cursor;
        }
        Some(state)
    }

    pub fn snapshot(&self) -> PaintSnapshot {
        PaintSnapshot {
            canvas: board_to_rows(&self.canvas),
            selected: self.selected,
            cursor: Some(self.cursor),
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<Color> {
        self.canvas.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn selected_color(&self) -> Color {
        PAINT_COLORS[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn update(&self, button: Button) -> Self {
        let mut next = self.clone();
        if let Some(dir) = button.direction() {
            let (row, col) = self.cursor;
            let (d_row, d_col) = dir.delta();
            next.cursor = (
                row.saturating_add_signed(d_row).min(CANVAS_ROWS - 1),
                col.saturating_add_signed(d_col).min(CANVAS_COLS - 1),
            );
            return next;
        }
        match button {
            Button::Enter => {
                let color = self.selected_color();
                let cell = &mut next.canvas[self.cursor.to_nd_index()];
                *cell = if *cell == Some(color) { None } else { Some(color) };
            }
            Button::Help => {
                next.selected = (self.selected + 1) % PAINT_COLORS.len();
            }
            _ => {}
        }
        next
    }

    pub fn pick(&self, swatch: usize) -> Self {
        let mut next = self.clone();
        if swatch < PAINT_COLORS.len() {
            next.selected = swatch;
        }
        next
    }

    /// Moves the cursor onto a canvas cell and paints it.
    pub fn paint_at(&self, coords: Coord2) -> Self {
        if coords.0 >= CANVAS_ROWS || coords.1 >= CANVAS_COLS {
            return self.clone();
        }
        let mut next = self.clone();
        next.cursor = coords;
        next.update(Button::Enter)
    }

    pub fn click(&self, row: Coord, col: Coord) -> Self {
        match PaintTarget::at(row, col) {
            Some(PaintTarget::Swatch(swatch)) => self.pick(swatch),
            Some(PaintTarget::Canvas(coords)) => self.paint_at(coords),
            None => self.clone(),
        }
    }
}

impl Render for PaintState {
    fn render(&self, tick: Tick) -> Frame {
        let mut frame = create_empty_grid();
        let width = SWATCH_WIDTH as i32;
        for (i, &color) in PAINT_COLORS.iter().enumerate() {
            frame.fill_rect(PALETTE_ROW as i32, i as i32 * width, 1, width, color);
        }
        frame.fill_rect(
            PALETTE_ROW as i32 + 1,
            self.selected as i32 * width,
            1,
            width,
            palette::GREY,
        );

        for ((row, col), cell) in self.canvas.indexed_iter() {
            if let Some(color) = *cell {
                frame.set(row as i32 + CANVAS_TOP as i32, col as i32, color);
            }
        }
        if blink(tick, 3) {
            let (row, col) = self.cursor;
            frame.set(
                (row + CANVAS_TOP).into(),
                col.into(),
                self.selected_color().dim(),
            );
        }
        frame
    }
}
