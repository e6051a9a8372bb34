use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Side length of the square dot matrix.
pub const MATRIX_SIZE: Coord = 20;

const MATRIX_DIM: usize = MATRIX_SIZE as usize;

/// One rendered 20×20 picture of the dot matrix.
///
/// Frames are rebuilt by every render call; renderers are free to mutate the
/// fresh frame they own before handing it out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Color>>", try_from = "Vec<Vec<Color>>")]
pub struct Frame {
    dots: Array2<Color>,
}

/// A frame with every dot switched off.
pub fn create_empty_grid() -> Frame {
    Frame::filled(palette::OFF)
}

impl Frame {
    pub fn filled(color: Color) -> Self {
        Self {
            dots: Array2::from_elem((MATRIX_DIM, MATRIX_DIM), color),
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<Color> {
        self.dots.get(coords.to_nd_index()).copied()
    }

    /// Color of a dot, `OFF` outside the matrix.
    pub fn dot(&self, row: Coord, col: Coord) -> Color {
        self.get((row, col)).unwrap_or(palette::OFF)
    }

    /// Sets a dot; positions outside the matrix are ignored.
    pub fn set(&mut self, row: i32, col: i32, color: Color) {
        if let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) {
            if let Some(dot) = self.dots.get_mut([row, col]) {
                *dot = color;
            }
        }
    }

    pub fn set_coord(&mut self, (row, col): Coord2, color: Color) {
        self.set(row.into(), col.into(), color);
    }

    pub fn fill_rect(&mut self, top: i32, left: i32, height: i32, width: i32, color: Color) {
        for row in top..top + height {
            for col in left..left + width {
                self.set(row, col, color);
            }
        }
    }

    /// Draws a one-dot frame around the matrix edge.
    pub fn draw_border(&mut self, color: Color) {
        let last = MATRIX_SIZE as i32 - 1;
        for i in 0..MATRIX_SIZE as i32 {
            self.set(0, i, color);
            self.set(last, i, color);
            self.set(i, 0, color);
            self.set(i, last, color);
        }
    }

    /// Stamps `color` wherever `bitmap` has a 1, clipping anything outside the matrix.
    pub fn draw_sprite<R: AsRef<[u8]>>(
        &mut self,
        bitmap: Option<&[R]>,
        top: i32,
        left: i32,
        color: Color,
    ) {
        let Some(bitmap) = bitmap else {
            return;
        };
        for (r, row) in bitmap.iter().enumerate() {
            for (c, &bit) in row.as_ref().iter().enumerate() {
                if bit != 0 {
                    self.set(top + r as i32, left + c as i32, color);
                }
            }
        }
    }

    /// Draws `text` with the pixel font; characters without a glyph leave a blank.
    pub fn draw_text(&mut self, text: &str, top: i32, left: i32, color: Color) {
        let mut x = left;
        for ch in text.chars() {
            let glyph = char_grid(ch).map(|glyph| glyph.as_slice());
            self.draw_sprite(glyph, top, x, color);
            x += GLYPH_ADVANCE;
        }
    }

    /// Draws `text` horizontally centered on row `top`.
    pub fn draw_text_centered(&mut self, text: &str, top: i32, color: Color) {
        let left = (MATRIX_SIZE as i32 - text_width(text)) / 2;
        self.draw_text(text, top, left, color);
    }

    /// Draws a left-to-right bar on `row` filled to `numerator / denominator`.
    pub fn draw_progress(&mut self, row: i32, numerator: u64, denominator: u64, color: Color) {
        if denominator == 0 {
            return;
        }
        let filled = (numerator.min(denominator) * MATRIX_SIZE as u64).div_ceil(denominator);
        for col in 0..filled as i32 {
            self.set(row, col, color);
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<Color>> {
        board_to_rows(&self.dots)
    }

    /// Rebuilds a frame from 20 rows of 20 colors, `None` for any other shape.
    pub fn from_rows(rows: &[Vec<Color>]) -> Option<Self> {
        board_from_rows(rows, MATRIX_DIM).map(|dots| Self { dots })
    }

    /// Rebuilds a frame from `#rrggbb` tokens, `None` if any token is malformed.
    pub fn from_css_rows(rows: &[Vec<String>]) -> Option<Self> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|token| token.parse().ok()).collect())
            .collect::<Option<Vec<Vec<Color>>>>()?;
        Self::from_rows(&rows)
    }
}

impl Default for Frame {
    fn default() -> Self {
        create_empty_grid()
    }
}

impl From<Frame> for Vec<Vec<Color>> {
    fn from(frame: Frame) -> Self {
        frame.to_rows()
    }
}

impl TryFrom<Vec<Vec<Color>>> for Frame {
    type Error = ConsoleError;

    fn try_from(rows: Vec<Vec<Color>>) -> Result<Self> {
        Frame::from_rows(&rows)
            .ok_or_else(|| ConsoleError::InvalidSaveData("frame must be 20x20".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use super::*;

    #[test]
    fn empty_grid_is_all_off() {
        let frame = create_empty_grid();
        for row in 0..MATRIX_SIZE {
            for col in 0..MATRIX_SIZE {
                assert_eq!(frame.dot(row, col), palette::OFF);
            }
        }
    }

    #[test]
    fn sprite_is_clipped_at_edges() {
        let mut frame = create_empty_grid();
        let bitmap: &[&[u8]] = &[&[1, 1], &[1, 0]];

        frame.draw_sprite(Some(bitmap), 19, 19, palette::RED);
        frame.draw_sprite(Some(bitmap), -1, -1, palette::BLUE);

        assert_eq!(frame.dot(19, 19), palette::RED);
        assert_eq!(frame.dot(0, 0), palette::OFF);
        assert_eq!(frame.dot(0, 1), palette::OFF);
        let mut blue = 0;
        for row in 0..MATRIX_SIZE {
            for col in 0..MATRIX_SIZE {
                if frame.dot(row, col) == palette::BLUE {
                    blue += 1;
                }
            }
        }
        assert_eq!(blue, 0);
    }

    #[test]
    fn missing_sprite_is_a_no_op() {
        let mut frame = create_empty_grid();
        frame.draw_sprite::<&[u8]>(None, 0, 0, palette::RED);
        assert_eq!(frame, create_empty_grid());
    }

    #[test]
    fn text_skips_unknown_characters() {
        let mut with_unknown = create_empty_grid();
        with_unknown.draw_text("@1", 0, 0, palette::WHITE);

        let mut expected = create_empty_grid();
        expected.draw_text("1", 0, GLYPH_ADVANCE, palette::WHITE);

        assert_eq!(with_unknown, expected);
    }

    #[test]
    fn progress_bar_rounds_up() {
        let mut frame = create_empty_grid();
        frame.draw_progress(0, 1, 40, palette::GREEN);
        assert_eq!(frame.dot(0, 0), palette::GREEN);
        assert_eq!(frame.dot(0, 1), palette::OFF);
    }

    #[test]
    fn css_rows_reject_bad_shape_and_tokens() {
        let good = vec![vec!["#000000".to_string(); 20]; 20];
        assert!(Frame::from_css_rows(&good).is_some());

        let short = vec![vec!["#000000".to_string(); 20]; 19];
        assert!(Frame::from_css_rows(&short).is_none());

        let mut bad = good.clone();
        bad[3][3] = "red".to_string();
        assert!(Frame::from_css_rows(&bad).is_none());
    }

    #[test]
    fn serde_uses_row_vectors() {
        let mut frame = create_empty_grid();
        frame.set(2, 3, palette::RED);

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value[2][3], "#e83b3b");

        let back: Frame = serde_json::from_value(value).unwrap();
        assert_eq!(back, frame);
    }
}
