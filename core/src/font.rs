//! Pixel font and fixed sprites stamped onto the dot matrix.

pub const GLYPH_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;

/// Horizontal distance between two consecutive glyphs.
pub const GLYPH_ADVANCE: i32 = GLYPH_WIDTH as i32 + 1;

/// A 3×5 bitmap of 0/1 dots.
pub type Glyph = [[u8; GLYPH_WIDTH]; GLYPH_HEIGHT];

/// An 8×8 bitmap of 0/1 dots.
pub type Icon = [[u8; 8]; 8];

const fn glyph(rows: [u8; GLYPH_HEIGHT]) -> Glyph {
    let mut out = [[0; GLYPH_WIDTH]; GLYPH_HEIGHT];
    let mut r = 0;
    while r < GLYPH_HEIGHT {
        let mut c = 0;
        while c < GLYPH_WIDTH {
            out[r][c] = (rows[r] >> (GLYPH_WIDTH - 1 - c)) & 1;
            c += 1;
        }
        r += 1;
    }
    out
}

const fn icon(rows: [u8; 8]) -> Icon {
    let mut out = [[0; 8]; 8];
    let mut r = 0;
    while r < 8 {
        let mut c = 0;
        while c < 8 {
            out[r][c] = (rows[r] >> (7 - c)) & 1;
            c += 1;
        }
        r += 1;
    }
    out
}

static GLYPHS: &[(char, Glyph)] = &[
    ('A', glyph([0b010, 0b101, 0b111, 0b101, 0b101])),
    ('B', glyph([0b110, 0b101, 0b110, 0b101, 0b110])),
    ('C', glyph([0b011, 0b100, 0b100, 0b100, 0b011])),
    ('D', glyph([0b110, 0b101, 0b101, 0b101, 0b110])),
    ('E', glyph([0b111, 0b100, 0b110, 0b100, 0b111])),
    ('F', glyph([0b111, 0b100, 0b110, 0b100, 0b100])),
    ('G', glyph([0b011, 0b100, 0b101, 0b101, 0b011])),
    ('H', glyph([0b101, 0b101, 0b111, 0b101, 0b101])),
    ('I', glyph([0b111, 0b010, 0b010, 0b010, 0b111])),
    ('J', glyph([0b001, 0b001, 0b001, 0b101, 0b010])),
    ('K', glyph([0b101, 0b101, 0b110, 0b101, 0b101])),
    ('L', glyph([0b100, 0b100, 0b100, 0b100, 0b111])),
    ('M', glyph([0b101, 0b111, 0b111, 0b101, 0b101])),
    ('N', glyph([0b110, 0b101, 0b101, 0b101, 0b101])),
    ('O', glyph([0b010, 0b101, 0b101, 0b101, 0b010])),
    ('P', glyph([0b110, 0b101, 0b110, 0b100, 0b100])),
    ('Q', glyph([0b010, 0b101, 0b101, 0b110, 0b011])),
    ('R', glyph([0b110, 0b101, 0b110, 0b101, 0b101])),
    ('S', glyph([0b011, 0b100, 0b010, 0b001, 0b110])),
    ('T', glyph([0b111, 0b010, 0b010, 0b010, 0b010])),
    ('U', glyph([0b101, 0b101, 0b101, 0b101, 0b111])),
    ('V', glyph([0b101, 0b101, 0b101, 0b101, 0b010])),
    ('W', glyph([0b101, 0b101, 0b111, 0b111, 0b101])),
    ('X', glyph([0b101, 0b101, 0b010, 0b101, 0b101])),
    ('Y', glyph([0b101, 0b101, 0b010, 0b010, 0b010])),
    ('Z', glyph([0b111, 0b001, 0b010, 0b100, 0b111])),
    ('0', glyph([0b111, 0b101, 0b101, 0b101, 0b111])),
    ('1', glyph([0b010, 0b110, 0b010, 0b010, 0b111])),
    ('2', glyph([0b110, 0b001, 0b010, 0b100, 0b111])),
    ('3', glyph([0b110, 0b001, 0b010, 0b001, 0b110])),
    ('4', glyph([0b101, 0b101, 0b111, 0b001, 0b001])),
    ('5', glyph([0b111, 0b100, 0b110, 0b001, 0b110])),
    ('6', glyph([0b011, 0b100, 0b111, 0b101, 0b111])),
    ('7', glyph([0b111, 0b001, 0b010, 0b010, 0b010])),
    ('8', glyph([0b111, 0b101, 0b111, 0b101, 0b111])),
    ('9', glyph([0b111, 0b101, 0b111, 0b001, 0b110])),
    (' ', glyph([0b000, 0b000, 0b000, 0b000, 0b000])),
    ('-', glyph([0b000, 0b000, 0b111, 0b000, 0b000])),
    ('!', glyph([0b010, 0b010, 0b010, 0b000, 0b010])),
    ('?', glyph([0b110, 0b001, 0b010, 0b000, 0b010])),
    (':', glyph([0b000, 0b010, 0b000, 0b010, 0b000])),
    ('.', glyph([0b000, 0b000, 0b000, 0b000, 0b010])),
    ('/', glyph([0b001, 0b001, 0b010, 0b100, 0b100])),
    ('<', glyph([0b001, 0b010, 0b100, 0b010, 0b001])),
    ('>', glyph([0b100, 0b010, 0b001, 0b010, 0b100])),
];

/// Looks up the bitmap of `ch`; lowercase letters share the uppercase glyphs.
pub fn char_grid(ch: char) -> Option<&'static Glyph> {
    let ch = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(glyph_ch, _)| *glyph_ch == ch)
        .map(|(_, glyph)| glyph)
}

/// Width in dots of `text` when drawn with [`char_grid`] glyphs.
pub fn text_width(text: &str) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        0
    } else {
        count * GLYPH_ADVANCE - 1
    }
}

pub mod icons {
    use super::{Icon, icon};

    pub static SNAKE: Icon = icon([
        0b00000000, 0b01111100, 0b01000000, 0b01111100, 0b00000100, 0b00000100, 0b01111100,
        0b00000001,
    ]);
    pub static TICTACTOE: Icon = icon([
        0b00100100, 0b00100100, 0b11111111, 0b00100100, 0b00100100, 0b11111111, 0b00100100,
        0b00100100,
    ]);
    pub static CARO: Icon = icon([
        0b10000000, 0b01000000, 0b00100000, 0b00010000, 0b00001000, 0b00000000, 0b00000000,
        0b00000000,
    ]);
    pub static CARO_ACCENT: Icon = icon([
        0b00000000, 0b00000010, 0b00000100, 0b00000000, 0b00000000, 0b00000100, 0b00000010,
        0b00000000,
    ]);
    pub static MEMORY: Icon = icon([
        0b11101110, 0b11101110, 0b11101110, 0b00000000, 0b11101110, 0b11101110, 0b11101110,
        0b00000000,
    ]);
    pub static LINE: Icon = icon([
        0b11011011, 0b11011011, 0b00000000, 0b11011011, 0b11011011, 0b00000000, 0b11011011,
        0b11011011,
    ]);
    pub static PAINT: Icon = icon([
        0b00000110, 0b00001111, 0b00011110, 0b00111100, 0b01111000, 0b11110000, 0b11100000,
        0b11000000,
    ]);
    pub static PAUSE: Icon = icon([
        0b00000000, 0b01100110, 0b01100110, 0b01100110, 0b01100110, 0b01100110, 0b01100110,
        0b00000000,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_glyph_has_expected_bits() {
        let a = char_grid('A').unwrap();
        assert_eq!(a[0], [0, 1, 0]);
        assert_eq!(a[2], [1, 1, 1]);
        assert_eq!(char_grid('a'), Some(a));
    }

    #[test]
    fn unknown_char_has_no_bitmap() {
        assert_eq!(char_grid('@'), None);
        assert_eq!(char_grid('é'), None);
    }

    #[test]
    fn text_width_accounts_for_spacing() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("A"), 3);
        assert_eq!(text_width("AB"), 7);
    }

    #[test]
    fn icon_bits_follow_masks() {
        assert_eq!(icons::CARO[0][0], 1);
        assert_eq!(icons::CARO[0][1], 0);
        assert_eq!(icons::CARO[4][4], 1);
    }
}
