use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConsoleError;

/// Opaque RGB color token of a single matrix dot, rendered as `#rrggbb`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color(u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn to_rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// Halves every channel, used for dimmed dots.
    pub const fn dim(self) -> Self {
        let (r, g, b) = self.to_rgb();
        Self::rgb(r / 2, g / 2, b / 2)
    }

    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConsoleError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 {
            return Err(invalid());
        }
        u32::from_str_radix(hex, 16).map(Color).map_err(|_| invalid())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ConsoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Named colors shared by the renderers.
pub mod palette {
    use super::Color;

    pub const OFF: Color = Color::rgb(0x1a, 0x1f, 0x16);
    pub const WHITE: Color = Color::rgb(0xf5, 0xf5, 0xf0);
    pub const GREY: Color = Color::rgb(0x5c, 0x63, 0x5a);
    pub const RED: Color = Color::rgb(0xe8, 0x3b, 0x3b);
    pub const BLUE: Color = Color::rgb(0x3b, 0x7d, 0xe8);
    pub const GREEN: Color = Color::rgb(0x4c, 0xd1, 0x37);
    pub const LIME: Color = Color::rgb(0xa6, 0xf0, 0x5a);
    pub const YELLOW: Color = Color::rgb(0xf2, 0xd0, 0x24);
    pub const ORANGE: Color = Color::rgb(0xf2, 0x8c, 0x28);
    pub const PURPLE: Color = Color::rgb(0x9b, 0x4d, 0xe0);
    pub const CYAN: Color = Color::rgb(0x2e, 0xd6, 0xd6);
    pub const PINK: Color = Color::rgb(0xf2, 0x6d, 0xb5);
    pub const BROWN: Color = Color::rgb(0x8c, 0x5a, 0x2b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let color = Color::rgb(0x12, 0xab, 0xef);
        assert_eq!(color.to_string(), "#12abef");
        assert_eq!("#12ABEF".parse::<Color>(), Ok(color));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!("12abef".parse::<Color>().is_err());
        assert!("#12ab".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&palette::RED).unwrap();
        assert_eq!(json, "\"#e83b3b\"");
    }
}
