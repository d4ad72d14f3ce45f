use std::fmt;

use serde::{Deserialize, Serialize};

/// 8-bit sRGB color. Serializes as `#rrggbb`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Rgb(r, g, b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s).ok_or_else(|| format!("invalid hex color: {s:?}"))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Sequential green ramp, lightest first. Tier `i` colors bin `i`.
pub const GREENS: [Rgb; 8] = [
    Rgb(0xed, 0xf8, 0xe9),
    Rgb(0xc7, 0xe9, 0xc0),
    Rgb(0xa1, 0xd9, 0x9b),
    Rgb(0x74, 0xc4, 0x76),
    Rgb(0x41, 0xab, 0x5d),
    Rgb(0x23, 0x8b, 0x45),
    Rgb(0x00, 0x6d, 0x2c),
    Rgb(0x00, 0x44, 0x1b),
];
