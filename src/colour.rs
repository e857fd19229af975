use std::str::FromStr;

use crate::error::Error;

/// RGBA colour with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Colour {
    /// Creates a colour from its channels.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Colour { r, g, b, a }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::new(0, 0, 0, 255)
    }
}

impl FromStr for Colour {
    type Err = Error;

    /// Parses `#RRGGBB`, `#AARRGGBB` or the same without the `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = match s.rfind('#') {
            Some(i) => &s[i + 1..],
            None => s,
        };
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| Error::Structure(format!("invalid colour string \"{}\"", s)))?;
        match hex.len() {
            6 => Ok(Colour::new(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
                255,
            )),
            8 => Ok(Colour::new(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
                (value >> 24) as u8,
            )),
            _ => Err(Error::Structure(format!(
                "invalid colour string \"{}\"",
                s
            ))),
        }
    }
}
