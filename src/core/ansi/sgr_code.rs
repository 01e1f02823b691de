// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! SGR foreground colour generation and the host-facing palette encoding.
//!
//! Palette entries arrive from the host as plain `i32`s:
//!
//! ```text
//!  -1            → default colour
//!   0–7          → ANSI basic colours
//!   8–15         → bright ANSI colours
//!   16–255       → xterm 256-colour palette
//!   ≥ 0x01000000 → 24-bit RGB packed as 0x01RRGGBB
//! ```

use std::fmt::{Display, Formatter, Result};

const CSI: &str = "\x1b[";
const SGR: &str = "m";

/// Bit that marks a packed 24-bit RGB palette value.
pub const PALETTE_RGB_BIT: i32 = 0x0100_0000;

/// A decoded palette entry. Produced from the wire `i32` encoding by
/// [`PaletteColor::from_code`]; rendered by the [`Display`] impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteColor {
    /// Use the terminal's default foreground; emits nothing.
    Default,
    /// ANSI basic colours 0–7 → `CSI 30+n m`.
    Basic(u8),
    /// Bright ANSI colours 8–15 → `CSI 90+(n-8) m`.
    Bright(u8),
    /// xterm 256-colour palette → `CSI 38;5;n m`.
    Ansi256(u8),
    /// 24-bit colour → `CSI 38;2;r;g;b m`.
    Rgb(u8, u8, u8),
}

impl PaletteColor {
    /// Decode the host palette encoding. Anything unrecognised (negative
    /// values other than −1, values above 255 without the RGB bit) maps to
    /// [`PaletteColor::Default`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        if code & PALETTE_RGB_BIT != 0 {
            let r = ((code >> 16) & 0xFF) as u8;
            let g = ((code >> 8) & 0xFF) as u8;
            let b = (code & 0xFF) as u8;
            return PaletteColor::Rgb(r, g, b);
        }
        match code {
            0..=7 => PaletteColor::Basic(code as u8),
            8..=15 => PaletteColor::Bright(code as u8),
            16..=255 => PaletteColor::Ansi256(code as u8),
            _ => PaletteColor::Default,
        }
    }
}

impl Display for PaletteColor {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            PaletteColor::Default        => Ok(()),
            PaletteColor::Basic(n)       => write!(f, "{CSI}{}{SGR}", 30 + u16::from(n)),
            PaletteColor::Bright(n)      => write!(f, "{CSI}{}{SGR}", 90 + u16::from(n - 8)),
            PaletteColor::Ansi256(n)     => write!(f, "{CSI}38;5;{n}{SGR}"),
            PaletteColor::Rgb(r, g, b)   => write!(f, "{CSI}38;2;{r};{g};{b}{SGR}"),
        }
    }
}

/// Look up `color_index` in a decoded palette; out-of-range indices fall
/// back to the default colour.
#[must_use]
pub fn palette_lookup(palette: &[PaletteColor], color_index: usize) -> PaletteColor {
    palette.get(color_index).copied().unwrap_or(PaletteColor::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_default() {
        assert_eq!(PaletteColor::from_code(-1), PaletteColor::Default);
        assert_eq!(PaletteColor::from_code(-42), PaletteColor::Default);
        assert_eq!(PaletteColor::from_code(256), PaletteColor::Default);
    }

    #[test]
    fn test_from_code_ranges() {
        assert_eq!(PaletteColor::from_code(1), PaletteColor::Basic(1));
        assert_eq!(PaletteColor::from_code(9), PaletteColor::Bright(9));
        assert_eq!(PaletteColor::from_code(123), PaletteColor::Ansi256(123));
        assert_eq!(
            PaletteColor::from_code(0x01FF8000),
            PaletteColor::Rgb(0xFF, 0x80, 0x00)
        );
    }

    #[test]
    fn test_display_encodings() {
        assert_eq!(PaletteColor::Basic(2).to_string(), "\x1b[32m");
        assert_eq!(PaletteColor::Bright(8).to_string(), "\x1b[90m");
        assert_eq!(PaletteColor::Bright(15).to_string(), "\x1b[97m");
        assert_eq!(PaletteColor::Ansi256(200).to_string(), "\x1b[38;5;200m");
        assert_eq!(
            PaletteColor::Rgb(1, 2, 3).to_string(),
            "\x1b[38;2;1;2;3m"
        );
        assert_eq!(PaletteColor::Default.to_string(), "");
    }

    #[test]
    fn test_palette_lookup_out_of_range() {
        let palette = [PaletteColor::Basic(1)];
        assert_eq!(palette_lookup(&palette, 0), PaletteColor::Basic(1));
        assert_eq!(palette_lookup(&palette, 7), PaletteColor::Default);
    }
}
