//! Built-in hexadecimal font.

/// Address in memory where the font is installed.
pub const FONTSET_START: u16 = 0x000;

/// Each glyph is 8 pixels wide and 5 rows high, one byte per row.
pub const FONTSET_HEIGHT: usize = 5;

/// Number of glyphs, one for each hexadecimal digit.
pub const FONTSET_GLYPH_COUNT: usize = 16;

pub const FONTSET_DATA_LENGTH: usize = FONTSET_HEIGHT * FONTSET_GLYPH_COUNT;

/// Glyphs for the digits 0-F.
///
/// Only the upper nibble of each row is used, so glyphs are 4 pixels wide.
#[rustfmt::skip]
pub static FONTSET: [u8; FONTSET_DATA_LENGTH] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the glyph for the given digit.
///
/// Values above 0xF are not masked, so they point past the font
/// into whatever memory follows it.
#[inline]
pub fn glyph_address(digit: u8) -> u16 {
    FONTSET_START + digit as u16 * FONTSET_HEIGHT as u16
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_glyph_address() {
        assert_eq!(glyph_address(0x0), 0);
        assert_eq!(glyph_address(0xA), 50);
        assert_eq!(glyph_address(0xF), 75);
        assert_eq!(glyph_address(0xFF), 1275);
    }
}
