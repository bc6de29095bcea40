//! A1 coordinate codec shared across the rangewise crates.
//!
//! Columns and rows are zero-based. Column letters use bijective base-26
//! (`A` = 0, `Z` = 25, `AA` = 26): there is no zero digit, so every letter run
//! maps to exactly one index. Addresses past the ceilings below are rejected
//! at parse time so no index structure ever sees them.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CoordParseError;

/// Highest addressable column index (`ZZZ`).
pub const MAX_COL: u32 = 18_277;
/// Highest addressable row index (row `9999999` in A1 text).
pub const MAX_ROW: u32 = 9_999_998;

const MAX_ROW_DIGITS: usize = 7;

/// `$` anchoring of one corner of a range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RangePart {
    pub col_fixed: bool,
    pub row_fixed: bool,
}

impl RangePart {
    pub const RELATIVE: Self = Self {
        col_fixed: false,
        row_fixed: false,
    };
    pub const FIXED: Self = Self {
        col_fixed: true,
        row_fixed: true,
    };

    #[inline]
    pub const fn new(col_fixed: bool, row_fixed: bool) -> Self {
        Self {
            col_fixed,
            row_fixed,
        }
    }

    #[inline]
    pub const fn is_relative(self) -> bool {
        !self.col_fixed && !self.row_fixed
    }
}

/// Zero-based cell position without sheet context.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Position {
    pub col: u32,
    pub row: u32,
}

impl Position {
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", number_to_letters(self.col), self.row + 1)
    }
}

/// Convert a zero-based column index into letters (`0 -> "A"`, `26 -> "AA"`).
pub fn number_to_letters(mut col: u32) -> String {
    let mut buf = Vec::with_capacity(3);
    loop {
        buf.push(b'A' + (col % 26) as u8);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1; // letters are 1-based internally
    }
    buf.iter().rev().map(|&b| char::from(b)).collect()
}

/// Convert column letters back to a zero-based index. Case-insensitive.
///
/// Returns `None` for empty input, non-letters, or values that do not fit in `u32`.
pub fn letters_to_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut acc: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let digit = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc - 1)
}

/// Render a position as A1 text, inserting `$` per the anchoring flags.
pub fn to_xc(col: u32, row: u32, part: RangePart) -> String {
    let mut out = String::with_capacity(10);
    if part.col_fixed {
        out.push('$');
    }
    out.push_str(&number_to_letters(col));
    if part.row_fixed {
        out.push('$');
    }
    out.push_str(&(row + 1).to_string());
    out
}

/// Parse a single-cell address such as `"B12"`, `" $C$3 "` or `"aa7"`.
pub fn to_cartesian(xc: &str) -> Result<Position, CoordParseError> {
    let (position, _) = to_cartesian_with_part(xc)?;
    Ok(position)
}

/// Like [`to_cartesian`] but also reports the `$` anchoring that was present.
pub fn to_cartesian_with_part(xc: &str) -> Result<(Position, RangePart), CoordParseError> {
    let mut cursor = Cursor::new(xc);
    cursor.skip_spaces();
    let (col, col_fixed) = match cursor.column() {
        Component::Value(col, fixed) => (col, fixed),
        Component::Missing => return Err(CoordParseError::MissingColumn(xc.to_string())),
        Component::Overflow => return Err(CoordParseError::ColumnOutOfBounds(xc.to_string())),
    };
    let (row, row_fixed) = match cursor.row() {
        Component::Value(row, fixed) => (row, fixed),
        Component::Missing => return Err(CoordParseError::MissingRow(xc.to_string())),
        Component::Overflow => return Err(CoordParseError::RowOutOfBounds(xc.to_string())),
    };
    cursor.skip_spaces();
    if !cursor.is_over() {
        return Err(CoordParseError::TrailingCharacters(xc.to_string()));
    }
    if row == 0 {
        return Err(CoordParseError::ZeroRow(xc.to_string()));
    }
    let position = Position::new(col, row - 1);
    Ok((position, RangePart::new(col_fixed, row_fixed)))
}

/// Parse a bare column reference (`"C"`, `"$AB"`), returning the index and anchor flag.
pub fn parse_column_reference(text: &str) -> Option<(u32, bool)> {
    let mut cursor = Cursor::new(text.trim());
    match cursor.column() {
        Component::Value(col, fixed) if cursor.is_over() => Some((col, fixed)),
        _ => None,
    }
}

/// Parse a bare row reference (`"7"`, `"$12"`), returning the zero-based index and anchor flag.
pub fn parse_row_reference(text: &str) -> Option<(u32, bool)> {
    let mut cursor = Cursor::new(text.trim());
    match cursor.row() {
        Component::Value(row, fixed) if cursor.is_over() && row > 0 => Some((row - 1, fixed)),
        _ => None,
    }
}

enum Component {
    /// Decoded value (1-based for rows, 0-based for columns) and the `$` flag.
    Value(u32, bool),
    Missing,
    Overflow,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn is_over(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    /// Consume `$?[A-Za-z]+`. The cursor is rewound when nothing matches.
    fn column(&mut self) -> Component {
        let start = self.pos;
        let fixed = self.eat_dollar();
        let mut acc: u64 = 0;
        let mut seen = false;
        while let Some(b) = self.peek().filter(u8::is_ascii_alphabetic) {
            seen = true;
            let digit = (b.to_ascii_uppercase() - b'A') as u64 + 1;
            acc = acc.saturating_mul(26).saturating_add(digit);
            self.pos += 1;
        }
        if !seen {
            self.pos = start;
            return Component::Missing;
        }
        if acc - 1 > MAX_COL as u64 {
            return Component::Overflow;
        }
        Component::Value((acc - 1) as u32, fixed)
    }

    /// Consume `$?[0-9]+`. The cursor is rewound when nothing matches.
    /// More than seven digits overflows, leading zeros included.
    fn row(&mut self) -> Component {
        let start = self.pos;
        let fixed = self.eat_dollar();
        let mut acc: u64 = 0;
        let mut digits = 0usize;
        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            digits += 1;
            acc = acc.saturating_mul(10).saturating_add((b - b'0') as u64);
            self.pos += 1;
        }
        if digits == 0 {
            self.pos = start;
            return Component::Missing;
        }
        if digits > MAX_ROW_DIGITS || acc > MAX_ROW as u64 + 1 {
            return Component::Overflow;
        }
        Component::Value(acc as u32, fixed)
    }

    fn eat_dollar(&mut self) -> bool {
        if self.peek() == Some(b'$') {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}
