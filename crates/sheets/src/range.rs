//! A1 notation.
//!
//! Supported forms: `Sheet1!A1`, `Sheet1!A1:C3`, `Sheet1!A:C` (whole
//! columns), `Sheet1!A2:C` (open-ended rows), `Sheet1!2:4` (whole rows),
//! `Sheet1` (whole sheet), `'My Sheet'!B2` (quoted titles, `''` escapes a
//! quote) and ranges without a sheet, which address the first sheet.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SheetsError;

static BOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]{0,3})\$?([0-9]*)$").expect("valid regex"));

/// One endpoint of a range. Missing parts are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// Zero-based column.
    pub col: Option<u32>,
    /// Zero-based row.
    pub row: Option<u32>,
}

/// A parsed A1 range with zero-based inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: Option<String>,
    pub start: Bound,
    pub end: Bound,
    /// Written as a single cell with no `:`. Writes treat it as the
    /// top-left corner of a block of any size; reads return just that cell.
    pub anchor: bool,
}

impl A1Range {
    pub fn parse(input: &str) -> Result<Self, SheetsError> {
        let invalid = || SheetsError::InvalidRange(input.to_string());
        let input_trimmed = input.trim();
        if input_trimmed.is_empty() {
            return Err(invalid());
        }

        let (sheet, cells) = split_sheet(input_trimmed).ok_or_else(invalid)?;

        let Some(cells) = cells else {
            // Bare sheet title: the whole sheet.
            let unbounded = Bound { col: None, row: None };
            return Ok(Self {
                sheet,
                start: Bound { col: Some(0), row: Some(0) },
                end: unbounded,
                anchor: false,
            });
        };

        let (first, second) = match cells.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (cells, None),
        };
        let start = parse_bound(first).ok_or_else(invalid)?;
        let end = match second {
            Some(b) => parse_bound(b).ok_or_else(invalid)?,
            None => start,
        };
        // A single endpoint must name a cell.
        if second.is_none() && (start.col.is_none() || start.row.is_none()) {
            return Err(invalid());
        }
        // `A:C` spans whole columns, `2:4` whole rows.
        let start = Bound {
            col: start.col.or(Some(0)),
            row: start.row.or(Some(0)),
        };
        if let (Some(s), Some(e)) = (start.col, end.col) {
            if e < s {
                return Err(invalid());
            }
        }
        if let (Some(s), Some(e)) = (start.row, end.row) {
            if e < s {
                return Err(invalid());
            }
        }
        Ok(Self {
            sheet,
            start,
            end,
            anchor: second.is_none(),
        })
    }

    pub fn start_col(&self) -> u32 {
        self.start.col.unwrap_or(0)
    }

    pub fn start_row(&self) -> u32 {
        self.start.row.unwrap_or(0)
    }

    /// Number of columns, if bounded.
    pub fn width(&self) -> Option<u32> {
        self.end.col.map(|e| e - self.start_col() + 1)
    }

    /// Number of rows, if bounded.
    pub fn height(&self) -> Option<u32> {
        self.end.row.map(|e| e - self.start_row() + 1)
    }
}

/// Split `Sheet!cells` into its parts, unquoting the title.
fn split_sheet(input: &str) -> Option<(Option<String>, Option<&str>)> {
    if let Some(rest) = input.strip_prefix('\'') {
        // Find the closing quote, skipping '' escapes.
        let bytes = rest.as_bytes();
        let mut i = 0;
        let mut title = String::new();
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    title.push('\'');
                    i += 2;
                    continue;
                }
                let after = &rest[i + 1..];
                return match after.strip_prefix('!') {
                    Some(cells) => Some((Some(title), Some(cells))),
                    None if after.is_empty() => Some((Some(title), None)),
                    None => None,
                };
            }
            let ch = rest[i..].chars().next()?;
            title.push(ch);
            i += ch.len_utf8();
        }
        return None;
    }

    match input.rsplit_once('!') {
        Some((sheet, cells)) if !sheet.is_empty() => Some((Some(sheet.to_string()), Some(cells))),
        Some(_) => None,
        None if input.split(':').all(|p| parse_bound(p).is_some()) => Some((None, Some(input))),
        None => Some((Some(input.to_string()), None)),
    }
}

fn parse_bound(s: &str) -> Option<Bound> {
    let caps = BOUND_RE.captures(s)?;
    let letters = caps.get(1).map_or("", |m| m.as_str());
    let digits = caps.get(2).map_or("", |m| m.as_str());
    if letters.is_empty() && digits.is_empty() {
        return None;
    }
    let col = if letters.is_empty() {
        None
    } else {
        Some(letters_to_col(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        let n: u32 = digits.parse().ok()?;
        if n == 0 {
            return None;
        }
        Some(n - 1)
    };
    Some(Bound { col, row })
}

/// `A` → 0, `Z` → 25, `AA` → 26.
pub fn letters_to_col(letters: &str) -> Option<u32> {
    let mut col: u32 = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
    }
    col.checked_sub(1)
}

/// 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn col_to_letters(col: u32) -> String {
    let mut name = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    name
}

/// Quote a sheet title when it contains anything but letters, digits and
/// underscores.
pub fn quote_sheet(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

/// `Sheet1!B3` for a single cell, `Sheet1!A1:C4` otherwise.
pub fn format_a1(sheet: &str, start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> String {
    let first = format!("{}{}", col_to_letters(start_col), start_row + 1);
    if start_row == end_row && start_col == end_col {
        format!("{}!{first}", quote_sheet(sheet))
    } else {
        format!(
            "{}!{first}:{}{}",
            quote_sheet(sheet),
            col_to_letters(end_col),
            end_row + 1
        )
    }
}
