//! Grid coordinate parsing.
//!
//! Two notations are accepted:
//!
//! - Letter/number cells: rows are letters counted from the top (`A` = 1,
//!   `Z` = 26, `AA` = 27, ...), columns are 1-indexed numbers. A single cell
//!   (`B3`) or a comma-joined pair of corners (`A1,C2`) in any order.
//! - Legacy `x,y,width,height` integers.
//!
//! Coordinates always address the total grid: when margins are declared,
//! `(1,1)` is the top-left margin track.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A canonical rectangle in grid space (1-indexed, inclusive spans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    /// First column (>= 1)
    pub x: u32,
    /// First row (>= 1)
    pub y: u32,
    /// Number of columns spanned (>= 1)
    pub width: u32,
    /// Number of rows spanned (>= 1)
    pub height: u32,
}

impl GridRect {
    /// Create a rectangle. Zero spans and spans whose last track does not
    /// fit in a `u32` are rejected.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let invalid = || Error::InvalidArea(format!("{x},{y},{width},{height}"));
        if x == 0 || y == 0 || width == 0 || height == 0 {
            return Err(invalid());
        }
        x.checked_add(width - 1).ok_or_else(invalid)?;
        y.checked_add(height - 1).ok_or_else(invalid)?;
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// A single cell.
    pub fn cell(x: u32, y: u32) -> Result<Self> {
        Self::new(x, y, 1, 1)
    }

    /// Last column covered (inclusive).
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width.saturating_sub(1))
    }

    /// Last row covered (inclusive).
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height.saturating_sub(1))
    }

    /// Check if the rectangle fits in a `cols` x `rows` grid.
    pub fn fits_within(&self, cols: u32, rows: u32) -> bool {
        self.right() <= cols && self.bottom() <= rows
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.x, self.y, self.width, self.height)
    }
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z]+)\s*(\d+)\s*$").unwrap())
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z]+)\s*(\d+)\s*,\s*([A-Za-z]+)\s*(\d+)\s*$").unwrap()
    })
}

/// Convert a row label (`A`, `Z`, `AA`, ...) into its 1-based index.
pub fn row_index(letters: &str) -> Option<u32> {
    let mut n: u32 = 0;
    if letters.is_empty() {
        return None;
    }
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        n = n.checked_mul(26)?.checked_add(ch as u32 - 'A' as u32 + 1)?;
    }
    Some(n)
}

/// Parse an area reference into a canonical [`GridRect`].
pub fn parse_area(reference: &str) -> Result<GridRect> {
    let invalid = || Error::InvalidArea(reference.trim().to_string());

    if let Some(caps) = range_re().captures(reference) {
        let r1 = row_index(&caps[1]).ok_or_else(invalid)?;
        let c1: u32 = caps[2].parse().map_err(|_| invalid())?;
        let r2 = row_index(&caps[3]).ok_or_else(invalid)?;
        let c2: u32 = caps[4].parse().map_err(|_| invalid())?;
        if c1 == 0 || c2 == 0 {
            return Err(invalid());
        }
        return GridRect::new(
            c1.min(c2),
            r1.min(r2),
            c1.abs_diff(c2) + 1,
            r1.abs_diff(r2) + 1,
        )
        .map_err(|_| invalid());
    }

    if let Some(caps) = cell_re().captures(reference) {
        let row = row_index(&caps[1]).ok_or_else(invalid)?;
        let col: u32 = caps[2].parse().map_err(|_| invalid())?;
        return GridRect::cell(col, row).map_err(|_| invalid());
    }

    let parts: Vec<&str> = reference.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(invalid());
    }
    let mut nums = [0i64; 4];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| invalid())?;
    }
    let [x, y, w, h] = nums;
    if x < 1 || y < 1 || w < 1 || h < 1 {
        return Err(invalid());
    }
    let to_u32 = |v: i64| u32::try_from(v).map_err(|_| invalid());
    GridRect::new(to_u32(x)?, to_u32(y)?, to_u32(w)?, to_u32(h)?).map_err(|_| invalid())
}
