//! Padding shorthand parsing and cascade accumulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Four-sided lengths in millimetres (top, right, bottom, left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    /// Top side
    pub top: f64,
    /// Right side
    pub right: f64,
    /// Bottom side
    pub bottom: f64,
    /// Left side
    pub left: f64,
}

impl Padding {
    /// Create padding from explicit sides.
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same value on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// All sides zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Check if every side is zero.
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }

    /// Expand TRBL shorthand from a list of 1 to 4 values.
    ///
    /// One value applies to all sides, two to (vertical, horizontal), three
    /// to (top, horizontal, bottom) and four in CSS order. Extra values are
    /// ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        match *values {
            [] => None,
            [all] => Some(Self::uniform(all)),
            [v, h] => Some(Self::new(v, h, v, h)),
            [t, h, b] => Some(Self::new(t, h, b, h)),
            [t, r, b, l, ..] => Some(Self::new(t, r, b, l)),
        }
    }

    /// Parse comma and/or whitespace separated shorthand (e.g. `5`, `1,2`,
    /// `1 2 3 4`). Values are plain numbers in millimetres.
    pub fn parse(raw: &str) -> Result<Self> {
        let values = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| match p.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(Error::invalid_value("PADDING", raw.trim())),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_values(&values).ok_or_else(|| Error::invalid_value("PADDING", raw.trim()))
    }
}

impl Add for Padding {
    type Output = Padding;

    fn add(self, rhs: Padding) -> Padding {
        Padding::new(
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
            self.left + rhs.left,
        )
    }
}

impl AddAssign for Padding {
    fn add_assign(&mut self, rhs: Padding) {
        *self = *self + rhs;
    }
}

/// Running total of padding contributions across cascade levels.
///
/// A cascade that has seen at least one declaration resolves to
/// `Some(total)`, even when the total is all zeros; a cascade that has seen
/// none resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddingCascade {
    total: Option<Padding>,
}

impl PaddingCascade {
    /// Start an empty cascade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one level's contribution; `None` leaves the cascade unchanged.
    pub fn push(&mut self, level: Option<Padding>) -> &mut Self {
        if let Some(p) = level {
            self.total = Some(self.total.unwrap_or_default() + p);
        }
        self
    }

    /// Return a new cascade with `level` appended.
    pub fn with(mut self, level: Option<Padding>) -> Self {
        self.push(level);
        self
    }

    /// Combine two cascades, `self` first.
    pub fn combine(self, other: PaddingCascade) -> PaddingCascade {
        self.with(other.total)
    }

    /// Whether any level declared padding.
    pub fn is_declared(&self) -> bool {
        self.total.is_some()
    }

    /// The resolved padding.
    pub fn resolve(&self) -> Option<Padding> {
        self.total
    }
}

/// Accumulate padding from document, page, ancestors (outermost first) and
/// element, in that order.
pub fn resolve_padding(
    document: Option<Padding>,
    page: Option<Padding>,
    ancestors: &[Padding],
    element: Option<Padding>,
) -> Option<Padding> {
    let mut cascade = PaddingCascade::new();
    cascade.push(document).push(page);
    for ancestor in ancestors {
        cascade.push(Some(*ancestor));
    }
    cascade.push(element).resolve()
}
