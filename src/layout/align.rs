//! Horizontal/vertical alignment and flow resolution.

use crate::model::ElementKind;
use serde::{Deserialize, Serialize};

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Flush left
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
}

impl HAlign {
    /// Parse an alignment token (`centre` accepted).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(HAlign::Left),
            "center" | "centre" => Some(HAlign::Center),
            "right" => Some(HAlign::Right),
            _ => None,
        }
    }
}

/// Vertical alignment. The vertical-center token is `horizon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// Top edge
    Top,
    /// Vertical center
    Horizon,
    /// Bottom edge
    Bottom,
}

impl VAlign {
    /// Parse a vertical alignment token (`middle`, `center`, `horizon` all
    /// mean vertical center).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" => Some(VAlign::Top),
            "middle" | "center" | "centre" | "horizon" => Some(VAlign::Horizon),
            "bottom" => Some(VAlign::Bottom),
            _ => None,
        }
    }
}

/// Direction in which text content grows inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// Top-down
    #[default]
    Normal,
    /// Anchored at the bottom
    BottomUp,
    /// Anchored at the vertical center
    CenterOut,
}

impl Flow {
    /// Parse a flow token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Flow::Normal),
            "bottom-up" => Some(Flow::BottomUp),
            "center-out" => Some(Flow::CenterOut),
            _ => None,
        }
    }

    /// The vertical alignment this flow implies, if any.
    pub fn implied_valign(self) -> Option<VAlign> {
        match self {
            Flow::Normal => None,
            Flow::BottomUp => Some(VAlign::Bottom),
            Flow::CenterOut => Some(VAlign::Horizon),
        }
    }
}

/// Resolve the effective alignment pair for an element.
///
/// An unset `align` takes the kind's default. An explicit `valign` always
/// wins; otherwise vertically flowable kinds derive it from `flow`.
pub fn resolve_alignment(
    align: Option<HAlign>,
    valign: Option<VAlign>,
    flow: Flow,
    kind: &ElementKind,
) -> (Option<HAlign>, Option<VAlign>) {
    let align = align.or_else(|| kind.default_align());
    let valign = match valign {
        Some(v) => Some(v),
        None if kind.is_flowable() => flow.implied_valign(),
        None => None,
    };
    (align, valign)
}
