//! Typography, paragraph and shape style values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A length with an explicit unit (e.g. `2pt`, `5mm`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Length {
    /// Magnitude
    pub value: f64,
    /// Unit
    pub unit: LengthUnit,
}

/// Units accepted for stroke and radius lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Typographic points
    Pt,
    /// Millimetres
    Mm,
    /// Centimetres
    Cm,
    /// Inches
    In,
    /// Relative to font size
    Em,
    /// Percentage of the frame
    Percent,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Pt => "pt",
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
            LengthUnit::Em => "em",
            LengthUnit::Percent => "%",
        }
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .ok_or_else(|| format!("missing unit in '{s}'"))?;
        let (num, unit) = s.split_at(split);
        let value: f64 = num
            .parse()
            .map_err(|_| format!("invalid number in '{s}'"))?;
        let unit = match unit.trim().to_ascii_lowercase().as_str() {
            "pt" => LengthUnit::Pt,
            "mm" => LengthUnit::Mm,
            "cm" => LengthUnit::Cm,
            "in" => LengthUnit::In,
            "em" => LengthUnit::Em,
            "%" => LengthUnit::Percent,
            other => return Err(format!("unrecognized unit '{other}'")),
        };
        if !value.is_finite() {
            return Err(format!("invalid number in '{s}'"));
        }
        Ok(Length { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl From<Length> for String {
    fn from(len: Length) -> Self {
        len.to_string()
    }
}

impl TryFrom<String> for Length {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Paragraph layout options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphOptions {
    /// Line leading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading: Option<String>,
    /// Spacing between paragraphs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    /// Indent of each paragraph's first line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line_indent: Option<String>,
    /// Indent of all lines but the first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hanging_indent: Option<String>,
    /// Line-break mode (`auto`, `loose`, `strict`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linebreaks: Option<String>,
    /// Justified text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify: Option<bool>,
}

impl ParagraphOptions {
    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        *self == ParagraphOptions::default()
    }

    fn or(self, base: &ParagraphOptions) -> ParagraphOptions {
        ParagraphOptions {
            leading: self.leading.or_else(|| base.leading.clone()),
            spacing: self.spacing.or_else(|| base.spacing.clone()),
            first_line_indent: self.first_line_indent.or_else(|| base.first_line_indent.clone()),
            hanging_indent: self.hanging_indent.or_else(|| base.hanging_indent.clone()),
            linebreaks: self.linebreaks.or_else(|| base.linebreaks.clone()),
            justify: self.justify.or(base.justify),
        }
    }
}

/// Shape options used by rectangle elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeOptions {
    /// Fill opacity, unclamped as declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Stroke width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Length>,
    /// Stroke colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Corner radius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<Length>,
}

impl ShapeOptions {
    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        *self == ShapeOptions::default()
    }

    fn or(self, base: &ShapeOptions) -> ShapeOptions {
        ShapeOptions {
            alpha: self.alpha.or(base.alpha),
            stroke: self.stroke.or(base.stroke),
            stroke_color: self.stroke_color.or_else(|| base.stroke_color.clone()),
            radius: self.radius.or(base.radius),
        }
    }
}

/// The explicit fields of a style declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProperties {
    /// Font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font weight (named or numeric)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Font size (e.g. `24pt`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Text or fill colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Paragraph options
    #[serde(default, skip_serializing_if = "ParagraphOptions::is_empty")]
    pub paragraph: ParagraphOptions,
    /// Shape options
    #[serde(default, skip_serializing_if = "ShapeOptions::is_empty")]
    pub shape: ShapeOptions,
}

impl StyleProperties {
    /// Fill every unset field of `self` from `base`.
    pub fn or(self, base: &StyleProperties) -> StyleProperties {
        StyleProperties {
            font: self.font.or_else(|| base.font.clone()),
            weight: self.weight.or_else(|| base.weight.clone()),
            size: self.size.or_else(|| base.size.clone()),
            color: self.color.or_else(|| base.color.clone()),
            paragraph: self.paragraph.or(&base.paragraph),
            shape: self.shape.or(&base.shape),
        }
    }
}

/// A named style definition (built-in or declared by the document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Canonical lowercase name
    pub name: String,
    /// Explicit fields
    #[serde(flatten)]
    pub properties: StyleProperties,
}

impl Style {
    /// Create a style; the name is lowercased.
    pub fn new(name: &str, properties: StyleProperties) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            properties,
        }
    }
}

/// The effective style for an element after the cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    /// Name of the style that was resolved
    pub name: String,
    /// Effective fields
    #[serde(flatten)]
    pub properties: StyleProperties,
}

impl ResolvedStyle {
    /// Effective font family.
    pub fn font(&self) -> Option<&str> {
        self.properties.font.as_deref()
    }

    /// Effective colour.
    pub fn color(&self) -> Option<&str> {
        self.properties.color.as_deref()
    }
}
