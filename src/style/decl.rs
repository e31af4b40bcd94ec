//! Style declaration parsing.
//!
//! A declaration is a list of `key: value` (or `key=value`) pairs separated
//! by top-level commas or semicolons, e.g.
//! `font: Inter, weight: bold, color: rgb(10%, 20%, 30%)`.

use crate::error::Error;
use crate::model::{Diagnostic, DiagnosticCode, Length, StyleProperties};
use crate::tree::parse_bool;

/// Named font weights.
pub const NAMED_WEIGHTS: &[&str] = &[
    "thin",
    "extralight",
    "light",
    "regular",
    "medium",
    "semibold",
    "bold",
    "extrabold",
    "black",
];

/// Accepted line-break modes.
pub const LINEBREAK_MODES: &[&str] = &["auto", "loose", "strict"];

/// Check if `value` is a named weight or a multiple of 100 in `100..=900`.
pub fn is_valid_weight(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    if NAMED_WEIGHTS.contains(&v.as_str()) {
        return true;
    }
    matches!(v.parse::<u32>(), Ok(n) if (100..=900).contains(&n) && n % 100 == 0)
}

/// Split on `,` and `;` that are outside parentheses and quotes.
pub fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev = '\0';

    for ch in s.chars() {
        match quote {
            Some(q) => {
                buf.push(ch);
                if ch == q && prev != '\\' {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    buf.push(ch);
                }
                '(' => {
                    depth += 1;
                    buf.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    buf.push(ch);
                }
                ',' | ';' if depth == 0 => parts.push(std::mem::take(&mut buf)),
                _ => buf.push(ch),
            },
        }
        prev = ch;
    }
    if !buf.is_empty() {
        parts.push(buf);
    }
    parts
}

/// Split one declaration part into a lowercase key and a trimmed value.
fn split_pair(part: &str) -> Option<(String, &str)> {
    let (k, v) = part.split_once(':').or_else(|| part.split_once('='))?;
    let key = k.trim().to_ascii_lowercase();
    if key.is_empty() {
        return None;
    }
    Some((key, v.trim()))
}

fn unit_error(name: &str, property: &str, value: &str) -> Diagnostic {
    let err = Error::invalid_unit(property, value);
    Diagnostic::error(DiagnosticCode::of(&err), format!("style '{name}': {err}"))
}

/// Parse a declaration into explicit style fields.
///
/// Unknown keys, weights and line-break modes are warnings; the parsed
/// value is still kept for weights and line-break modes. Stroke and radius
/// without a valid unit are errors and are dropped.
pub fn parse_style_decl(name: &str, decl: &str) -> (StyleProperties, Vec<Diagnostic>) {
    let mut props = StyleProperties::default();
    let mut diags = Vec::new();
    let warn = |code, msg: String| Diagnostic::warning(code, format!("style '{name}': {msg}"));

    for part in split_top_level(decl) {
        let Some((key, value)) = split_pair(&part) else {
            continue;
        };
        let value_owned = value.to_string();
        match key.as_str() {
            "font" | "font-family" => props.font = Some(value_owned),
            "weight" | "font-weight" => {
                if !is_valid_weight(value) {
                    diags.push(warn(
                        DiagnosticCode::InvalidValue,
                        format!("unknown font weight '{value}'"),
                    ));
                }
                props.weight = Some(value_owned);
            }
            "size" | "font-size" => props.size = Some(value_owned),
            "color" | "colour" | "fill" => props.color = Some(value_owned),
            "leading" => props.paragraph.leading = Some(value_owned),
            "spacing" => props.paragraph.spacing = Some(value_owned),
            "first-line-indent" | "first_line_indent" => {
                props.paragraph.first_line_indent = Some(value_owned)
            }
            "hanging-indent" | "hanging_indent" => {
                props.paragraph.hanging_indent = Some(value_owned)
            }
            "linebreaks" => {
                if !LINEBREAK_MODES.contains(&value.to_ascii_lowercase().as_str()) {
                    diags.push(warn(
                        DiagnosticCode::InvalidValue,
                        format!("unknown linebreaks value '{value}'"),
                    ));
                }
                props.paragraph.linebreaks = Some(value_owned);
            }
            "justify" => match parse_bool(value) {
                Some(b) => props.paragraph.justify = Some(b),
                None => diags.push(warn(
                    DiagnosticCode::InvalidValue,
                    format!("justify expects a boolean, got '{value}'"),
                )),
            },
            "alpha" => match value.parse::<f64>() {
                Ok(a) if a.is_finite() => props.shape.alpha = Some(a),
                _ => diags.push(warn(
                    DiagnosticCode::InvalidValue,
                    format!("alpha expects a number, got '{value}'"),
                )),
            },
            "stroke" => match value.parse::<Length>() {
                Ok(len) => props.shape.stroke = Some(len),
                Err(_) => diags.push(unit_error(name, "Stroke", value)),
            },
            "stroke-color" | "stroke_color" => props.shape.stroke_color = Some(value_owned),
            "radius" => match value.parse::<Length>() {
                Ok(len) => props.shape.radius = Some(len),
                Err(_) => diags.push(unit_error(name, "Radius", value)),
            },
            other => diags.push(warn(
                DiagnosticCode::UnknownStyleKey,
                format!("unrecognized property '{other}'"),
            )),
        }
    }
    (props, diags)
}
