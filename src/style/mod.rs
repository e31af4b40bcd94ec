//! Named style table and style resolution.
//!
//! The table starts with the built-in `header`, `subheader` and `body`
//! styles. Document declarations (`STYLE_<NAME>`) replace a built-in's
//! explicit fields while unset fields keep the built-in default. Fonts
//! resolve through an ordered chain: declared font, document font
//! override, built-in font.

mod decl;

pub use decl::{is_valid_weight, parse_style_decl, split_top_level, LINEBREAK_MODES, NAMED_WEIGHTS};

use crate::model::{Diagnostic, ResolvedStyle, Style, StyleProperties};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Built-in and document-declared styles for one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    builtin: BTreeMap<String, Style>,
    declared: BTreeMap<String, Style>,
}

impl StyleTable {
    /// Create a table holding only the built-in styles.
    pub fn new() -> Self {
        let builtin = builtin_styles()
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();
        Self {
            builtin,
            declared: BTreeMap::new(),
        }
    }

    /// Parse and declare a style, replacing any earlier declaration with
    /// the same (case-insensitive) name.
    pub fn declare(&mut self, name: &str, decl: &str) -> Vec<Diagnostic> {
        let (properties, diags) = parse_style_decl(&canonical(name), decl);
        self.insert(Style::new(name, properties));
        diags
    }

    /// Declare an already parsed style.
    pub fn insert(&mut self, style: Style) {
        log::debug!("declaring style '{}'", style.name);
        self.declared.insert(style.name.clone(), style);
    }

    /// Check if a style with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        let key = canonical(name);
        self.declared.contains_key(&key) || self.builtin.contains_key(&key)
    }

    /// The document-declared definition of a style, if any.
    pub fn declared(&self, name: &str) -> Option<&Style> {
        self.declared.get(&canonical(name))
    }

    /// The built-in definition of a style, if any.
    pub fn builtin(&self, name: &str) -> Option<&Style> {
        self.builtin.get(&canonical(name))
    }

    /// All style names, sorted and deduplicated.
    pub fn names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .builtin
            .keys()
            .chain(self.declared.keys())
            .map(String::as_str)
            .collect();
        names.into_iter().collect()
    }

    /// Resolve the effective style for `key`.
    ///
    /// Returns `None` when no built-in or declared style has that name.
    pub fn resolve(&self, key: &str, font_override: Option<&str>) -> Option<ResolvedStyle> {
        let name = canonical(key);
        let declared = self.declared.get(&name).map(|s| &s.properties);
        let builtin = self.builtin.get(&name).map(|s| &s.properties);
        if declared.is_none() && builtin.is_none() {
            return None;
        }

        let empty = StyleProperties::default();
        let builtin = builtin.unwrap_or(&empty);
        let mut properties = declared.cloned().unwrap_or_default().or(builtin);

        let override_font = font_override.map(str::trim).filter(|f| !f.is_empty());
        properties.font = [
            declared.and_then(|d| d.font.as_deref()),
            override_font,
            builtin.font.as_deref(),
        ]
        .into_iter()
        .flatten()
        .next()
        .map(str::to_string);

        Some(ResolvedStyle { name, properties })
    }

    /// Fonts referenced by any resolvable style, sorted and deduplicated.
    pub fn fonts(&self, font_override: Option<&str>) -> Vec<String> {
        let fonts: BTreeSet<String> = self
            .names()
            .into_iter()
            .filter_map(|name| self.resolve(name, font_override))
            .filter_map(|style| style.properties.font)
            .collect();
        fonts.into_iter().collect()
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical(name: &str) -> String {
    name.trim().to_lowercase()
}

fn builtin_styles() -> Vec<Style> {
    let text = |weight: Option<&str>, size: Option<&str>| StyleProperties {
        font: Some("Inter".to_string()),
        weight: weight.map(str::to_string),
        size: size.map(str::to_string),
        ..Default::default()
    };
    vec![
        Style::new("header", text(Some("bold"), Some("24pt"))),
        Style::new("subheader", text(Some("semibold"), Some("18pt"))),
        Style::new("body", text(None, None)),
    ]
}
