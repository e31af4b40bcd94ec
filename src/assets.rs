//! Font and asset collaborators.
//!
//! The builder never touches the filesystem itself. Font availability and
//! asset lookups go through the [`FontCatalog`] and [`AssetProbe`] traits;
//! the defaults ([`AnyFont`], [`NullAssets`]) perform no I/O at all.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Font-existence check used to emit warnings.
pub trait FontCatalog: Send + Sync {
    /// Check if a font family is available.
    fn font_exists(&self, name: &str) -> bool;
}

/// Lookup and intrinsic-size probe for external assets.
pub trait AssetProbe: Send + Sync {
    /// Check if the asset at `path` can be found.
    fn exists(&self, path: &str) -> bool;

    /// Intrinsic `(width_mm, height_mm)` of an embedded asset.
    fn probe_size(&self, path: &str) -> Result<(f64, f64)>;
}

/// Font catalog that accepts every family.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyFont;

impl FontCatalog for AnyFont {
    fn font_exists(&self, _name: &str) -> bool {
        true
    }
}

/// Font catalog backed by a fixed list of families (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct KnownFonts {
    families: BTreeSet<String>,
}

impl KnownFonts {
    /// Create a catalog from family names.
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            families: families
                .into_iter()
                .map(|f| f.as_ref().trim().to_lowercase())
                .collect(),
        }
    }
}

impl FontCatalog for KnownFonts {
    fn font_exists(&self, name: &str) -> bool {
        self.families.contains(&name.trim().to_lowercase())
    }
}

/// Asset probe that reports every asset as present and never measures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAssets;

impl AssetProbe for NullAssets {
    fn exists(&self, _path: &str) -> bool {
        true
    }

    fn probe_size(&self, path: &str) -> Result<(f64, f64)> {
        Err(Error::AssetProbe(format!("no probe configured for '{path}'")))
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Bytes scanned for the first `/MediaBox`.
const PROBE_LIMIT: u64 = 200_000;

/// Millimetres per PDF user unit as the downstream renderer scales it
/// (90 units per inch rather than 72).
pub const MM_PER_PT: f64 = 25.4 / 90.0;

/// US Letter in points, used when a PDF declares no usable media box.
pub const LETTER_PT: (f64, f64) = (612.0, 792.0);

fn media_box_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"/MediaBox\s*\[\s*(-?\d+(?:\.\d*)?)\s+(-?\d+(?:\.\d*)?)\s+(-?\d+(?:\.\d*)?)\s+(-?\d+(?:\.\d*)?)\s*\]",
        )
        .unwrap()
    })
}

/// Check if data starts with the PDF header.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Page size in points from the first `/MediaBox` in `data`.
///
/// Degenerate boxes (a side of 1pt or less) are treated as absent.
pub fn media_box_pt(data: &[u8]) -> Option<(f64, f64)> {
    let text: String = data.iter().map(|&b| b as char).collect();
    let caps = media_box_re().captures(&text)?;
    let mut n = [0f64; 4];
    for (slot, i) in n.iter_mut().zip(1..=4) {
        *slot = caps[i].parse().ok()?;
    }
    let w = (n[2] - n[0]).abs();
    let h = (n[3] - n[1]).abs();
    if w > 1.0 && h > 1.0 && w.is_finite() && h.is_finite() {
        Some((w, h))
    } else {
        None
    }
}

/// Intrinsic size in mm of the first page of a PDF, falling back to Letter.
pub fn pdf_intrinsic_size_mm(data: &[u8]) -> (f64, f64) {
    let (w, h) = media_box_pt(data).unwrap_or(LETTER_PT);
    (w * MM_PER_PT, h * MM_PER_PT)
}

/// Filesystem-backed probe resolving relative paths against a base directory.
#[derive(Debug, Clone)]
pub struct FsAssets {
    base_dir: PathBuf,
}

impl FsAssets {
    /// Create a probe rooted at `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve an asset path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

impl Default for FsAssets {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetProbe for FsAssets {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn probe_size(&self, path: &str) -> Result<(f64, f64)> {
        let full = self.resolve(path);
        let file = File::open(&full)?;
        let mut data = Vec::new();
        BufReader::new(file).take(PROBE_LIMIT).read_to_end(&mut data)?;
        if !is_pdf(&data) {
            return Err(Error::AssetProbe(format!(
                "'{}' is not a PDF file",
                full.display()
            )));
        }
        Ok(pdf_intrinsic_size_mm(&data))
    }
}
