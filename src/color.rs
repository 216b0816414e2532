//! Thread color values and hex parsing
//!
//! A [`Color`] is an immutable identified record (id, display name, RGB value).
//! Colors are created once when a palette loads and are shared by reference
//! (`Arc<Color>`) between the palette that owns them and every document
//! structure that points at them.
//!
//! Supported hex formats: `#RGB`, `#RRGGBB` (the leading `#` is optional for
//! catalog data, which commonly omits it).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3 or 6 hex chars)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An opaque 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as an uppercase `#RRGGBB` string.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Parse a hex color string (`#RGB`, `#RRGGBB`, with or without the `#`).
///
/// # Examples
///
/// ```
/// use stitchbook::color::{parse_hex, Rgb};
///
/// assert_eq!(parse_hex("#F00").unwrap(), Rgb::new(255, 0, 0));
/// assert_eq!(parse_hex("2D2D2D").unwrap(), Rgb::new(45, 45, 45));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, has the wrong length, or
/// contains non-hex characters.
pub fn parse_hex(s: &str) -> Result<Rgb, ColorError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.is_empty() {
        return Err(ColorError::Empty);
    }

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits)
        [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgb::new(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Identity of a color: the palette it belongs to plus its id.
///
/// Displays as `category:id`, or the bare id for colors outside any palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorKey {
    pub category: String,
    pub id: String,
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_empty() {
            f.write_str(&self.id)
        } else {
            write!(f, "{}:{}", self.category, self.id)
        }
    }
}

/// An identified thread color.
///
/// Identity is the (`category`, `id`) pair: ids are unique within the palette
/// that loaded the color, and `category` names that palette. The display name
/// and RGB value never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    id: String,
    name: String,
    rgb: Rgb,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    category: String,
}

impl Color {
    /// Id of the color substituted for stitches created without one.
    pub const FALLBACK_ID: &'static str = "default";

    pub fn new(id: impl Into<String>, name: impl Into<String>, rgb: Rgb) -> Self {
        Self { id: id.into(), name: name.into(), rgb, category: String::new() }
    }

    /// Shared black fallback color.
    pub fn fallback() -> Arc<Color> {
        Arc::new(Color::new(Self::FALLBACK_ID, "Default", Rgb::new(0, 0, 0)))
    }

    /// Set the palette this color belongs to.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    /// Palette id, empty for colors not loaded through a palette.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn key(&self) -> ColorKey {
        ColorKey { category: self.category.clone(), id: self.id.clone() }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.id, self.name, self.rgb)
    }
}
