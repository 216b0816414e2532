//! Stitch elements and the per-cell stitch payload.
//!
//! Stitches are a closed set of kinds. The usage tracker only needs two
//! things from them (a color and a weight), expressed through [`Element`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::color::Color;
use crate::sparse_map::MergeCell;

/// Stable handle identifying one placed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability the usage tracker consumes.
pub trait Element {
    /// Stable identity used for back-references.
    fn id(&self) -> ElementId;

    /// Color the element is currently displayed with.
    fn color(&self) -> &Arc<Color>;

    /// Usage weight contributed to the element's color.
    fn weight(&self) -> u32;
}

/// Diagonal direction of a half stitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `/` bottom-left to top-right
    Slash,
    /// `\` top-left to bottom-right
    Backslash,
}

/// One quarter of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Occupancy bit for this quadrant.
    pub const fn bit(self) -> u8 {
        match self {
            Quadrant::TopLeft => 0b0001,
            Quadrant::TopRight => 0b0010,
            Quadrant::BottomLeft => 0b0100,
            Quadrant::BottomRight => 0b1000,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "tl",
            Quadrant::TopRight => "tr",
            Quadrant::BottomLeft => "bl",
            Quadrant::BottomRight => "br",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "tl" => Some(Quadrant::TopLeft),
            "tr" => Some(Quadrant::TopRight),
            "bl" => Some(Quadrant::BottomLeft),
            "br" => Some(Quadrant::BottomRight),
            _ => None,
        }
    }
}

/// Mask with every quadrant occupied.
pub const FULL_MASK: u8 = 0b1111;

/// The closed set of stitch shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum StitchKind {
    Full,
    Half(Orientation),
    Quarter(Quadrant),
    Petite(Quadrant),
}

impl StitchKind {
    /// Quadrants of the cell this stitch covers.
    pub const fn mask(self) -> u8 {
        match self {
            StitchKind::Full => FULL_MASK,
            StitchKind::Half(Orientation::Slash) => {
                Quadrant::TopRight.bit() | Quadrant::BottomLeft.bit()
            }
            StitchKind::Half(Orientation::Backslash) => {
                Quadrant::TopLeft.bit() | Quadrant::BottomRight.bit()
            }
            StitchKind::Quarter(q) | StitchKind::Petite(q) => q.bit(),
        }
    }
}

/// Error for unrecognized stitch kind names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stitch kind '{0}' (expected full, half/, half\\, quarter-XX or petite-XX)")]
pub struct UnknownKind(pub String);

impl FromStr for StitchKind {
    type Err = UnknownKind;

    /// Parses `full`, `half/`, `half\`, `quarter-tl` ... `petite-br`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "full" => Some(StitchKind::Full),
            "half/" | "half-slash" => Some(StitchKind::Half(Orientation::Slash)),
            "half\\" | "half-backslash" => Some(StitchKind::Half(Orientation::Backslash)),
            other => match other.split_once('-') {
                Some(("quarter", q)) => Quadrant::from_suffix(q).map(StitchKind::Quarter),
                Some(("petite", q)) => Quadrant::from_suffix(q).map(StitchKind::Petite),
                _ => None,
            },
        };
        kind.ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl TryFrom<String> for StitchKind {
    type Error = UnknownKind;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for StitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchKind::Full => write!(f, "full"),
            StitchKind::Half(Orientation::Slash) => write!(f, "half/"),
            StitchKind::Half(Orientation::Backslash) => write!(f, "half\\"),
            StitchKind::Quarter(q) => write!(f, "quarter-{}", q.suffix()),
            StitchKind::Petite(q) => write!(f, "petite-{}", q.suffix()),
        }
    }
}

/// Thread weight per stitch kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    #[serde(default = "default_full")]
    pub full: u32,
    #[serde(default = "default_half")]
    pub half: u32,
    #[serde(default = "default_quarter")]
    pub quarter: u32,
    #[serde(default = "default_petite")]
    pub petite: u32,
}

fn default_full() -> u32 {
    8
}

fn default_half() -> u32 {
    4
}

fn default_quarter() -> u32 {
    1
}

fn default_petite() -> u32 {
    2
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            full: default_full(),
            half: default_half(),
            quarter: default_quarter(),
            petite: default_petite(),
        }
    }
}

impl WeightTable {
    pub fn weight(&self, kind: StitchKind) -> u32 {
        match kind {
            StitchKind::Full => self.full,
            StitchKind::Half(_) => self.half,
            StitchKind::Quarter(_) => self.quarter,
            StitchKind::Petite(_) => self.petite,
        }
    }
}

/// A placed stitch.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitch {
    id: ElementId,
    kind: StitchKind,
    color: Arc<Color>,
    weight: u32,
}

impl Stitch {
    pub fn new(id: ElementId, kind: StitchKind, color: Arc<Color>, weights: &WeightTable) -> Self {
        Self { id, kind, color, weight: weights.weight(kind) }
    }

    pub fn kind(&self) -> StitchKind {
        self.kind
    }

    /// Swap the display color. Callers must release the stitch from any
    /// usage tracker before re-acquiring it.
    pub fn set_color(&mut self, color: Arc<Color>) {
        self.color = color;
    }
}

impl Element for Stitch {
    fn id(&self) -> ElementId {
        self.id
    }

    fn color(&self) -> &Arc<Color> {
        &self.color
    }

    fn weight(&self) -> u32 {
        self.weight
    }
}

/// Grid payload: which quadrants are covered and by which stitches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StitchCell {
    mask: u8,
    stitches: Vec<ElementId>,
}

impl StitchCell {
    /// Cell holding a single stitch.
    pub fn single(id: ElementId, kind: StitchKind) -> Self {
        Self { mask: kind.mask(), stitches: vec![id] }
    }

    /// Occupied quadrants as a 4-bit mask (see [`Quadrant::bit`]).
    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn is_full(&self) -> bool {
        self.mask == FULL_MASK
    }

    /// Element ids in the cell, sorted.
    pub fn stitches(&self) -> &[ElementId] {
        &self.stitches
    }

    /// Drop one stitch and recompute the mask from the kinds that remain.
    pub fn remove_stitch<F>(&mut self, id: ElementId, kind_of: F) -> bool
    where
        F: Fn(ElementId) -> Option<StitchKind>,
    {
        let Ok(index) = self.stitches.binary_search(&id) else {
            return false;
        };
        self.stitches.remove(index);
        self.mask = self
            .stitches
            .iter()
            .filter_map(|id| kind_of(*id))
            .fold(0, |mask, kind| mask | kind.mask());
        true
    }
}

impl MergeCell for StitchCell {
    fn merge(&mut self, other: &Self) {
        self.mask |= other.mask;
        for id in &other.stitches {
            if let Err(index) = self.stitches.binary_search(id) {
                self.stitches.insert(index, *id);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.stitches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn black() -> Arc<Color> {
        Arc::new(Color::new("310", "Black", Rgb::new(0, 0, 0)))
    }

    #[test]
    fn test_default_weights() {
        let w = WeightTable::default();
        assert_eq!(w.weight(StitchKind::Full), 8);
        assert_eq!(w.weight(StitchKind::Half(Orientation::Slash)), 4);
        assert_eq!(w.weight(StitchKind::Quarter(Quadrant::TopLeft)), 1);
        assert_eq!(w.weight(StitchKind::Petite(Quadrant::BottomRight)), 2);
    }

    #[test]
    fn test_stitch_element_capability() {
        let stitch = Stitch::new(ElementId(7), StitchKind::Full, black(), &WeightTable::default());
        assert_eq!(stitch.id(), ElementId(7));
        assert_eq!(stitch.weight(), 8);
        assert_eq!(stitch.color().id(), "310");
    }

    #[test]
    fn test_kind_masks() {
        assert_eq!(StitchKind::Full.mask(), FULL_MASK);
        assert_eq!(StitchKind::Half(Orientation::Slash).mask(), 0b0110);
        assert_eq!(StitchKind::Half(Orientation::Backslash).mask(), 0b1001);
        assert_eq!(StitchKind::Petite(Quadrant::BottomLeft).mask(), 0b0100);
    }

    #[test]
    fn test_kind_parse_and_display() {
        for name in ["full", "half/", "half\\", "quarter-tl", "petite-br"] {
            let kind: StitchKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }
        assert_eq!("HALF-SLASH".parse(), Ok(StitchKind::Half(Orientation::Slash)));
        assert!("quarter-xx".parse::<StitchKind>().is_err());
        assert!("cross".parse::<StitchKind>().is_err());
    }

    #[test]
    fn test_cell_merge_is_idempotent() {
        let mut cell = StitchCell::single(ElementId(1), StitchKind::Quarter(Quadrant::TopLeft));
        let other = StitchCell::single(ElementId(2), StitchKind::Quarter(Quadrant::BottomRight));

        cell.merge(&other);
        let once = cell.clone();
        cell.merge(&other);

        assert_eq!(cell, once);
        assert_eq!(cell.mask(), 0b1001);
        assert_eq!(cell.stitches(), &[ElementId(1), ElementId(2)]);
    }

    #[test]
    fn test_cell_remove_recomputes_mask() {
        let mut cell = StitchCell::single(ElementId(3), StitchKind::Half(Orientation::Slash));
        cell.merge(&StitchCell::single(ElementId(1), StitchKind::Quarter(Quadrant::TopLeft)));
        assert!(!cell.is_full());

        let kinds = |id: ElementId| match id.0 {
            1 => Some(StitchKind::Quarter(Quadrant::TopLeft)),
            3 => Some(StitchKind::Half(Orientation::Slash)),
            _ => None,
        };
        assert!(cell.remove_stitch(ElementId(3), kinds));
        assert_eq!(cell.mask(), 0b0001);
        assert!(!cell.remove_stitch(ElementId(3), kinds));
        assert!(cell.remove_stitch(ElementId(1), kinds));
        assert!(MergeCell::is_empty(&cell));
        assert_eq!(cell.mask(), 0);
    }
}
