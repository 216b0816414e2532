//! Line-oriented JSON5 reader for stitch placement lists.
//!
//! Each non-empty line holds one placement object:
//!
//! ```text
//! {x: 0, y: 0, kind: "full", color: "dmc:310"}
//! {x: 1, y: 0, kind: "quarter-tl", color: "321"}   // bare id: default palette
//! ```
//!
//! JSON5 allows comments, trailing commas and unquoted keys. Lines that are
//! blank or contain only a `//` comment are skipped.

use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use thiserror::Error;

use crate::sparse_map::Coord;
use crate::stitch::StitchKind;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

/// One stitch to place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_kind")]
    pub kind: StitchKind,
    /// `"category:id"` or a bare id; absent means the fallback color
    #[serde(default)]
    pub color: Option<String>,
}

fn default_kind() -> StitchKind {
    StitchKind::Full
}

impl Placement {
    pub fn pos(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Result of parsing a placement stream.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Parsed placements with their 1-based line numbers
    pub placements: Vec<(usize, Placement)>,
    /// Lines that failed to parse
    pub errors: Vec<ParseError>,
}

/// Parse a single JSON5 line into a placement.
pub fn parse_line(line: &str, line_number: usize) -> Result<Placement, ParseError> {
    json5::from_str(line).map_err(|e| ParseError { message: e.to_string(), line: line_number })
}

/// Parse a stream of placements, one per line.
///
/// Malformed lines are collected in `errors` and parsing continues. An I/O
/// error ends the stream and is recorded against the line it occurred on.
pub fn parse_stream<R: Read>(reader: R) -> ParseResult {
    let mut result = ParseResult::default();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                result.errors.push(ParseError { message: e.to_string(), line: line_number });
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        match parse_line(trimmed, line_number) {
            Ok(placement) => result.placements.push((line_number, placement)),
            Err(e) => {
                log::warn!("{}", e);
                result.errors.push(e);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stitch::{Orientation, Quadrant};
    use std::io::Cursor;

    #[test]
    fn test_parse_line_full() {
        let placement = parse_line(r#"{"x": 3, "y": -1, "kind": "full", "color": "dmc:310"}"#, 1)
            .expect("valid placement");
        assert_eq!(placement.pos(), Coord::new(3, -1));
        assert_eq!(placement.kind, StitchKind::Full);
        assert_eq!(placement.color.as_deref(), Some("dmc:310"));
    }

    #[test]
    fn test_parse_line_json5_and_defaults() {
        let placement = parse_line("{x: 0, y: 2, /* no kind */ }", 4).expect("valid placement");
        assert_eq!(placement.kind, StitchKind::Full);
        assert_eq!(placement.color, None);

        let half = parse_line(r#"{x: 0, y: 0, kind: "half\\"}"#, 1).expect("valid placement");
        assert_eq!(half.kind, StitchKind::Half(Orientation::Backslash));
    }

    #[test]
    fn test_parse_line_unknown_kind() {
        let err = parse_line(r#"{x: 0, y: 0, kind: "french-knot"}"#, 7).unwrap_err();
        assert_eq!(err.line, 7);
        assert!(err.message.contains("french-knot"));
    }

    #[test]
    fn test_parse_stream_collects_errors() {
        let input = "\
// border
{x: 0, y: 0, kind: \"petite-tr\", color: \"321\"}

{x: 1, y: 0
{x: 2, y: 0, kind: \"full\"}
";
        let result = parse_stream(Cursor::new(input));
        assert_eq!(result.placements.len(), 2);
        assert_eq!(result.placements[0].0, 2);
        assert_eq!(result.placements[0].1.kind, StitchKind::Petite(Quadrant::TopRight));
        assert_eq!(result.placements[1].0, 5);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 4);
    }

    #[test]
    fn test_parse_stream_empty() {
        let result = parse_stream(Cursor::new(""));
        assert!(result.placements.is_empty());
        assert!(result.errors.is_empty());
    }
}
