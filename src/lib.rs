//! Stitchbook - bookkeeping core for cross-stitch pattern documents
//!
//! This library provides:
//! - A sparse grid of stitch cells addressed by integer coordinate, with
//!   merge and overwrite semantics for partially occupied cells
//! - Ordered, id-keyed thread palettes with change notifications
//! - A usage tracker that keeps per-color back-references and weighted
//!   thread consumption consistent as stitches come and go
//! - Built-in thread catalogs and a registry resolving `category:id` lookups

pub mod cli;
pub mod color;
pub mod config;
pub mod palettes;
pub mod parser;
pub mod pattern;
pub mod registry;
pub mod sparse_map;
pub mod stitch;
