//! Usage command: place a stitch list and report thread consumption

use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::StitchConfig;
use crate::parser::{parse_stream, ParseResult};
use crate::pattern::Pattern;
use crate::registry::{ColorUsage, MetaColorManager};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// JSON shape of the usage report
#[derive(Debug, Serialize)]
struct UsageSummary {
    colors: Vec<ColorUsage>,
    stitches: usize,
    cells: usize,
    total_weight: u64,
}

fn open_input(input: &Path) -> io::Result<Box<dyn Read>> {
    if input.as_os_str() == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(File::open(input)?))
    }
}

/// Execute the usage command
pub fn run_usage(input: &Path, json: bool, strict: bool, config: &StitchConfig) -> ExitCode {
    let reader = match open_input(input) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let ParseResult { placements, errors } = parse_stream(reader);
    if strict && !errors.is_empty() {
        for e in &errors {
            eprintln!("Error: {}", e);
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let mut meta = MetaColorManager::with_local_name(config.local.name.as_str());
    let builtin: Vec<&str> = config.palettes.builtin.iter().map(String::as_str).collect();
    if let Err(e) = meta.populate_from(&builtin) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let mut pattern = Pattern::new(config.weights);
    for (line, placement) in &placements {
        let color = match placement.color.as_deref() {
            None => None,
            Some(reference) => match meta.resolve(reference, &config.palettes.default) {
                Some(color) => Some(Arc::clone(color)),
                None if strict => {
                    eprintln!("Error: line {}: unknown color '{}'", line, reference);
                    return ExitCode::from(EXIT_ERROR);
                }
                None => {
                    log::warn!("line {}: unknown color '{}', using default", line, reference);
                    None
                }
            },
        };

        match pattern.place(placement.pos(), placement.kind, color) {
            Ok(_) => {}
            Err(e) if strict => {
                eprintln!("Error: line {}: {}", line, e);
                return ExitCode::from(EXIT_ERROR);
            }
            Err(e) => log::warn!("line {}: skipping stitch: {}", line, e),
        }
    }

    let summary = UsageSummary {
        colors: pattern.usage().usage_report(),
        stitches: pattern.len(),
        cells: pattern.grid().len(),
        total_weight: pattern.usage().total_weight(),
    };

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print_table(&summary);
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn print_table(summary: &UsageSummary) {
    println!(
        "{:<8} {:<8} {:<24} {:<8} {:>8} {:>8}",
        "PALETTE", "ID", "NAME", "RGB", "STITCHES", "WEIGHT"
    );
    for row in &summary.colors {
        println!(
            "{:<8} {:<8} {:<24} {:<8} {:>8} {:>8}",
            row.palette, row.id, row.name, row.hex, row.stitches, row.weight
        );
    }
    println!();
    println!(
        "{} stitches in {} cells, total weight {}",
        summary.stitches, summary.cells, summary.total_weight
    );
}
