//! stitch - command-line tool for thread palettes and stitch usage reports

use std::process::ExitCode;

use stitchbook::cli;

fn main() -> ExitCode {
    cli::run()
}
