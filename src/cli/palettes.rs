//! Palette listing commands

use clap::Subcommand;
use std::process::ExitCode;

use crate::config::StitchConfig;
use crate::palettes;
use crate::registry::{ColorRegistry, MetaColorManager};

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum PaletteAction {
    /// List all available built-in palettes
    List,
    /// Show the colors of a specific palette
    Show {
        /// Id of the palette to show (e.g. dmc, anchor)
        id: String,
    },
}

/// Execute the palettes command
pub fn run_palettes(action: PaletteAction, config: &StitchConfig) -> ExitCode {
    match action {
        PaletteAction::List => {
            println!("Built-in palettes:");
            for id in palettes::list_builtins() {
                let Some(catalog) = palettes::get_builtin(id) else {
                    continue;
                };
                let marker = if id == config.palettes.default { " (default)" } else { "" };
                println!("  {:<8} {} - {} colors{}", id, catalog.name, catalog.len(), marker);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show { id } => {
            let mut meta = MetaColorManager::new();
            if let Err(e) = meta.populate_from(&[id.as_str()]) {
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("Available palettes:");
                for builtin in palettes::list_builtins() {
                    eprintln!("  {}", builtin);
                }
                return ExitCode::from(EXIT_ERROR);
            }

            let Some(manager) = meta.color_manager(&id) else {
                return ExitCode::from(EXIT_ERROR);
            };
            println!("Palette: {} ({})", manager.name(), manager.id());
            println!();
            for color in manager.iter() {
                println!("  {:<8} {}  {}", color.id(), color.rgb(), color.name());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}
