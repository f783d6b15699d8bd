//! Tourgrid - editable data grid with row-context formulas

mod config;
mod document;
mod error;
mod export;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Context;
use std::env;
use std::path::PathBuf;
use tourgrid_core::{DataGrid, FileWidthStore};

use document::{DocumentHost, GridDocument};

fn print_usage() {
    eprintln!("Usage: tourgrid [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <FILE>                    Grid document to open (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>       Export to markdown file (non-interactive)");
    eprintln!("  -c, --config <FILE>       Settings file (default: <config dir>/tourgrid/config.toml)");
    eprintln!("  -h, --help                Print help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut file_path: Option<PathBuf> = None;
    let mut output_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                output_file = Some(PathBuf::from(&args[i]));
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if file_path.is_none() {
                    file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let Some(file_path) = file_path else {
        print_usage();
        std::process::exit(1);
    };

    if let Err(e) = run(file_path, output_file, config_file) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(
    file_path: PathBuf,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (settings, warnings) = config::load_settings(config_file.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Err(e) = logging::init_logging(&settings) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let document = GridDocument::load(&file_path)
        .with_context(|| format!("could not open {}", file_path.display()))?;
    let props = document.props(&settings);
    let host = DocumentHost::new(document, Some(file_path.clone()));
    let store = FileWidthStore::new(settings.width_dir());
    let grid = DataGrid::new(props, host, store)
        .with_context(|| format!("invalid columns in {}", file_path.display()))?;
    log::info!("opened {} ({} rows)", file_path.display(), grid.rows().len());

    if let Some(output_path) = output_file {
        export::write_markdown(&output_path, &grid)
            .with_context(|| format!("could not write {}", output_path.display()))?;
        println!("Exported to {}", output_path.display());
        return Ok(());
    }

    run_interactive(grid)
}

#[cfg(feature = "tui")]
fn run_interactive(grid: DataGrid<DocumentHost, FileWidthStore>) -> anyhow::Result<()> {
    let mut app = tui::App::new(grid, tui::clipboard::default_clipboard());
    tui::run(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_grid: DataGrid<DocumentHost, FileWidthStore>) -> anyhow::Result<()> {
    anyhow::bail!("built without the terminal UI; use --output to export")
}
