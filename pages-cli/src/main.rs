//! pages: render templates from a page registry.
//!
//! # Usage
//!
//! ```text
//! pages render <id> [--dir <dir>]... [--config <file>] [--data <file.json|->] [--out <file>]
//! pages list [--dir <dir>]... [--config <file>] [--json]
//! ```
//!
//! Log verbosity is read from `PAGES_LOG` (default `warn`).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{list::ListArgs, render::RenderArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pages",
    version,
    about = "Render .tpl pages with embeddable sub-pages",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one page to stdout or a file.
    Render(RenderArgs),

    /// List registered pages.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PAGES_LOG", "warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}
