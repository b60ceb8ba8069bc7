pub mod list;
pub mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pages_core::{config, PagesConfig};
use pages_renderer::App;

/// Where pages come from; shared by every subcommand.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Directory to scan for templates (repeatable).
    #[arg(short, long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// YAML config file; its directories are scanned before `--dir` ones.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    pub fn build_app(&self) -> Result<App> {
        let mut cfg = match &self.config {
            Some(path) => config::load(path)
                .with_context(|| format!("cannot load config {}", path.display()))?,
            None => PagesConfig::default(),
        };
        cfg.directories.extend(self.dirs.iter().cloned());
        if cfg.directories.is_empty() && cfg.pages.is_empty() {
            anyhow::bail!("no pages to load; pass --dir or --config");
        }
        tracing::debug!("loading pages from {:?}", cfg.directories);
        App::from_config(&cfg).context("failed to build page registry")
    }
}
