//! `pages render <id>`: render a single page.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use super::SourceArgs;

/// Arguments for `pages render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Page id, e.g. `index.tpl` or `bits/header.tpl`.
    pub id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// JSON file holding the data context; `-` reads stdin.
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let app = self.source.build_app()?;
        let data = match &self.data {
            Some(path) => read_data(path)?,
            None => Value::Object(Default::default()),
        };

        match &self.out {
            Some(path) => {
                // The target is only touched once the page rendered completely.
                let mut buf = Vec::new();
                app.execute(&self.id, &mut buf, &data)
                    .with_context(|| format!("render failed for '{}'", self.id))?;
                std::fs::write(path, buf)
                    .with_context(|| format!("cannot write {}", path.display()))?;
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                app.execute(&self.id, &mut out, &data)
                    .with_context(|| format!("render failed for '{}'", self.id))?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

fn read_data(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("cannot read data from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read data file {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}
