//! `pages list`: show every registered page.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::SourceArgs;

/// Arguments for `pages list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct PageRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "directive")]
    directive: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let app = self.source.build_app()?;
        let prefix = &app.config().embed_prefix;
        let rows: Vec<PageRow> = app
            .sources()
            .map(|(id, path)| PageRow {
                id: id.to_string(),
                directive: pages_renderer::embed::directive_name(prefix, id.as_str()),
                path: path.display().to_string(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("{}", "No pages found.".yellow());
            return Ok(());
        }
        let count = rows.len();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("{} {count} page(s)", "✓".green().bold());
        Ok(())
    }
}
