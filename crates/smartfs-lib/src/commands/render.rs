//! Output formatting for `list`

use crate::protocol::VersionHistory;
use clap::ValueEnum;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn render_history<W: Write>(
    file: &Path,
    history: &VersionHistory,
    format: OutputFormat,
    out: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => render_table(file, history, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, history)?;
            writeln!(out)
        }
    }
}

fn render_table<W: Write>(file: &Path, history: &VersionHistory, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== Version History for {} ===", file.display())?;
    writeln!(
        out,
        "{:<6} {:<8} {:<20} {:<10} {}",
        "Ver", "Pinned", "Time", "Size", "Message"
    )?;
    writeln!(out, "{}", "-".repeat(60))?;

    for record in history {
        let pinned = if record.pinned { "YES" } else { "-" };
        writeln!(
            out,
            "{:<6} {:<8} {:<20} {:<10} {}",
            record.id, pinned, record.timestamp, record.size_display, record.message
        )?;
    }
    Ok(())
}
