//! Logger setup
//!
//! INFO and more verbose records go to stdout, WARN and ERROR to stderr. An
//! optional log file receives a copy of everything.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Install the global subscriber. Only the first successful call has effect.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let console = std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout);
    let builder = tracing_subscriber::fmt().with_max_level(level);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(console.and(Arc::new(file)))
                .try_init()
        }
        None => builder
            .with_ansi(std::io::stdout().is_terminal())
            .with_writer(console)
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install logger: {e}"))
}
