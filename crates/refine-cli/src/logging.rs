use crate::error::{CliError, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    registry::LookupSpan,
};

/// Levels for the console and the optional log file.
///
/// The file never drops below `INFO`, so run summaries reach it even under `--quiet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogLevels {
    console: LevelFilter,
    file: LevelFilter,
}

impl LogLevels {
    fn from_flags(verbosity: u8, quiet: bool) -> Self {
        let console = if quiet {
            LevelFilter::OFF
        } else {
            match verbosity {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        Self {
            console,
            file: console.max(LevelFilter::INFO),
        }
    }
}

/// Opens the log file for appending so repeated refinements share one log.
fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(CliError::Io)
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(level)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let levels = LogLevels::from_flags(verbosity, quiet);
    let file = log_file.map(open_log_file).transpose()?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(levels.console);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file.map(|f| file_layer(f, levels.file)))
        .init();
    Ok(())
}
