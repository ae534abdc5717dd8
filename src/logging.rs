use anyhow::{anyhow, Context};
use chrono::Local;
use std::fmt;
use std::path::Path;
use tracing::{debug, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Layer};

/// day/month/year hour:minute:second AM/PM
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

struct LogTimestamp;

impl FormatTime for LogTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// A `fmt` layer writing `<timestamp> <message>` lines: no level, no target,
/// no colors.
fn line_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_fmt::layer()
        .with_writer(make_writer)
        .with_timer(LogTimestamp)
        .with_level(false)
        .with_target(false)
        .with_ansi(false)
}

/// Log `<timestamp> <message>` lines to stdout and to `log_file` (appended).
///
/// File writes are unbuffered so nothing is lost when the process is killed,
/// which is the normal way the sync loop ends.
pub fn init_logger(log_file: &Path, level: &str) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level '{}'", level))?;

    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("Log path {} has no file name", log_file.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Unable to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(line_layer(std::io::stdout)) // Log to stdout
        .with(line_layer(file_appender)) // Log to file
        .with(filter_layer)
        .try_init()?;

    debug!("Logging to stdout and {}", log_file.display());

    Ok(())
}
