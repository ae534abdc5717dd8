mod cli;
mod logging;

use std::process;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Cli;
use folder_sync::config::{load_configuration, FileConfig};
use folder_sync::{Error, LogReporter, Shutdown, SyncEngine};
use tracing::error;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let file_config = match &args.config {
        Some(path) => match load_configuration(path) {
            Ok(file_config) => file_config,
            Err(err) => usage_error(
                ErrorKind::InvalidValue,
                format!("Error loading configuration {}: {}", path.display(), err),
            ),
        },
        None => FileConfig::default(),
    };

    let app_config = match file_config.merge(args.overrides()).resolve() {
        Ok(app_config) => app_config,
        Err(Error::MissingOptions(missing)) => usage_error(
            ErrorKind::MissingRequiredArgument,
            format!("Missing arguments: {}", missing.join(", ")),
        ),
        Err(err) => usage_error(ErrorKind::InvalidValue, err),
    };

    let engine = match SyncEngine::new(app_config.sync, Arc::new(LogReporter)) {
        Ok(engine) => engine,
        Err(err) => usage_error(ErrorKind::InvalidValue, err),
    };

    logging::init_logger(&app_config.log_file, &app_config.log_level)?;

    // Nothing triggers this today; the loop ends when the process is terminated.
    let shutdown = Shutdown::new();
    if let Err(err) = engine.run(&shutdown) {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

/// Print the message with usage text and exit with status 2.
fn usage_error(kind: ErrorKind, message: impl std::fmt::Display) -> ! {
    Cli::command().error(kind, message).exit()
}
