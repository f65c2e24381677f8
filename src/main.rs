use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{Context, Result};

use daylog::{cleanup_archives, Config, Level, Logger};

const USAGE: &str = "usage: daylog <debug|info|warn|error> <message...>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daylog=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let level: Level = args.next().context(USAGE)?.parse()?;
    let words: Vec<String> = args.collect();

    let config = match std::env::var_os("DAYLOG_CONFIG") {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::load_or_default()?,
    };

    if !config.directory().is_empty() {
        std::fs::create_dir_all(config.directory())
            .context("Failed to create logs directory")?;
    }

    match cleanup_archives(&config) {
        Ok(count) if count > 0 => tracing::info!("Cleaned up {} old log archives", count),
        Ok(_) => {}
        Err(e) => tracing::warn!("Archive cleanup failed: {:#}", e),
    }

    let logger = Logger::new(config);
    let message: Vec<&dyn Display> = words.iter().map(|w| w as &dyn Display).collect();
    logger.log(level, &daylog::call_site!(), &message)?;
    Ok(())
}
