//! The logger: formats each call once and hands it to the gated sinks

use std::fmt::Display;
use std::sync::Arc;

use crate::caller::CallSite;
use crate::config::Config;
use crate::error::{FailurePolicy, LogError};
use crate::format::{render_message, LogFormatter, LogRecord};
use crate::level::Level;
use crate::sink::{ConsoleSink, FileSink};

/// Leveled logger writing to the console and a daily rotating file.
///
/// Every call is independent: the level travels as a parameter, so a single
/// instance can be shared across threads behind an `Arc`. File writes to the
/// same path are serialized inside [`FileSink`].
///
/// Use the [`debug!`](crate::debug), [`info!`](crate::info),
/// [`warn!`](crate::warn) and [`error!`](crate::error) macros, which capture
/// the call site:
///
/// ```no_run
/// use daylog::{Config, Level, Logger};
///
/// let logger = Logger::new(Config::new("/var/log/app", "server", Level::Info, Level::Debug));
/// daylog::info!(logger, "listening on", 8080).ok();
/// ```
#[derive(Debug)]
pub struct Logger {
    config: Arc<Config>,
    formatter: LogFormatter,
    console: ConsoleSink,
    file: FileSink,
}

impl Logger {
    /// Create a logger writing console output to standard output
    pub fn new(config: impl Into<Arc<Config>>) -> Self {
        Self::with_console(config, ConsoleSink::stdout())
    }

    /// Create a logger with a custom console sink
    pub fn with_console(config: impl Into<Arc<Config>>, console: ConsoleSink) -> Self {
        let config = config.into();
        let formatter = LogFormatter::new(config.show_line);
        let file = FileSink::new(config.log_paths().clone());
        Self {
            config,
            formatter,
            console,
            file,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a message at `level` would reach at least one sink
    pub fn enabled(&self, level: Level) -> bool {
        level != Level::None
            && (level.passes(self.config.console_min_level)
                || level.passes(self.config.file_min_level))
    }

    pub fn debug(&self, site: &CallSite, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log(Level::Debug, site, args)
    }

    pub fn info(&self, site: &CallSite, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log(Level::Info, site, args)
    }

    pub fn warn(&self, site: &CallSite, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log(Level::Warn, site, args)
    }

    pub fn error(&self, site: &CallSite, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log(Level::Error, site, args)
    }

    /// Log at an explicit level.
    ///
    /// Under [`FailurePolicy::Abort`] a failure terminates the process and this
    /// only ever returns `Ok(())`. A `Level::None` message is never written.
    pub fn log(
        &self,
        level: Level,
        site: &CallSite,
        args: &[&dyn Display],
    ) -> Result<(), LogError> {
        if !self.enabled(level) {
            return Ok(());
        }
        let result = self.dispatch(level, site, args);
        match (result, self.config.on_failure) {
            (Err(e), FailurePolicy::Abort) => abort(&e),
            (result, _) => result,
        }
    }

    fn dispatch(
        &self,
        level: Level,
        site: &CallSite,
        args: &[&dyn Display],
    ) -> Result<(), LogError> {
        let caller = site.resolve()?;
        let record = LogRecord::new(level, caller, Some(site.line), render_message(args));
        let line = self.formatter.format(&record);

        if level.passes(self.config.console_min_level) {
            self.console.write_line(&line);
        }
        if level.passes(self.config.file_min_level) {
            self.file.append(&line)?;
        }
        Ok(())
    }
}

fn abort(err: &LogError) -> ! {
    tracing::error!(error = %err, "Logging failed, terminating process");
    eprintln!("daylog: {}", err.diagnostic());
    std::process::exit(1)
}

/// Log at DEBUG: `debug!(logger, value, ...)`
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.debug(&$crate::call_site!(), &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

/// Log at INFO: `info!(logger, value, ...)`
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.info(&$crate::call_site!(), &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

/// Log at WARN: `warn!(logger, value, ...)`
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.warn(&$crate::call_site!(), &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

/// Log at ERROR: `error!(logger, value, ...)`
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.error(&$crate::call_site!(), &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}
