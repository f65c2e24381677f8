//! Daylog - leveled logger with caller location and daily rotating log files
//!
//! Each call is formatted once as
//! `YYYY-MM-DD HH:MM:SS.mmm LEVEL caller::path:line message` and written to
//! standard output and/or `<dir>/<base>.log`, each sink gated by its own
//! minimum level. A log file left over from an earlier day is renamed to
//! `<base>_YYYYMMDD.log` (its own modification date) before the next write.

pub mod caller;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod retention;
pub mod sink;

pub use caller::CallSite;
pub use config::{Config, LogPaths};
pub use error::{FailurePolicy, LogError};
pub use format::{LogFormatter, LogRecord};
pub use level::{check_level, Level};
pub use logger::Logger;
pub use retention::cleanup_archives;
