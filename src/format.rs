//! Log line formatting

use std::fmt::{self, Display, Write as _};

use chrono::{DateTime, Local};

use crate::level::Level;

/// Timestamp layout of every log line, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One log call, built fresh and consumed by the sinks
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    /// Qualified name of the calling function
    pub caller: String,
    pub line: Option<u32>,
    pub message: String,
}

impl LogRecord {
    /// Create a record stamped with the current local time
    pub fn new(
        level: Level,
        caller: impl Into<String>,
        line: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            caller: caller.into(),
            line,
            message: message.into(),
        }
    }
}

/// Builds `<timestamp> <LEVEL> <caller>[:<line>] <message>\n`
#[derive(Debug, Clone, Copy)]
pub struct LogFormatter {
    show_line: bool,
}

impl LogFormatter {
    pub fn new(show_line: bool) -> Self {
        Self { show_line }
    }

    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(48 + record.caller.len() + record.message.len());
        let _ = write!(
            out,
            "{} {:<5} {}",
            record.timestamp.format(TIMESTAMP_FORMAT),
            record.level,
            record.caller
        );
        if let (true, Some(line)) = (self.show_line, record.line) {
            let _ = write!(out, ":{}", line);
        }
        out.push(' ');
        out.push_str(&record.message);
        out.push('\n');
        out
    }
}

impl Default for LogFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Render a list of values the way a bracketed list prints, then drop the
/// outer brackets: `["a", 1]` becomes `a 1`.
pub fn render_message(args: &[&dyn Display]) -> String {
    strip_list_brackets(&ListRepr(args).to_string()).to_string()
}

/// Remove at most one leading `[` and at most one trailing `]`
pub fn strip_list_brackets(repr: &str) -> &str {
    let repr = repr.strip_prefix('[').unwrap_or(repr);
    repr.strip_suffix(']').unwrap_or(repr)
}

struct ListRepr<'a>(&'a [&'a dyn Display]);

impl Display for ListRepr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_char(']')
    }
}
