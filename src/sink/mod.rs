//! Destinations for formatted log lines
//!
//! Each sink is gated independently by the logger; the sinks themselves
//! write whatever they are handed.

mod console;
mod file;

pub use console::ConsoleSink;
pub use file::FileSink;
