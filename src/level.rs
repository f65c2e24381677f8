//! Log levels and threshold checks

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a log message, ordered `Debug < Info < Warn < Error < None`.
///
/// `None` only makes sense as a threshold: it disables a sink entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "DEBUG")]
    Debug,
    #[serde(alias = "INFO")]
    Info,
    #[serde(alias = "WARN")]
    Warn,
    #[serde(alias = "ERROR")]
    Error,
    #[serde(alias = "NONE")]
    None,
}

impl Level {
    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::None => "NONE",
        }
    }

    /// Check whether a message at this level passes a sink's threshold
    pub fn passes(self, threshold: Level) -> bool {
        check_level(self, threshold)
    }
}

/// Returns true iff `candidate >= threshold`.
pub fn check_level(candidate: Level, threshold: Level) -> bool {
    candidate >= threshold
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "none" | "off" => Ok(Level::None),
            other => anyhow::bail!("Unknown log level '{}'", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::None,
    ];

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::None);
    }

    #[test]
    fn test_check_level_examples() {
        assert!(check_level(Level::Warn, Level::Info));
        assert!(!check_level(Level::Info, Level::Warn));
        assert!(check_level(Level::Error, Level::Error));
    }

    #[test]
    fn test_check_level_threshold_is_antisymmetric() {
        for low in ALL {
            for high in ALL.iter().copied().filter(|l| *l >= low) {
                assert!(check_level(high, low), "{high} should pass {low}");
                assert_eq!(check_level(low, high), low == high, "{low} vs {high}");
            }
        }
    }

    #[test]
    fn test_none_threshold_disables_everything() {
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            assert!(!level.passes(Level::None));
        }
    }

    #[test]
    fn test_display_pads_to_width() {
        assert_eq!(format!("{:<5}|", Level::Info), "INFO |");
        assert_eq!(format!("{:<5}|", Level::Error), "ERROR|");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("off".parse::<Level>().unwrap(), Level::None);
        assert!("loud".parse::<Level>().is_err());
    }
}
