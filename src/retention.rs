//! Archive retention
//!
//! Deletes dated archives (`<base>_YYYYMMDD.log`) older than the configured
//! number of days. The live file is never touched.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::config::{Config, LOG_EXTENSION};

/// Date embedded in an archive file name, if `name` is an archive of `base`
pub fn archive_date(name: &str, base: &str) -> Option<NaiveDate> {
    let stamp = name
        .strip_prefix(base)?
        .strip_prefix('_')?
        .strip_suffix(LOG_EXTENSION)?;
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

/// Clean up archives according to `config.retention_days`
///
/// Returns the number of files deleted; zero when retention is not configured.
pub fn cleanup_archives(config: &Config) -> Result<usize> {
    match config.retention_days {
        Some(days) => cleanup_archives_before(config, Local::now().date_naive(), days),
        None => Ok(0),
    }
}

/// Delete archives dated more than `retention_days` before `today`
pub fn cleanup_archives_before(
    config: &Config,
    today: NaiveDate,
    retention_days: u64,
) -> Result<usize> {
    let paths = config.log_paths();
    let dir = if paths.directory().is_empty() {
        Path::new(".")
    } else {
        Path::new(paths.directory())
    };
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = today
        .checked_sub_days(chrono::Days::new(retention_days))
        .unwrap_or(NaiveDate::MIN);

    let mut deleted_count = 0;

    for entry in fs::read_dir(dir).context("Failed to read log directory")? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name
            .to_str()
            .and_then(|n| archive_date(n, paths.base_file_name()))
        else {
            continue;
        };
        if date < cutoff && fs::remove_file(entry.path()).is_ok() {
            deleted_count += 1;
        }
    }

    if deleted_count > 0 {
        tracing::info!("Deleted {} old log archives from {}", deleted_count, dir.display());
    }

    Ok(deleted_count)
}
