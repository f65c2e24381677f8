//! Daily rotating log file
//!
//! The file is not held open between calls. Every append runs the full
//! cycle under a per-path lock: existence check, open or create, stat,
//! rotate if the file is from an earlier day, write, close.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::{DateTime, Local};

use crate::config::LogPaths;
use crate::error::LogError;

/// Locks shared by every sink in the process, keyed by live file path
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(lock_key(path)).or_default())
}

/// Live path with its directory canonicalized, so relative, absolute and
/// symlinked spellings of one file share a lock. Falls back to the path as
/// given when the directory does not exist yet.
fn lock_key(live: &Path) -> PathBuf {
    let dir = match live.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(dir), live.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => live.to_path_buf(),
    }
}

/// Appends lines to `<dir><base>.log`, archiving it as `<base>_YYYYMMDD.log`
/// once it is from a previous day
#[derive(Debug)]
pub struct FileSink {
    paths: LogPaths,
    live: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSink {
    pub fn new(paths: LogPaths) -> Self {
        let live = paths.live();
        let lock = path_lock(&live);
        Self { paths, live, lock }
    }

    /// Path of the live log file
    pub fn path(&self) -> &Path {
        &self.live
    }

    /// Append one already formatted line
    pub fn append(&self, line: &str) -> Result<(), LogError> {
        self.append_at(line, Local::now())
    }

    /// Append as if the current moment were `now`
    pub fn append_at(&self, line: &str, now: DateTime<Local>) -> Result<(), LogError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.open_log_file(now)?;
        file.write_all(line.as_bytes()).map_err(|source| LogError::Write {
            path: self.live.clone(),
            source,
        })
    }

    /// Open the live file for appending, creating or rotating it first.
    ///
    /// Callers must hold the path lock.
    fn open_log_file(&self, now: DateTime<Local>) -> Result<File, LogError> {
        if !self.live.exists() {
            return self.create();
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.live)
            .map_err(|source| LogError::Open {
                path: self.live.clone(),
                source,
            })?;

        let modified: DateTime<Local> = file
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|source| LogError::Stat {
                path: self.live.clone(),
                source,
            })?
            .into();

        if !is_before_today(modified, now) {
            return Ok(file);
        }

        drop(file);
        // Suffix comes from the file's own date, not today's.
        let archive = self.paths.archive(modified.date_naive());
        fs::rename(&self.live, &archive).map_err(|source| LogError::Rename {
            from: self.live.clone(),
            to: archive.clone(),
            source,
        })?;
        tracing::debug!("Rotated {} to {}", self.live.display(), archive.display());
        self.create()
    }

    fn create(&self) -> Result<File, LogError> {
        File::create(&self.live).map_err(|source| LogError::Create {
            path: self.live.clone(),
            source,
        })
    }
}

/// Whether `modified` lies strictly before local midnight of `now`'s day
fn is_before_today(modified: DateTime<Local>, now: DateTime<Local>) -> bool {
    match now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
    {
        Some(midnight) => modified < midnight,
        // Midnight skipped by a DST change; fall back to comparing dates.
        None => modified.date_naive() < now.date_naive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::thread;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn sink_in(dir: &TempDir, base: &str) -> FileSink {
        FileSink::new(LogPaths::normalize(&dir.path().to_string_lossy(), base))
    }

    fn write_aged(path: &Path, content: &str, age: Duration) -> DateTime<Local> {
        fs::write(path, content).unwrap();
        let modified = Local::now() - age;
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::from(modified)).unwrap();
        modified
    }

    #[test]
    fn test_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");

        sink.append("first\n").unwrap();

        assert_eq!(sink.path(), temp_dir.path().join("app.log"));
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "first\n");
    }

    #[test]
    fn test_appends_to_todays_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        fs::write(sink.path(), "earlier\n").unwrap();

        sink.append("later\n").unwrap();

        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "earlier\nlater\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_rotates_yesterdays_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        let modified = write_aged(sink.path(), "old\n", Duration::days(1));

        sink.append("new\n").unwrap();

        let archive = temp_dir
            .path()
            .join(format!("app_{}.log", modified.format("%Y%m%d")));
        assert_eq!(fs::read_to_string(&archive).unwrap(), "old\n");
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "new\n");
    }

    #[test]
    fn test_rotation_uses_file_date_not_yesterday() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        let modified = write_aged(sink.path(), "stale\n", Duration::days(3));

        sink.append("fresh\n").unwrap();

        let mut names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "app.log".to_string(),
                format!("app_{}.log", modified.format("%Y%m%d")),
            ]
        );
    }

    #[test]
    fn test_rotation_against_explicit_now() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        fs::write(sink.path(), "today\n").unwrap();
        let modified: DateTime<Local> = fs::metadata(sink.path())
            .unwrap()
            .modified()
            .unwrap()
            .into();

        // Pretend the clock moved on to tomorrow.
        sink.append_at("tomorrow\n", Local::now() + Duration::days(1)).unwrap();

        let archive = sink.paths.archive(modified.date_naive());
        assert_eq!(fs::read_to_string(archive).unwrap(), "today\n");
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "tomorrow\n");
    }

    #[test]
    fn test_missing_directory_is_create_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let sink = FileSink::new(LogPaths::normalize(&missing.to_string_lossy(), "app"));

        let err = sink.append("line\n").unwrap_err();
        assert!(matches!(err, LogError::Create { .. }));
    }

    #[test]
    fn test_concurrent_appends_rotate_once() {
        const WRITERS: usize = 32;
        let temp_dir = TempDir::new().unwrap();
        let sink = Arc::new(sink_in(&temp_dir, "app"));
        let modified = write_aged(sink.path(), "old\n", Duration::days(2));

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || sink.append(&format!("line {}\n", i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let archive_name = format!("app_{}.log", modified.format("%Y%m%d"));
        let mut names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["app.log".to_string(), archive_name.clone()]);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(archive_name)).unwrap(),
            "old\n"
        );

        let live = fs::read_to_string(sink.path()).unwrap();
        let mut lines: Vec<&str> = live.lines().collect();
        assert_eq!(lines.len(), WRITERS);
        lines.sort();
        lines.dedup();
        assert_eq!(lines.len(), WRITERS);
        assert!(lines.iter().all(|l| l.starts_with("line ")));
    }

    #[test]
    fn test_blocked_archive_path_is_rename_error() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        let modified = write_aged(sink.path(), "old\n", Duration::days(1));
        let archive = sink.paths.archive(modified.date_naive());
        fs::create_dir(&archive).unwrap();
        fs::write(archive.join("occupied"), "x").unwrap();

        let err = sink.append("new\n").unwrap_err();

        match err {
            LogError::Rename { from, to, .. } => {
                assert_eq!(from, sink.path());
                assert_eq!(to, archive);
            }
            other => panic!("expected rename error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "old\n");
    }

    #[test]
    fn test_unopenable_live_file_is_open_error() {
        let temp_dir = TempDir::new().unwrap();
        let sink = sink_in(&temp_dir, "app");
        fs::create_dir(sink.path()).unwrap();

        let err = sink.append("line\n").unwrap_err();
        assert!(matches!(err, LogError::Open { .. }), "got {err:?}");
    }

    #[test]
    fn test_equivalent_directories_share_lock() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let dotted = nested.join("..");

        let a = sink_in(&temp_dir, "app");
        let b = FileSink::new(LogPaths::normalize(&dotted.to_string_lossy(), "app"));

        assert_ne!(a.path(), b.path());
        assert!(Arc::ptr_eq(&a.lock, &b.lock));
    }

    #[test]
    fn test_lock_key_without_directory() {
        let key = lock_key(Path::new("app.log"));
        assert!(key.is_absolute());
        assert!(key.ends_with("app.log"));

        let missing = Path::new("/nonexistent/for/daylog/app.log");
        assert_eq!(lock_key(missing), missing);
    }

    #[test]
    fn test_sinks_on_same_path_share_lock() {
        let temp_dir = TempDir::new().unwrap();
        let a = sink_in(&temp_dir, "app");
        let b = sink_in(&temp_dir, "/app");
        assert!(Arc::ptr_eq(&a.lock, &b.lock));

        let c = sink_in(&temp_dir, "other");
        assert!(!Arc::ptr_eq(&a.lock, &c.lock));
    }

    #[test]
    fn test_is_before_today() {
        let now = Local::now();
        assert!(is_before_today(now - Duration::days(1), now));
        assert!(!is_before_today(now, now));
        assert!(!is_before_today(now + Duration::hours(1), now));
    }
}
