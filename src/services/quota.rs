//! Persisted daily signal counter.
//!
//! Holds a single `{date, count}` record on disk. Every read and increment
//! goes through one lock, and writes land via a temp file + rename so a
//! reader never sees a half-written record.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::QuotaStatus;

/// Smallest daily limit.
pub const MIN_DAILY_LIMIT: u32 = 10;
/// Largest daily limit.
pub const MAX_DAILY_LIMIT: u32 = 20;

/// Counter persistence errors.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Failed to write counter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode counter: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    pub date: NaiveDate,
    pub count: u32,
}

/// Daily signal limit for a calendar date.
///
/// Derived from a SHA-256 of the ISO date string, so every process agrees
/// on the same value for the same day without any shared storage. This is
/// intentionally predictable, not a secret.
pub fn daily_limit(date: NaiveDate) -> u32 {
    let digest = Sha256::digest(date.format("%Y-%m-%d").to_string().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let span = u64::from(MAX_DAILY_LIMIT - MIN_DAILY_LIMIT + 1);
    MIN_DAILY_LIMIT + (u64::from_be_bytes(bytes) % span) as u32
}

/// Tracks how many signals have been issued today.
///
/// The tracker never refuses an increment; quota enforcement is up to the
/// caller.
pub struct DailyQuotaTracker {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DailyQuotaTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current calendar day (UTC).
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Today's limit.
    pub fn daily_limit(&self) -> u32 {
        daily_limit(Self::today())
    }

    /// Signals issued today.
    pub fn read(&self) -> u32 {
        self.read_on(Self::today())
    }

    /// Signals issued on `date`; a record from another day counts as 0.
    pub fn read_on(&self, date: NaiveDate) -> u32 {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.load() {
            Some(counter) if counter.date == date => counter.count,
            _ => 0,
        }
    }

    /// Record one more signal today and return the new count.
    pub fn increment(&self) -> Result<u32, QuotaError> {
        self.increment_on(Self::today())
    }

    /// Record one more signal on `date` and return the new count.
    ///
    /// A record from another day is replaced by `{date, 1}`.
    pub fn increment_on(&self, date: NaiveDate) -> Result<u32, QuotaError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let counter = match self.load() {
            Some(counter) if counter.date == date => DailyCounter {
                date,
                count: counter.count + 1,
            },
            _ => DailyCounter { date, count: 1 },
        };

        self.store(&counter)?;
        debug!("Daily signal count for {} is now {}", date, counter.count);
        Ok(counter.count)
    }

    /// Record one more signal today unless `limit` has been reached.
    ///
    /// Returns `None` without writing when the count is already at or past
    /// `limit`.
    pub fn increment_within(&self, limit: u32) -> Result<Option<u32>, QuotaError> {
        self.increment_within_on(Self::today(), limit)
    }

    /// Compare-and-increment for `date`; the check and the write happen
    /// under one lock.
    pub fn increment_within_on(&self, date: NaiveDate, limit: u32) -> Result<Option<u32>, QuotaError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = match self.load() {
            Some(counter) if counter.date == date => counter.count,
            _ => 0,
        };
        if current >= limit {
            return Ok(None);
        }

        let counter = DailyCounter {
            date,
            count: current + 1,
        };
        self.store(&counter)?;
        debug!("Daily signal count for {} is now {}/{}", date, counter.count, limit);
        Ok(Some(counter.count))
    }

    /// Count, limit and remaining for today.
    pub fn status(&self) -> QuotaStatus {
        self.status_on(Self::today())
    }

    /// Count, limit and remaining for `date`.
    pub fn status_on(&self, date: NaiveDate) -> QuotaStatus {
        QuotaStatus::new(self.read_on(date), daily_limit(date))
    }

    fn load(&self) -> Option<DailyCounter> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read counter file {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(counter) => Some(counter),
            Err(e) => {
                warn!("Ignoring unreadable counter file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn store(&self, counter: &DailyCounter) -> Result<(), QuotaError> {
        let content = serde_json::to_string(counter)?;
        let tmp = self.path.with_extension("tmp");
        let io_err = |source| QuotaError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn create_test_tracker() -> (TempDir, DailyQuotaTracker) {
        let dir = tempfile::tempdir().unwrap();
        let tracker = DailyQuotaTracker::new(dir.path().join("daily_signals.json"));
        (dir, tracker)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_limit_range_and_stability() {
        let mut start = date(2024, 1, 1);
        for _ in 0..730 {
            let limit = daily_limit(start);
            assert!((MIN_DAILY_LIMIT..=MAX_DAILY_LIMIT).contains(&limit));
            assert_eq!(limit, daily_limit(start));
            start = start.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_daily_limit_varies_by_date() {
        let limits: std::collections::HashSet<u32> = (1..=28)
            .map(|d| daily_limit(date(2025, 2, d)))
            .collect();
        assert!(limits.len() > 1);
    }

    #[test]
    fn test_read_without_file_is_zero() {
        let (_dir, tracker) = create_test_tracker();
        assert_eq!(tracker.read(), 0);
        assert!(!tracker.path().exists());
    }

    #[test]
    fn test_increment_counts_up() {
        let (_dir, tracker) = create_test_tracker();
        let today = date(2026, 3, 14);

        assert_eq!(tracker.increment_on(today).unwrap(), 1);
        assert_eq!(tracker.increment_on(today).unwrap(), 2);
        assert_eq!(tracker.increment_on(today).unwrap(), 3);
        assert_eq!(tracker.read_on(today), 3);
    }

    #[test]
    fn test_persisted_across_instances() {
        let (dir, tracker) = create_test_tracker();
        let today = date(2026, 3, 14);
        tracker.increment_on(today).unwrap();
        tracker.increment_on(today).unwrap();
        drop(tracker);

        let reopened = DailyQuotaTracker::new(dir.path().join("daily_signals.json"));
        assert_eq!(reopened.read_on(today), 2);

        let raw = fs::read_to_string(reopened.path()).unwrap();
        let counter: DailyCounter = serde_json::from_str(&raw).unwrap();
        assert_eq!(counter, DailyCounter { date: today, count: 2 });
        assert!(raw.contains("\"2026-03-14\""));
    }

    #[test]
    fn test_read_on_new_day_is_zero_without_writing() {
        let (_dir, tracker) = create_test_tracker();
        let yesterday = date(2026, 3, 13);
        tracker.increment_on(yesterday).unwrap();

        assert_eq!(tracker.read_on(date(2026, 3, 14)), 0);
        // The stale record is still on disk until the next increment.
        assert_eq!(tracker.read_on(yesterday), 1);
    }

    #[test]
    fn test_rollover_resets_to_one() {
        let (_dir, tracker) = create_test_tracker();
        let yesterday = date(2026, 3, 13);
        for _ in 0..7 {
            tracker.increment_on(yesterday).unwrap();
        }

        assert_eq!(tracker.increment_on(date(2026, 3, 14)).unwrap(), 1);
        assert_eq!(tracker.read_on(yesterday), 0);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let (_dir, tracker) = create_test_tracker();
        fs::write(tracker.path(), "{not json").unwrap();

        let today = date(2026, 3, 14);
        assert_eq!(tracker.read_on(today), 0);
        assert_eq!(tracker.increment_on(today).unwrap(), 1);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = DailyQuotaTracker::new(dir.path().join("state").join("counter.json"));
        assert_eq!(tracker.increment().unwrap(), 1);
        assert_eq!(tracker.read(), 1);
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let (_dir, tracker) = create_test_tracker();
        let tracker = Arc::new(tracker);
        let today = date(2026, 3, 14);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        tracker.increment_on(today).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.read_on(today), 400);
    }

    #[test]
    fn test_increment_within_stops_at_limit() {
        let (_dir, tracker) = create_test_tracker();
        let today = date(2026, 3, 14);

        assert_eq!(tracker.increment_within_on(today, 2).unwrap(), Some(1));
        assert_eq!(tracker.increment_within_on(today, 2).unwrap(), Some(2));
        assert_eq!(tracker.increment_within_on(today, 2).unwrap(), None);
        assert_eq!(tracker.read_on(today), 2);
    }

    #[test]
    fn test_increment_within_after_rollover() {
        let (_dir, tracker) = create_test_tracker();
        for _ in 0..5 {
            tracker.increment_on(date(2026, 3, 13)).unwrap();
        }

        assert_eq!(tracker.increment_within_on(date(2026, 3, 14), 5).unwrap(), Some(1));
    }

    #[test]
    fn test_concurrent_increment_within_never_overshoots() {
        let (_dir, tracker) = create_test_tracker();
        let tracker = Arc::new(tracker);
        let today = date(2026, 3, 14);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    (0..10)
                        .filter(|_| tracker.increment_within_on(today, 37).unwrap().is_some())
                        .count()
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(accepted, 37);
        assert_eq!(tracker.read_on(today), 37);
    }

    #[test]
    fn test_status_on_uses_one_date() {
        let (_dir, tracker) = create_test_tracker();
        let day = date(2026, 3, 14);
        tracker.increment_on(day).unwrap();
        tracker.increment_on(day).unwrap();

        let status = tracker.status_on(day);
        assert_eq!(status.daily_count, 2);
        assert_eq!(status.daily_limit, daily_limit(day));

        let next = tracker.status_on(date(2026, 3, 15));
        assert_eq!(next.daily_count, 0);
        assert_eq!(next.daily_limit, daily_limit(date(2026, 3, 15)));
    }

    #[test]
    fn test_status_reports_remaining() {
        let (_dir, tracker) = create_test_tracker();
        tracker.increment().unwrap();

        let status = tracker.status();
        assert_eq!(status.daily_count, 1);
        assert_eq!(status.daily_limit, tracker.daily_limit());
        assert_eq!(status.remaining, status.daily_limit - 1);
    }
}
