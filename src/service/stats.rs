//! Counters describing one scan.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Scan counters, shared across the per-file tasks.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Files whose extension mapped to a searchable language
    pub files_considered: AtomicU64,
    /// Files actually read and scanned
    pub files_scanned: AtomicU64,
    /// Files excluded as tests
    pub files_skipped_tests: AtomicU64,
    /// Files over the size limit
    pub files_skipped_large: AtomicU64,
    /// Files or directories that could not be read
    pub read_errors: AtomicU64,
    /// Lines examined
    pub lines_scanned: AtomicU64,
    /// Definition sites found, before truncation
    pub matches: AtomicU64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_considered(&self) {
        self.files_considered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped_tests(&self) {
        self.files_skipped_tests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped_large(&self) {
        self.files_skipped_large.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_read_errors(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_lines(&self, count: u64) {
        self.lines_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_matches(&self, count: u64) {
        self.matches.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot.
    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            files_considered: self.files_considered.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_skipped_tests: self.files_skipped_tests.load(Ordering::Relaxed),
            files_skipped_large: self.files_skipped_large.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            lines_scanned: self.lines_scanned.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`ScanStats`] at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSnapshot {
    pub files_considered: u64,
    pub files_scanned: u64,
    pub files_skipped_tests: u64,
    pub files_skipped_large: u64,
    pub read_errors: u64,
    pub lines_scanned: u64,
    pub matches: u64,
}
