//! In-memory device-side assertion log.
//!
//! Kernel launch wrappers push an [`AssertionRecord`] when a kernel reports a
//! failed assertion; the error reporter reads the aggregate flag on every
//! check and the formatted dump only when building a report.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::warn;

use gd_common::AssertionRegistry;

/// Records kept before further failures are only counted.
pub const DEFAULT_MAX_RECORDS: usize = 10;

/// One device-side assertion failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionRecord {
    /// Kernel that was running.
    pub kernel: String,
    /// Failed assertion expression.
    pub expression: String,
    pub file: String,
    pub function: String,
    pub line: u32,
    /// Block index (x, y, z) of the failing thread.
    pub block: [u32; 3],
    /// Thread index (x, y, z) within its block.
    pub thread: [u32; 3],
}

/// Thread-safe log of device-side assertion failures.
#[derive(Debug)]
pub struct DeviceAssertionLog {
    failed: AtomicBool,
    dropped: AtomicUsize,
    max_records: usize,
    records: Mutex<Vec<AssertionRecord>>,
}

impl DeviceAssertionLog {
    pub fn new() -> Self {
        Self::with_max_records(DEFAULT_MAX_RECORDS)
    }

    /// Keep at most `max_records` full records.
    pub fn with_max_records(max_records: usize) -> Self {
        Self {
            failed: AtomicBool::new(false),
            dropped: AtomicUsize::new(0),
            max_records,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Store a failure and raise the aggregate flag.
    pub fn record(&self, record: AssertionRecord) {
        warn!(
            kernel = %record.kernel,
            expression = %record.expression,
            "Device-side assertion failed"
        );
        {
            let mut records = self.records.lock();
            if records.len() < self.max_records {
                records.push(record);
            } else {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.failed.store(true, Ordering::Release);
    }

    /// Forget every recorded failure.
    pub fn clear(&self) {
        self.records.lock().clear();
        self.dropped.store(0, Ordering::Relaxed);
        self.failed.store(false, Ordering::Release);
    }

    /// Number of failures seen, including ones past the record limit.
    pub fn len(&self) -> usize {
        self.records.lock().len() + self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<AssertionRecord> {
        self.records.lock().clone()
    }
}

impl Default for DeviceAssertionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AssertionRegistry for DeviceAssertionLog {
    #[inline]
    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn report(&self) -> String {
        let records = self.records.lock();
        let dropped = self.dropped.load(Ordering::Relaxed);
        if records.is_empty() && dropped == 0 {
            return "No device-side assertion failures were recorded.".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Device-side assertions were triggered: {} failure(s) recorded.",
            records.len() + dropped
        );
        for (i, r) in records.iter().enumerate() {
            let _ = writeln!(out, "Assertion failure {i}:");
            let _ = writeln!(out, "  Kernel: `{}`", r.kernel);
            let _ = writeln!(
                out,
                "  Block: [{},{},{}], Thread: [{},{},{}]",
                r.block[0], r.block[1], r.block[2], r.thread[0], r.thread[1], r.thread[2]
            );
            let _ = writeln!(out, "  Assertion: `{}`", r.expression);
            let _ = writeln!(out, "  File: {}:{} (function `{}`)", r.file, r.line, r.function);
        }
        if dropped > 0 {
            let _ = writeln!(out, "... and {dropped} more failure(s) not retained.");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kernel: &str) -> AssertionRecord {
        AssertionRecord {
            kernel: kernel.to_string(),
            expression: "idx < n".to_string(),
            file: "gather.cu".to_string(),
            function: "gatherKernel".to_string(),
            line: 57,
            block: [1, 0, 0],
            thread: [31, 0, 0],
        }
    }

    #[test]
    fn test_empty_log() {
        let log = DeviceAssertionLog::new();
        assert!(!log.has_failed());
        assert!(log.is_empty());
        assert!(log.report().contains("No device-side assertion failures"));
    }

    #[test]
    fn test_record_sets_flag_and_formats() {
        let log = DeviceAssertionLog::new();
        log.record(record("gather"));
        assert!(log.has_failed());

        let dump = log.report();
        assert!(dump.contains("1 failure(s) recorded"));
        assert!(dump.contains("Kernel: `gather`"));
        assert!(dump.contains("Block: [1,0,0], Thread: [31,0,0]"));
        assert!(dump.contains("Assertion: `idx < n`"));
        assert!(dump.contains("gather.cu:57 (function `gatherKernel`)"));
    }

    #[test]
    fn test_record_limit() {
        let log = DeviceAssertionLog::with_max_records(2);
        for k in ["a", "b", "c", "d"] {
            log.record(record(k));
        }
        assert_eq!(log.records().len(), 2);
        assert_eq!(log.len(), 4);
        let dump = log.report();
        assert!(dump.contains("4 failure(s) recorded"));
        assert!(dump.contains("and 2 more failure(s)"));
    }

    #[test]
    fn test_clear() {
        let log = DeviceAssertionLog::new();
        log.record(record("gather"));
        log.clear();
        assert!(!log.has_failed());
        assert!(log.is_empty());
    }
}
