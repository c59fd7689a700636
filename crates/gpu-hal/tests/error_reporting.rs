//! End-to-end tests for the error reporter on the simulated runtime.
//!
//! Covers the three failure channels (runtime status, device-side assertion,
//! both) plus the hot path, with a real `DeviceAssertionLog` as registry.

use std::sync::Arc;

use gd_diag::{
    AssertionRecord, AssertionRegistry, CheckSuffix, DeviceAssertionLog, FailFast, FailureKind,
    DiagnosticReport, Reporter, SourceLocation, StatusCode, ASSERTIONS_OMITTED_NOTE,
};
use gd_gpu_hal::sim::codes;
use gd_gpu_hal::SimulatedRuntime;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn here() -> SourceLocation {
    SourceLocation::new("tests/error_reporting.rs", Some("error_reporting"), 1)
}

fn assertion(kernel: &str) -> AssertionRecord {
    AssertionRecord {
        kernel: kernel.to_string(),
        expression: "index >= 0 && index < size".to_string(),
        file: "indexing.cu".to_string(),
        function: "indexSelectKernel".to_string(),
        line: 1141,
        block: [0, 0, 0],
        thread: [5, 0, 0],
    }
}

fn reporter_with_log() -> (
    Reporter<SimulatedRuntime, Arc<DeviceAssertionLog>>,
    Arc<DeviceAssertionLog>,
) {
    let log = Arc::new(DeviceAssertionLog::new());
    let reporter = Reporter::with_registry(SimulatedRuntime::new(), log.clone())
        .with_suffix(CheckSuffix::build(false, false));
    (reporter, log)
}

// ---------------------------------------------------------------------------
// Hot path
// ---------------------------------------------------------------------------

#[test]
fn success_without_assertions_touches_nothing() {
    let (reporter, _log) = reporter_with_log();
    for _ in 0..1_000 {
        reporter
            .check(codes::SUCCESS, here(), true)
            .expect("healthy");
        reporter
            .check(codes::SUCCESS, here(), false)
            .expect("healthy");
    }
    assert_eq!(reporter.runtime().drain_count(), 0);
    assert_eq!(reporter.runtime().decode_count(), 0);
}

// ---------------------------------------------------------------------------
// Failure channels
// ---------------------------------------------------------------------------

#[test]
fn every_failure_status_raises_with_decoded_text() {
    let (reporter, _log) = reporter_with_log();
    let cases = [
        (codes::INVALID_VALUE, "invalid argument"),
        (codes::MEMORY_ALLOCATION, "out of memory"),
        (codes::ILLEGAL_ADDRESS, "an illegal memory access was encountered"),
        (StatusCode(31337), "unrecognized error code 31337"),
    ];
    for (status, text) in cases {
        for include in [true, false] {
            let report = reporter
                .check(status, here(), include)
                .expect_err("failure status must raise");
            assert_eq!(report.kind(), FailureKind::Runtime);
            assert!(report.message().contains(text), "{}", report.message());
            assert!(report.message().contains("CUDA_LAUNCH_BLOCKING=1"));
        }
    }
}

#[test]
fn fired_assertion_alone_is_fatal() {
    let (reporter, log) = reporter_with_log();
    log.record(assertion("index_select"));

    let report = reporter
        .check(codes::SUCCESS, here(), true)
        .expect_err("assertion must raise");
    assert_eq!(report.kind(), FailureKind::DeviceAssertion);
    assert!(report.message().contains("Kernel: `index_select`"));
    assert!(report.message().contains("index >= 0 && index < size"));
}

#[test]
fn combined_failure_reports_both() {
    let (reporter, log) = reporter_with_log();
    log.record(assertion("index_select"));

    let status = reporter.runtime().call(codes::ASSERT);
    let report = reporter.check(status, here(), true).expect_err("fatal");
    assert_eq!(report.kind(), FailureKind::Combined);
    assert!(report.message().contains("device-side assert triggered"));
    assert!(report.message().contains("Kernel: `index_select`"));
}

#[test]
fn omitted_assertions_never_include_the_dump() {
    let (reporter, log) = reporter_with_log();
    log.record(assertion("index_select"));

    let report = reporter
        .check(codes::INITIALIZATION_ERROR, here(), false)
        .expect_err("fatal");
    assert!(report.message().contains(ASSERTIONS_OMITTED_NOTE));
    assert!(!report.message().contains("index_select"));
    // The registry still holds the failure for the next full check.
    assert!(log.has_failed());
}

// ---------------------------------------------------------------------------
// Side effects
// ---------------------------------------------------------------------------

#[test]
fn failure_drains_sticky_error() {
    let (reporter, _log) = reporter_with_log();
    let status = reporter.runtime().call(codes::MEMORY_ALLOCATION);
    assert_eq!(reporter.runtime().last_error(), codes::MEMORY_ALLOCATION);

    reporter.check(status, here(), true).expect_err("fatal");
    assert_eq!(reporter.runtime().last_error(), codes::SUCCESS);
    assert_eq!(reporter.runtime().drain_count(), 1);
}

// ---------------------------------------------------------------------------
// Fail-fast hand-off
// ---------------------------------------------------------------------------

/// Fail-fast facility that unwinds with the typed report as payload.
struct TypedPanic;

impl FailFast for TypedPanic {
    fn fail(&self, report: DiagnosticReport) -> ! {
        std::panic::panic_any(report)
    }
}

#[test]
fn enforce_hands_report_to_fail_fast() {
    let (reporter, _log) = reporter_with_log();
    let reporter = reporter.with_fail_fast(TypedPanic);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        reporter.enforce(codes::ILLEGAL_ADDRESS, here(), true)
    }));
    let payload = result.expect_err("enforce must not return on failure");
    let report = payload
        .downcast::<DiagnosticReport>()
        .expect("typed report payload");
    assert_eq!(report.code(), 700);
    assert_eq!(report.location(), &here());
}

#[test]
#[should_panic(expected = "CUDA error: out of memory")]
fn default_fail_fast_panics_with_message() {
    let (reporter, _log) = reporter_with_log();
    reporter.enforce(codes::MEMORY_ALLOCATION, here(), true);
}
