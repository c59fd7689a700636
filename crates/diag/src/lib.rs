//! `gd-diag` — GPU runtime error reporting and sync timing.
//!
//! Two independent components used by the thread that issues GPU work:
//!
//! - [`Reporter`] checks every runtime status. Success with no fired
//!   device-side assertion returns immediately; anything else becomes a
//!   [`DiagnosticReport`] handed to a [`FailFast`] facility.
//! - [`SyncRecorder`] measures cumulative wall-clock time spent inside
//!   synchronization calls between `init_record` and `finish_record`.
//!
//! Call sites usually go through [`gd_check!`], which fills in the source
//! location.

pub mod clock;
pub mod fail_fast;
pub mod recorder;
pub mod registry;
pub mod reporter;
pub mod suffix;

pub use gd_common::{
    AssertionRegistry, DeviceIndex, DeviceProbe, DiagConfig, DiagError, DiagResult, GpuRuntime,
    NoAssertions, ProbeFailurePolicy, RecorderConfig, RecorderMisuse, ReporterConfig,
    RuntimeStatus, SourceLocation, StatusCode, SyncCounts, SyncKind,
};

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use fail_fast::{AbortFailFast, FailFast, PanicFailFast};
pub use recorder::{PrimaryDeviceOnly, RecorderPhase, RecordingPolicy, SyncRecorder};
pub use registry::{AssertionRecord, DeviceAssertionLog};
pub use reporter::{DiagnosticReport, FailureKind, Reporter, ASSERTIONS_OMITTED_NOTE};
pub use suffix::CheckSuffix;

/// Check a runtime status through a [`Reporter`], recording the call site.
///
/// ```ignore
/// gd_check!(reporter, unsafe { cudaMemset(ptr, 0, len) }.into());
/// // While the assertion subsystem is still initializing:
/// gd_check!(reporter, status, include_device_assertions = false);
/// ```
#[macro_export]
macro_rules! gd_check {
    ($reporter:expr, $status:expr) => {
        $crate::gd_check!($reporter, $status, include_device_assertions = true)
    };
    ($reporter:expr, $status:expr, include_device_assertions = $include:expr) => {
        $reporter.enforce(
            $status,
            $crate::SourceLocation::new(file!(), Some(module_path!()), line!()),
            $include,
        )
    };
}
