//! Error reporter — turns runtime statuses and device-side assertion signals
//! into one fatal `DiagnosticReport`.
//!
//! The healthy path (`status` is success, no kernel assertion fired) does a
//! status comparison and at most one registry flag load. Everything that
//! allocates lives behind the `#[cold]` report builder.

use std::fmt;

use thiserror::Error;
use tracing::error;

use gd_common::{
    AssertionRegistry, GpuRuntime, NoAssertions, ReporterConfig, RuntimeStatus, SourceLocation,
};

use crate::fail_fast::{FailFast, PanicFailFast};
use crate::suffix::CheckSuffix;

/// Appended instead of the registry dump when assertions were not consulted.
pub const ASSERTIONS_OMITTED_NOTE: &str = "Device-side assertions were explicitly omitted for this \
error check; the error probably arose while initializing the DSA handlers.";

/// Which failure channel(s) produced a report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Non-success status from the runtime call.
    Runtime,
    /// A kernel assertion fired; the call itself succeeded.
    DeviceAssertion,
    /// Both at once.
    Combined,
}

impl FailureKind {
    fn classify(runtime_failed: bool, kernel_failed: bool) -> Self {
        match (runtime_failed, kernel_failed) {
            (true, true) => Self::Combined,
            (false, true) => Self::DeviceAssertion,
            _ => Self::Runtime,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Runtime => "runtime failure",
            Self::DeviceAssertion => "device assertion failure",
            Self::Combined => "runtime and device assertion failure",
        })
    }
}

/// A fully composed, immutable fatal failure report.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct DiagnosticReport {
    kind: FailureKind,
    code: i32,
    status_text: String,
    location: SourceLocation,
    message: String,
}

impl DiagnosticReport {
    pub fn new(
        kind: FailureKind,
        code: i32,
        status_text: String,
        location: SourceLocation,
        message: String,
    ) -> Self {
        Self {
            kind,
            code,
            status_text,
            location,
            message,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Raw code of the checked status.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Decoded runtime text for the checked status (empty when stripped).
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Checks runtime statuses after every GPU call.
///
/// Generic over the runtime, the assertion registry and the fail-fast
/// facility so each collaborator can be swapped independently.
#[derive(Debug)]
pub struct Reporter<R, A = NoAssertions, F = PanicFailFast> {
    runtime: R,
    registry: A,
    fail_fast: F,
    suffix: CheckSuffix,
    config: ReporterConfig,
}

impl<R: GpuRuntime> Reporter<R> {
    /// Reporter without device-side assertion capture.
    pub fn new(runtime: R) -> Self {
        Reporter::with_registry(runtime, NoAssertions)
    }
}

impl<R: GpuRuntime, A: AssertionRegistry> Reporter<R, A> {
    /// Reporter that consults `registry` for device-side assertions.
    pub fn with_registry(runtime: R, registry: A) -> Self {
        Self {
            runtime,
            registry,
            fail_fast: PanicFailFast,
            suffix: CheckSuffix::from_env(),
            config: ReporterConfig::default(),
        }
    }
}

impl<R: GpuRuntime, A: AssertionRegistry, F: FailFast> Reporter<R, A, F> {
    /// Replace the fail-fast facility.
    pub fn with_fail_fast<G: FailFast>(self, fail_fast: G) -> Reporter<R, A, G> {
        Reporter {
            runtime: self.runtime,
            registry: self.registry,
            fail_fast,
            suffix: self.suffix,
            config: self.config,
        }
    }

    pub fn with_suffix(mut self, suffix: CheckSuffix) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn with_config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn registry(&self) -> &A {
        &self.registry
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Check a status, returning the composed report on failure.
    ///
    /// `include_device_assertions` is `false` only while the assertion
    /// subsystem itself is being set up.
    #[inline]
    pub fn check(
        &self,
        status: R::Status,
        location: SourceLocation,
        include_device_assertions: bool,
    ) -> Result<(), DiagnosticReport> {
        let kernel_failed = include_device_assertions && self.registry.has_failed();
        if status.is_success() && !kernel_failed {
            return Ok(());
        }
        Err(self.build_report(status, location, include_device_assertions, kernel_failed))
    }

    /// Check a status and hand any failure to the fail-fast facility.
    #[inline]
    pub fn enforce(
        &self,
        status: R::Status,
        location: SourceLocation,
        include_device_assertions: bool,
    ) {
        if let Err(report) = self.check(status, location, include_device_assertions) {
            self.escalate(report)
        }
    }

    /// `enforce` with the caller's location and assertions consulted.
    #[track_caller]
    #[inline]
    pub fn enforce_here(&self, status: R::Status) {
        let location = SourceLocation::caller();
        self.enforce(status, location, true)
    }

    /// Log and terminate via the fail-fast facility.
    #[cold]
    pub fn escalate(&self, report: DiagnosticReport) -> ! {
        error!(
            code = report.code(),
            kind = %report.kind(),
            location = %report.location(),
            "GPU runtime check failed"
        );
        self.fail_fast.fail(report)
    }

    #[cold]
    #[inline(never)]
    fn build_report(
        &self,
        status: R::Status,
        location: SourceLocation,
        include_device_assertions: bool,
        kernel_failed: bool,
    ) -> DiagnosticReport {
        // Drain the sticky error so the next unrelated check starts clean.
        let _ = self.runtime.take_last_error();

        let kind = FailureKind::classify(!status.is_success(), kernel_failed);
        let code = status.code();

        if self.config.strip_messages {
            return DiagnosticReport::new(kind, code, String::new(), location, String::new());
        }

        let status_text = self.runtime.error_string(status);
        let mut message = String::with_capacity(256);
        message.push_str(&self.config.runtime_name);
        message.push_str(" error: ");
        message.push_str(&status_text);
        message.push_str(self.suffix.as_str());
        message.push('\n');
        if include_device_assertions {
            message.push_str(&self.registry.report());
        } else {
            message.push_str(ASSERTIONS_OMITTED_NOTE);
        }

        DiagnosticReport::new(kind, code, status_text, location, message)
    }
}
