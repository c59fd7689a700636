//! Fail-fast facilities: where a fatal `DiagnosticReport` ends up.

use tracing::error;

use crate::reporter::DiagnosticReport;

/// Terminates execution with a diagnostic report. Never returns.
pub trait FailFast {
    fn fail(&self, report: DiagnosticReport) -> !;
}

impl<F: FailFast + ?Sized> FailFast for &F {
    fn fail(&self, report: DiagnosticReport) -> ! {
        (**self).fail(report)
    }
}

/// Unwinds with the report text as the panic payload.
#[derive(Copy, Clone, Debug, Default)]
pub struct PanicFailFast;

impl FailFast for PanicFailFast {
    fn fail(&self, report: DiagnosticReport) -> ! {
        panic!("{}\nChecked at {}", report, report.location());
    }
}

/// Writes the report to stderr and aborts the process.
#[derive(Copy, Clone, Debug, Default)]
pub struct AbortFailFast;

impl FailFast for AbortFailFast {
    fn fail(&self, report: DiagnosticReport) -> ! {
        error!(
            code = report.code(),
            kind = %report.kind(),
            location = %report.location(),
            "Aborting on fatal GPU failure"
        );
        eprintln!("{}\nChecked at {}", report, report.location());
        std::process::abort()
    }
}
