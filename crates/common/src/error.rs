//! Central error types for the diagnostics layer (thiserror-based).

use thiserror::Error;

/// Recoverable errors raised by the diagnostics layer itself.
///
/// GPU failures are never represented here: they become a
/// `DiagnosticReport` and go straight to the fail-fast facility.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagError {
    #[error("Device probe failed: {0}")]
    DeviceProbe(String),

    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Recorder misuse: {0}")]
    Misuse(#[from] RecorderMisuse),

    #[error("{0}")]
    Other(String),
}

/// Call-discipline violations detected by the recorder's checked API.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderMisuse {
    #[error("recorder is not inside an init/finish session")]
    NotRecording,

    #[error("recorder is disabled for this process (non-recordable device)")]
    Disabled,

    #[error("end_record called without a matching start_record")]
    UnmatchedEnd,

    #[error("start_record called while a previous interval is still open")]
    NestedStart,
}

/// Convenience Result type for diagnostics operations.
pub type DiagResult<T> = Result<T, DiagError>;
