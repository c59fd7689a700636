//! Configuration structs for the error reporter and the sync timing recorder.

use serde::{Deserialize, Serialize};

/// What `init_record` does when the device probe itself fails.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailurePolicy {
    /// Treat an unresolvable device like a non-primary one: recording is
    /// disabled for the rest of the process.
    #[default]
    Disable,
    /// Return the probe error from `init_record` and probe again next time.
    Propagate,
}

/// Top-level diagnostics configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagConfig {
    pub reporter: ReporterConfig,
    pub recorder: RecorderConfig,
}

/// Error reporter configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Runtime name used as the message prefix ("CUDA error: ...").
    pub runtime_name: String,
    /// Drop all human-readable text from reports (minimal builds).
    pub strip_messages: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            runtime_name: "CUDA".to_string(),
            strip_messages: false,
        }
    }
}

/// Sync timing recorder configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub probe_failure: ProbeFailurePolicy,
    /// Log call-discipline violations at `warn` instead of ignoring them.
    pub report_misuse: bool,
}
