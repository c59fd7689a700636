//! Software runtime with scripted statuses, device index and sticky error state.
//!
//! Lets the reporter and recorder run on machines without a GPU. Mirrors the
//! runtime behaviours the diagnostics layer depends on: a current device that
//! may fail to resolve, a "last error" slot that a failed call leaves behind
//! until drained, and a status decoder.

use std::cell::Cell;

use tracing::debug;

use gd_common::{DeviceIndex, DeviceProbe, DiagError, DiagResult, GpuRuntime, StatusCode};

/// Status codes the simulator knows how to decode.
pub mod codes {
    use gd_common::StatusCode;

    pub const SUCCESS: StatusCode = StatusCode(0);
    pub const INVALID_VALUE: StatusCode = StatusCode(1);
    pub const MEMORY_ALLOCATION: StatusCode = StatusCode(2);
    pub const INITIALIZATION_ERROR: StatusCode = StatusCode(3);
    pub const NO_DEVICE: StatusCode = StatusCode(100);
    pub const INVALID_DEVICE: StatusCode = StatusCode(101);
    pub const ILLEGAL_ADDRESS: StatusCode = StatusCode(700);
    pub const ASSERT: StatusCode = StatusCode(710);
    pub const UNKNOWN: StatusCode = StatusCode(999);
}

fn describe(status: StatusCode) -> Option<&'static str> {
    Some(match status {
        codes::SUCCESS => "no error",
        codes::INVALID_VALUE => "invalid argument",
        codes::MEMORY_ALLOCATION => "out of memory",
        codes::INITIALIZATION_ERROR => "initialization error",
        codes::NO_DEVICE => "no CUDA-capable device is detected",
        codes::INVALID_DEVICE => "invalid device ordinal",
        codes::ILLEGAL_ADDRESS => "an illegal memory access was encountered",
        codes::ASSERT => "device-side assert triggered",
        codes::UNKNOWN => "unknown error",
        _ => return None,
    })
}

/// Single-threaded software stand-in for a GPU runtime.
#[derive(Debug)]
pub struct SimulatedRuntime {
    device: Result<DeviceIndex, String>,
    last_error: Cell<StatusCode>,
    probes: Cell<u32>,
    drains: Cell<u32>,
    decodes: Cell<u32>,
}

impl SimulatedRuntime {
    /// Runtime bound to the primary device.
    pub fn new() -> Self {
        Self::on_device(DeviceIndex::PRIMARY)
    }

    pub fn on_device(device: DeviceIndex) -> Self {
        Self {
            device: Ok(device),
            last_error: Cell::new(codes::SUCCESS),
            probes: Cell::new(0),
            drains: Cell::new(0),
            decodes: Cell::new(0),
        }
    }

    /// Runtime whose device query fails with `reason`.
    pub fn without_device(reason: impl Into<String>) -> Self {
        Self {
            device: Err(reason.into()),
            ..Self::new()
        }
    }

    /// Simulate a runtime call returning `status`. Failures stick in the
    /// last-error slot until drained.
    pub fn call(&self, status: StatusCode) -> StatusCode {
        if !status.is_success() {
            debug!(code = status.0, "Simulated runtime call failed");
            self.last_error.set(status);
        }
        status
    }

    /// Peek at the last-error slot without draining it.
    pub fn last_error(&self) -> StatusCode {
        self.last_error.get()
    }

    /// Number of device queries served.
    pub fn probe_count(&self) -> u32 {
        self.probes.get()
    }

    /// Number of last-error drains.
    pub fn drain_count(&self) -> u32 {
        self.drains.get()
    }

    /// Number of status decodes.
    pub fn decode_count(&self) -> u32 {
        self.decodes.get()
    }
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuRuntime for SimulatedRuntime {
    type Status = StatusCode;

    fn take_last_error(&self) -> StatusCode {
        self.drains.set(self.drains.get() + 1);
        self.last_error.replace(codes::SUCCESS)
    }

    fn error_string(&self, status: StatusCode) -> String {
        self.decodes.set(self.decodes.get() + 1);
        describe(status)
            .map(str::to_string)
            .unwrap_or_else(|| format!("unrecognized error code {}", status.0))
    }
}

impl DeviceProbe for SimulatedRuntime {
    fn current_device(&self) -> DiagResult<DeviceIndex> {
        self.probes.set(self.probes.get() + 1);
        self.device.clone().map_err(DiagError::DeviceProbe)
    }
}
