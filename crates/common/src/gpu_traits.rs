//! GPU runtime collaborator traits.
//!
//! The diagnostics layer never owns the GPU runtime or the device-side
//! assertion registry. It programs against these traits; concrete backends
//! (CUDA via cudarc, the software simulator) live in `gd-gpu-hal`.

use std::fmt;
use std::sync::Arc;

use crate::error::DiagResult;
use crate::types::DeviceIndex;

/// A status value returned by a GPU runtime call.
pub trait RuntimeStatus: Copy + fmt::Debug {
    /// Whether the call succeeded.
    fn is_success(&self) -> bool;

    /// Raw integer code, for logging and stripped reports.
    fn code(&self) -> i32;
}

/// The slice of a GPU runtime the error reporter consumes.
pub trait GpuRuntime {
    /// Native status type of this runtime.
    type Status: RuntimeStatus;

    /// Drain the runtime's sticky "last error" slot and return what was there.
    fn take_last_error(&self) -> Self::Status;

    /// Decode a status into the runtime's human-readable message.
    fn error_string(&self, status: Self::Status) -> String;
}

/// Resolves the device the issuing thread is currently bound to.
pub trait DeviceProbe {
    fn current_device(&self) -> DiagResult<DeviceIndex>;
}

impl<P: DeviceProbe + ?Sized> DeviceProbe for &P {
    fn current_device(&self) -> DiagResult<DeviceIndex> {
        (**self).current_device()
    }
}

impl<P: DeviceProbe + ?Sized> DeviceProbe for Arc<P> {
    fn current_device(&self) -> DiagResult<DeviceIndex> {
        (**self).current_device()
    }
}

/// Device-side assertion registry, as seen by the error reporter.
///
/// Implementations synchronize internally; both methods are treated as
/// snapshots at the moment of the call.
pub trait AssertionRegistry {
    /// Has any kernel recorded an assertion failure since the last clear.
    fn has_failed(&self) -> bool;

    /// Multi-line dump of every captured assertion failure.
    fn report(&self) -> String;
}

impl<R: AssertionRegistry + ?Sized> AssertionRegistry for &R {
    fn has_failed(&self) -> bool {
        (**self).has_failed()
    }

    fn report(&self) -> String {
        (**self).report()
    }
}

impl<R: AssertionRegistry + ?Sized> AssertionRegistry for Arc<R> {
    fn has_failed(&self) -> bool {
        (**self).has_failed()
    }

    fn report(&self) -> String {
        (**self).report()
    }
}

/// Registry stand-in for builds without device-side assertion capture.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoAssertions;

impl AssertionRegistry for NoAssertions {
    fn has_failed(&self) -> bool {
        false
    }

    fn report(&self) -> String {
        String::new()
    }
}

/// Probe that always resolves to the same device.
#[derive(Copy, Clone, Debug)]
pub struct FixedDevice(pub DeviceIndex);

impl DeviceProbe for FixedDevice {
    fn current_device(&self) -> DiagResult<DeviceIndex> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_assertions_never_fails() {
        let reg = NoAssertions;
        assert!(!reg.has_failed());
        assert!(reg.report().is_empty());
    }

    #[test]
    fn test_probe_through_references() {
        let probe = Arc::new(FixedDevice(DeviceIndex(2)));
        assert_eq!(probe.current_device(), Ok(DeviceIndex(2)));
        assert_eq!((&*probe).current_device(), Ok(DeviceIndex(2)));
    }
}
