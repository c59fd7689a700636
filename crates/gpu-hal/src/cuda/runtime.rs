//! CUDA runtime binding for the reporter and the recorder's device probe.

use std::ffi::{c_int, CStr};

use cudarc::driver::sys::CUresult;
use cudarc::driver::DriverError;
use cudarc::runtime::sys::{self as rt, cudaError_t};

use gd_common::{DeviceIndex, DeviceProbe, DiagError, DiagResult, GpuRuntime, RuntimeStatus};

/// Status of a CUDA call, from either the runtime or the driver API.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CudaStatus {
    Runtime(cudaError_t),
    Driver(CUresult),
}

impl CudaStatus {
    pub const SUCCESS: Self = Self::Runtime(cudaError_t::cudaSuccess);
}

impl RuntimeStatus for CudaStatus {
    #[inline]
    fn is_success(&self) -> bool {
        match self {
            Self::Runtime(e) => *e == cudaError_t::cudaSuccess,
            Self::Driver(r) => *r == CUresult::CUDA_SUCCESS,
        }
    }

    fn code(&self) -> i32 {
        match self {
            Self::Runtime(e) => *e as i32,
            Self::Driver(r) => *r as i32,
        }
    }
}

impl From<cudaError_t> for CudaStatus {
    fn from(err: cudaError_t) -> Self {
        Self::Runtime(err)
    }
}

impl From<DriverError> for CudaStatus {
    fn from(err: DriverError) -> Self {
        Self::Driver(err.0)
    }
}

/// The process's CUDA runtime. Stateless: every call goes to the runtime.
#[derive(Copy, Clone, Debug, Default)]
pub struct CudaRuntime;

impl CudaRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl GpuRuntime for CudaRuntime {
    type Status = CudaStatus;

    fn take_last_error(&self) -> CudaStatus {
        // SAFETY: cudaGetLastError takes no arguments and only resets
        // thread-local runtime state.
        CudaStatus::Runtime(unsafe { rt::cudaGetLastError() })
    }

    fn error_string(&self, status: CudaStatus) -> String {
        match status {
            CudaStatus::Runtime(err) => {
                // SAFETY: cudaGetErrorString returns a pointer to a static,
                // NUL-terminated string for every enum value.
                let ptr = unsafe { rt::cudaGetErrorString(err) };
                if ptr.is_null() {
                    return format!("unrecognized CUDA error {}", err as i32);
                }
                // SAFETY: non-null, static and NUL-terminated (see above).
                unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
            }
            CudaStatus::Driver(code) => match DriverError(code).error_string() {
                Ok(text) => text.to_string_lossy().into_owned(),
                Err(_) => format!("unrecognized CUDA driver error {}", code as i32),
            },
        }
    }
}

impl DeviceProbe for CudaRuntime {
    fn current_device(&self) -> DiagResult<DeviceIndex> {
        let mut device: c_int = -1;
        // SAFETY: cudaGetDevice writes one int through a valid pointer.
        let status = CudaStatus::Runtime(unsafe { rt::cudaGetDevice(&mut device) });
        if status.is_success() {
            Ok(DeviceIndex(device))
        } else {
            Err(DiagError::DeviceProbe(self.error_string(status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(CudaStatus::SUCCESS.is_success());
        assert!(CudaStatus::Driver(CUresult::CUDA_SUCCESS).is_success());
        let oom = CudaStatus::Runtime(cudaError_t::cudaErrorMemoryAllocation);
        assert!(!oom.is_success());
        assert_eq!(oom.code(), 2);
    }

    #[test]
    #[ignore = "requires an NVIDIA GPU and CUDA runtime"]
    fn test_decode_on_hardware() {
        let text = CudaRuntime.error_string(CudaStatus::Runtime(
            cudaError_t::cudaErrorMemoryAllocation,
        ));
        assert_eq!(text, "out of memory");
    }
}
