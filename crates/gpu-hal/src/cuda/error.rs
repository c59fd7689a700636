//! CUDA-specific error types wrapping cudarc driver errors.

use thiserror::Error;

use gd_common::DiagError;

/// CUDA backend setup error type.
///
/// Only non-fatal conditions live here (no device, bad ordinal). Failures of
/// checked runtime calls go through the reporter instead.
#[derive(Error, Debug)]
pub enum CudaError {
    /// CUDA driver error from cudarc.
    #[error("CUDA driver error: {0}")]
    Driver(#[from] cudarc::driver::DriverError),

    /// Device initialization failed.
    #[error("CUDA device init failed (ordinal {ordinal}): {reason}")]
    DeviceInit { ordinal: usize, reason: String },

    /// No CUDA devices found.
    #[error("No CUDA devices found")]
    NoDevices,

    /// Invalid device ordinal.
    #[error("Invalid CUDA device ordinal {ordinal} (found {count} devices)")]
    InvalidOrdinal { ordinal: usize, count: i32 },
}

impl From<CudaError> for DiagError {
    fn from(err: CudaError) -> Self {
        match err {
            CudaError::NoDevices => DiagError::RuntimeUnavailable("no CUDA devices".to_string()),
            CudaError::InvalidOrdinal { ordinal, count } => DiagError::RuntimeUnavailable(
                format!("Invalid ordinal {ordinal}, only {count} devices available"),
            ),
            CudaError::DeviceInit { reason, .. } => DiagError::RuntimeUnavailable(reason),
            CudaError::Driver(e) => DiagError::Other(format!("CUDA driver error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_diag_error() {
        let err: DiagError = CudaError::InvalidOrdinal {
            ordinal: 3,
            count: 2,
        }
        .into();
        assert_eq!(
            err,
            DiagError::RuntimeUnavailable("Invalid ordinal 3, only 2 devices available".into())
        );
    }
}
