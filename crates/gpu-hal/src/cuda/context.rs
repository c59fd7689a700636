//! CUDA context management — wraps cudarc `CudaContext` with device selection
//! and recorded whole-device synchronization.

use std::sync::Arc;

use cudarc::driver::safe::CudaContext;
use tracing::{debug, info};

use gd_common::{DeviceProbe, SyncKind};
use gd_diag::{Clock, SyncRecorder};

use super::error::CudaError;

/// Managed CUDA context with the device name cached at init time.
#[derive(Debug)]
pub struct CudaContextWrapper {
    /// The underlying cudarc context.
    ctx: Arc<CudaContext>,
    ordinal: usize,
    name: String,
}

impl CudaContextWrapper {
    /// Create a new CUDA context on the given device ordinal.
    pub fn new(ordinal: usize) -> Result<Self, CudaError> {
        let device_count = CudaContext::device_count().map_err(|e| CudaError::DeviceInit {
            ordinal,
            reason: format!("Failed to get device count: {e}"),
        })?;

        if device_count == 0 {
            return Err(CudaError::NoDevices);
        }

        if ordinal >= device_count as usize {
            return Err(CudaError::InvalidOrdinal {
                ordinal,
                count: device_count,
            });
        }

        let ctx = CudaContext::new(ordinal).map_err(|e| CudaError::DeviceInit {
            ordinal,
            reason: format!("{e}"),
        })?;

        let name = ctx.name().map_err(|e| CudaError::DeviceInit {
            ordinal,
            reason: format!("Failed to get device name: {e}"),
        })?;

        info!(device = %name, ordinal, "CUDA context initialized");

        Ok(Self { ctx, ordinal, name })
    }

    /// Get the underlying cudarc context.
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.ctx
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Get the device name.
    pub fn device_name(&self) -> &str {
        &self.name
    }

    /// Synchronize the entire context (waits for all pending work).
    pub fn synchronize(&self) -> Result<(), CudaError> {
        self.ctx.synchronize()?;
        debug!(device = %self.name, "CUDA context synchronized");
        Ok(())
    }

    /// `synchronize`, timed as a device sync by `recorder`.
    pub fn synchronize_recorded<P: DeviceProbe, C: Clock>(
        &self,
        recorder: &mut SyncRecorder<P, C>,
    ) -> Result<(), CudaError> {
        recorder.record(SyncKind::Device, || self.synchronize())
    }
}
