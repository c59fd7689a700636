//! CUDA stream and event wrappers whose blocking waits can be timed by a
//! `SyncRecorder`.

use std::sync::Arc;

use cudarc::driver::safe::{CudaContext, CudaEvent, CudaStream as CudarcStream};
use tracing::debug;

use gd_common::{DeviceProbe, SyncKind};
use gd_diag::{Clock, SyncRecorder};

use super::error::CudaError;

/// RAII wrapper around a cudarc `CudaStream`.
///
/// Dropped streams are automatically destroyed by cudarc's `Drop` impl.
#[derive(Debug)]
pub struct ManagedStream {
    /// The underlying cudarc stream.
    inner: Arc<CudarcStream>,
    /// Whether this is the default (null) stream.
    is_default: bool,
}

impl ManagedStream {
    /// Create a new non-blocking CUDA stream.
    pub fn new(ctx: &Arc<CudaContext>) -> Result<Self, CudaError> {
        let inner = ctx.new_stream().map_err(|e| CudaError::DeviceInit {
            ordinal: ctx.ordinal(),
            reason: format!("Failed to create CUDA stream: {e}"),
        })?;
        debug!("Created new CUDA stream");
        Ok(Self {
            inner,
            is_default: false,
        })
    }

    /// Get the default (null) stream for the given context.
    pub fn default_stream(ctx: &Arc<CudaContext>) -> Self {
        Self {
            inner: ctx.default_stream(),
            is_default: true,
        }
    }

    /// Block the calling thread until all work on this stream has completed.
    pub fn synchronize(&self) -> Result<(), CudaError> {
        self.inner.synchronize()?;
        debug!("CUDA stream synchronized");
        Ok(())
    }

    /// `synchronize`, timed as a stream sync by `recorder`.
    pub fn synchronize_recorded<P: DeviceProbe, C: Clock>(
        &self,
        recorder: &mut SyncRecorder<P, C>,
    ) -> Result<(), CudaError> {
        recorder.record(SyncKind::Stream, || self.synchronize())
    }

    /// Record an event capturing all work currently queued on this stream.
    pub fn record_event(&self) -> Result<ManagedEvent, CudaError> {
        let inner = self.inner.record_event(None)?;
        Ok(ManagedEvent { inner })
    }

    /// Get a reference to the underlying cudarc stream.
    pub fn inner(&self) -> &Arc<CudarcStream> {
        &self.inner
    }

    /// Whether this is the default (null) stream.
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// RAII wrapper around a cudarc `CudaEvent`.
#[derive(Debug)]
pub struct ManagedEvent {
    inner: CudaEvent,
}

impl ManagedEvent {
    /// Block until the work captured by this event has completed.
    pub fn synchronize(&self) -> Result<(), CudaError> {
        self.inner.synchronize()?;
        debug!("CUDA event synchronized");
        Ok(())
    }

    /// `synchronize`, timed as an event sync by `recorder`.
    pub fn synchronize_recorded<P: DeviceProbe, C: Clock>(
        &self,
        recorder: &mut SyncRecorder<P, C>,
    ) -> Result<(), CudaError> {
        recorder.record(SyncKind::Event, || self.synchronize())
    }

    pub fn inner(&self) -> &CudaEvent {
        &self.inner
    }
}
