//! CUDA backend — checked runtime calls and recorded synchronization via cudarc.
//!
//! # Architecture
//!
//! - [`CudaBackend`] is the main entry point: one context on one device, its
//!   default stream, a [`Reporter`] over the CUDA runtime and a
//!   [`SyncRecorder`] probing the same runtime.
//! - [`runtime::CudaRuntime`] decodes statuses, drains the runtime's last
//!   error and resolves the current device.
//! - [`context::CudaContextWrapper`] manages device init.
//! - [`stream::ManagedStream`] / [`stream::ManagedEvent`] wrap streams and
//!   events with recorded synchronization.
//!
//! Synchronization is where asynchronous kernel failures surface, so every
//! sync on the backend is checked: a driver error or a fired device-side
//! assertion is fatal.

pub mod context;
pub mod error;
pub mod runtime;
pub mod stream;

use std::sync::Arc;

use tracing::info;

use gd_common::{DiagConfig, DiagResult, SourceLocation};
use gd_diag::{DeviceAssertionLog, Reporter, SyncRecorder};

use self::context::CudaContextWrapper;
use self::error::CudaError;
use self::runtime::{CudaRuntime, CudaStatus};
use self::stream::ManagedStream;

// Re-export key types at the cuda module level
pub use self::error::CudaError as Error;
pub use self::stream::{ManagedEvent, ManagedStream as Stream};

/// Reporter type used by the CUDA backend.
pub type CudaReporter = Reporter<CudaRuntime, Arc<DeviceAssertionLog>>;

/// The CUDA backend: a device context plus its diagnostics.
///
/// Owned by the thread that issues GPU work (the recorder is thread-confined).
#[derive(Debug)]
pub struct CudaBackend {
    context: CudaContextWrapper,
    default_stream: ManagedStream,
    reporter: CudaReporter,
    recorder: SyncRecorder<CudaRuntime>,
}

impl CudaBackend {
    /// Initialize the backend on the given device ordinal.
    pub fn new(
        ordinal: usize,
        assertions: Arc<DeviceAssertionLog>,
        config: DiagConfig,
    ) -> Result<Self, CudaError> {
        let context = CudaContextWrapper::new(ordinal)?;
        let default_stream = ManagedStream::default_stream(context.context());
        let reporter = Reporter::with_registry(CudaRuntime, assertions)
            .with_config(config.reporter);
        let recorder = SyncRecorder::new(CudaRuntime).with_config(config.recorder);

        info!(
            device = context.device_name(),
            ordinal,
            "CUDA diagnostics backend initialized"
        );

        Ok(Self {
            context,
            default_stream,
            reporter,
            recorder,
        })
    }

    pub fn context(&self) -> &CudaContextWrapper {
        &self.context
    }

    pub fn default_stream(&self) -> &ManagedStream {
        &self.default_stream
    }

    pub fn reporter(&self) -> &CudaReporter {
        &self.reporter
    }

    pub fn recorder(&self) -> &SyncRecorder<CudaRuntime> {
        &self.recorder
    }

    /// Create a new CUDA stream for concurrent operations.
    pub fn create_stream(&self) -> Result<ManagedStream, CudaError> {
        ManagedStream::new(self.context.context())
    }

    // -- Checked calls --

    /// Check the status of a raw CUDA call made by the caller.
    #[track_caller]
    pub fn check(&self, status: impl Into<CudaStatus>) {
        self.reporter.enforce_here(status.into());
    }

    // -- Recording session --

    pub fn init_record(&mut self) -> DiagResult<()> {
        self.recorder.init_record()
    }

    pub fn finish_record(&mut self) -> u64 {
        self.recorder.finish_record()
    }

    // -- Recorded, checked synchronization --

    /// Synchronize `stream` (or the default stream).
    #[track_caller]
    pub fn synchronize_stream(&mut self, stream: Option<&ManagedStream>) -> Result<(), CudaError> {
        let location = SourceLocation::caller();
        let stream = stream.unwrap_or(&self.default_stream);
        let result = stream.synchronize_recorded(&mut self.recorder);
        self.check_sync(result, location)
    }

    /// Synchronize the whole device.
    #[track_caller]
    pub fn synchronize_device(&mut self) -> Result<(), CudaError> {
        let location = SourceLocation::caller();
        let result = self.context.synchronize_recorded(&mut self.recorder);
        self.check_sync(result, location)
    }

    /// Wait for `event`.
    #[track_caller]
    pub fn synchronize_event(&mut self, event: &ManagedEvent) -> Result<(), CudaError> {
        let location = SourceLocation::caller();
        let result = event.synchronize_recorded(&mut self.recorder);
        self.check_sync(result, location)
    }

    fn check_sync(
        &self,
        result: Result<(), CudaError>,
        location: SourceLocation,
    ) -> Result<(), CudaError> {
        let status = match result {
            Ok(()) => CudaStatus::SUCCESS,
            Err(CudaError::Driver(e)) => CudaStatus::from(e),
            Err(other) => return Err(other),
        };
        self.reporter.enforce(status, location, true);
        Ok(())
    }
}
