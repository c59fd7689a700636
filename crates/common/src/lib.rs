//! `gd-common` — Shared types, traits, and errors for the GPU diagnostics layer.
//!
//! This crate is the foundation the reporter, the recorder and the runtime
//! backends depend on:
//!
//! - **Types**: `StatusCode`, `DeviceIndex`, `SourceLocation`, `SyncKind`, `SyncCounts`
//! - **GPU Traits**: `GpuRuntime`, `RuntimeStatus`, `DeviceProbe`, `AssertionRegistry`
//! - **Errors**: `DiagError`, `RecorderMisuse` (thiserror-based)
//! - **Config**: `DiagConfig`, `ReporterConfig`, `RecorderConfig`

pub mod config;
pub mod error;
pub mod gpu_traits;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{DiagConfig, ProbeFailurePolicy, RecorderConfig, ReporterConfig};
pub use error::{DiagError, DiagResult, RecorderMisuse};
pub use gpu_traits::{
    AssertionRegistry, DeviceProbe, FixedDevice, GpuRuntime, NoAssertions, RuntimeStatus,
};
pub use types::{DeviceIndex, SourceLocation, StatusCode, SyncCounts, SyncKind};
