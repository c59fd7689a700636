//! `gd-gpu-hal` — GPU runtime backends for the diagnostics layer.
//!
//! - [`sim`]: software runtime with scripted statuses, always available.
//! - `cuda`: CUDA runtime and driver via cudarc (feature `cuda`).

#[cfg(feature = "cuda")]
pub mod cuda;

pub mod sim;

pub use sim::SimulatedRuntime;
