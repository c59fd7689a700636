//! Sync timing recorder, an opt-in stopwatch for stream, device and event
//! synchronization calls.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --init_record--> Recording --finish_record--> Idle
//!       |                            ^                          |
//!       |                            +-------init_record--------+
//!       +--init_record (non-recordable device)--> Disabled (for good)
//! ```
//!
//! The device probe runs on the first `init_record` and is cached for the
//! lifetime of the recorder. Every later `init_record` resets the session.
//!
//! # Threading
//!
//! All operations take `&mut self` and the recorder holds a non-`Send`
//! policy object, so it is confined to the thread that issues GPU work.

use std::time::Duration;

use tracing::{debug, info, warn};

use gd_common::{
    DeviceIndex, DeviceProbe, DiagResult, ProbeFailurePolicy, RecorderConfig, RecorderMisuse,
    SyncCounts, SyncKind,
};

use crate::clock::{Clock, MonotonicClock};

/// Decides which devices may be recorded.
pub trait RecordingPolicy {
    fn is_recordable_device(&self, device: DeviceIndex) -> bool;
}

/// Record only on the primary device (ordinal 0).
#[derive(Copy, Clone, Debug, Default)]
pub struct PrimaryDeviceOnly;

impl RecordingPolicy for PrimaryDeviceOnly {
    fn is_recordable_device(&self, device: DeviceIndex) -> bool {
        device.is_primary()
    }
}

impl<F: Fn(DeviceIndex) -> bool> RecordingPolicy for F {
    fn is_recordable_device(&self, device: DeviceIndex) -> bool {
        self(device)
    }
}

/// Where the recorder is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecorderPhase {
    /// `init_record` has never succeeded.
    Uninitialized,
    /// Between sessions.
    Idle,
    /// Inside an `init_record` / `finish_record` session.
    Recording,
    /// The probed device is not recordable; every call is a no-op.
    Disabled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ProbeState {
    Unprobed,
    Resolved(DeviceIndex),
    Failed,
}

/// Accumulates wall-clock time spent in synchronization calls.
pub struct SyncRecorder<P, C = MonotonicClock> {
    probe: P,
    clock: C,
    policy: Box<dyn RecordingPolicy>,
    config: RecorderConfig,
    device: ProbeState,
    phase: RecorderPhase,
    accumulated_nanos: u64,
    pending: Option<(u64, SyncKind)>,
    counts: SyncCounts,
}

impl<P: DeviceProbe> SyncRecorder<P> {
    pub fn new(probe: P) -> Self {
        Self::with_clock(probe, MonotonicClock::new())
    }
}

impl<P: DeviceProbe, C: Clock> SyncRecorder<P, C> {
    pub fn with_clock(probe: P, clock: C) -> Self {
        Self {
            probe,
            clock,
            policy: Box::new(PrimaryDeviceOnly),
            config: RecorderConfig::default(),
            device: ProbeState::Unprobed,
            phase: RecorderPhase::Uninitialized,
            accumulated_nanos: 0,
            pending: None,
            counts: SyncCounts::default(),
        }
    }

    pub fn with_config(mut self, config: RecorderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_policy(mut self, policy: impl RecordingPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    // -- Session control --

    /// Begin a measurement session, resetting accumulated time and counts.
    ///
    /// Probes the current device on first use. On a non-recordable device
    /// the recorder becomes [`RecorderPhase::Disabled`].
    pub fn init_record(&mut self) -> DiagResult<()> {
        let device = match self.resolve_device()? {
            Some(device) if self.policy.is_recordable_device(device) => device,
            other => {
                if self.phase != RecorderPhase::Disabled {
                    info!(device = ?other, "Sync recording disabled for this device");
                }
                self.phase = RecorderPhase::Disabled;
                return Ok(());
            }
        };

        self.phase = RecorderPhase::Recording;
        self.accumulated_nanos = 0;
        self.pending = None;
        self.counts = SyncCounts::default();
        debug!(%device, "Sync recording session started");
        Ok(())
    }

    /// End the session and return the accumulated nanoseconds.
    ///
    /// Returns 0 when disabled or never initialized.
    pub fn finish_record(&mut self) -> u64 {
        match self.try_finish_record() {
            Ok(total) => total,
            Err(RecorderMisuse::NotRecording) if self.phase == RecorderPhase::Idle => {
                self.accumulated_nanos
            }
            Err(misuse) => {
                self.note_misuse(misuse);
                0
            }
        }
    }

    /// Checked `finish_record`: errors outside a session.
    pub fn try_finish_record(&mut self) -> Result<u64, RecorderMisuse> {
        self.ensure_recording()?;
        if let Some((_, kind)) = self.pending.take() {
            debug!(%kind, "Discarding open sync interval at session end");
        }
        self.phase = RecorderPhase::Idle;
        debug!(
            total_ns = self.accumulated_nanos,
            stream = self.counts.stream,
            device = self.counts.device,
            event = self.counts.event,
            "Sync recording session finished"
        );
        Ok(self.accumulated_nanos)
    }

    // -- Interval bracketing --

    /// Mark the start of a synchronization call.
    #[inline]
    pub fn start_record(&mut self, kind: SyncKind) {
        if let Err(misuse) = self.try_start_record(kind) {
            self.note_misuse(misuse);
        }
    }

    /// Mark the end of the synchronization call opened by `start_record`.
    #[inline]
    pub fn end_record(&mut self) {
        if let Err(misuse) = self.try_end_record() {
            self.note_misuse(misuse);
        }
    }

    /// Checked `start_record`. A nested start still replaces the open
    /// interval, exactly like `start_record`, before reporting it.
    pub fn try_start_record(&mut self, kind: SyncKind) -> Result<(), RecorderMisuse> {
        self.ensure_recording()?;
        let now = self.clock.now_nanos();
        let previous = self.pending.replace((now, kind));
        self.counts.bump(kind);
        match previous {
            Some(_) => Err(RecorderMisuse::NestedStart),
            None => Ok(()),
        }
    }

    /// Checked `end_record`. An end without an open interval adds nothing.
    pub fn try_end_record(&mut self) -> Result<(), RecorderMisuse> {
        self.ensure_recording()?;
        let now = self.clock.now_nanos();
        let (start, _) = self.pending.take().ok_or(RecorderMisuse::UnmatchedEnd)?;
        self.accumulated_nanos = self
            .accumulated_nanos
            .saturating_add(now.saturating_sub(start));
        Ok(())
    }

    /// Time `f` as a synchronization call of the given kind.
    pub fn record<T>(&mut self, kind: SyncKind, f: impl FnOnce() -> T) -> T {
        self.start_record(kind);
        let out = f();
        self.end_record();
        out
    }

    // -- Accessors --

    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.phase == RecorderPhase::Recording
    }

    /// The cached device, if the probe has resolved one.
    pub fn device(&self) -> Option<DeviceIndex> {
        match self.device {
            ProbeState::Resolved(device) => Some(device),
            _ => None,
        }
    }

    /// Time accumulated in the current (or last) session.
    pub fn accumulated(&self) -> Duration {
        Duration::from_nanos(self.accumulated_nanos)
    }

    /// Per-kind sync call counts for the current (or last) session.
    pub fn counts(&self) -> SyncCounts {
        self.counts
    }

    // -- Internals --

    fn resolve_device(&mut self) -> DiagResult<Option<DeviceIndex>> {
        match self.device {
            ProbeState::Resolved(device) => Ok(Some(device)),
            ProbeState::Failed => Ok(None),
            ProbeState::Unprobed => match self.probe.current_device() {
                Ok(device) => {
                    debug!(%device, "Probed current device for sync recording");
                    self.device = ProbeState::Resolved(device);
                    Ok(Some(device))
                }
                Err(e) => match self.config.probe_failure {
                    ProbeFailurePolicy::Disable => {
                        warn!(error = %e, "Device probe failed; sync recording disabled");
                        self.device = ProbeState::Failed;
                        Ok(None)
                    }
                    ProbeFailurePolicy::Propagate => Err(e),
                },
            },
        }
    }

    #[inline]
    fn ensure_recording(&self) -> Result<(), RecorderMisuse> {
        match self.phase {
            RecorderPhase::Recording => Ok(()),
            RecorderPhase::Disabled => Err(RecorderMisuse::Disabled),
            RecorderPhase::Uninitialized | RecorderPhase::Idle => {
                Err(RecorderMisuse::NotRecording)
            }
        }
    }

    fn note_misuse(&self, misuse: RecorderMisuse) {
        if self.config.report_misuse && misuse != RecorderMisuse::Disabled {
            warn!(%misuse, phase = ?self.phase, "Sync recorder misuse");
        }
    }
}

impl<P, C> std::fmt::Debug for SyncRecorder<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRecorder")
            .field("phase", &self.phase)
            .field("device", &self.device)
            .field("accumulated_nanos", &self.accumulated_nanos)
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}
