//! Sync timing recorder sessions driven by the simulated runtime's device probe.

use std::time::Duration;

use gd_diag::{
    DeviceIndex, DiagError, ManualClock, ProbeFailurePolicy, RecorderConfig, RecorderMisuse,
    RecorderPhase, SyncKind, SyncRecorder,
};
use gd_gpu_hal::SimulatedRuntime;

#[test]
fn session_on_primary_device_accumulates_sleeps() {
    let rt = SimulatedRuntime::new();
    let mut rec = SyncRecorder::new(&rt);
    rec.init_record().expect("probe");

    const N: u32 = 5;
    for _ in 0..N {
        rec.start_record(SyncKind::Stream);
        std::thread::sleep(Duration::from_millis(10));
        rec.end_record();
    }
    let total = Duration::from_nanos(rec.finish_record());

    assert!(total >= Duration::from_millis(10) * N, "total = {total:?}");
    // Generous upper bound for loaded CI machines.
    assert!(total < Duration::from_millis(10) * N * 20, "total = {total:?}");
    assert_eq!(rec.counts().stream, u64::from(N));
}

#[test]
fn secondary_device_scenario() {
    let rt = SimulatedRuntime::on_device(DeviceIndex(1));
    let clock = ManualClock::new();
    let mut rec = SyncRecorder::with_clock(&rt, clock.clone());

    rec.init_record().expect("probe");
    assert_eq!(rec.phase(), RecorderPhase::Disabled);
    assert_eq!(rec.device(), Some(DeviceIndex(1)));

    for kind in [SyncKind::Stream, SyncKind::Device, SyncKind::Event] {
        rec.start_record(kind);
        clock.advance(Duration::from_millis(10));
        rec.end_record();
    }
    assert_eq!(rec.finish_record(), 0);
    assert_eq!(rec.counts().total(), 0);
}

#[test]
fn finish_before_init_is_zero_and_side_effect_free() {
    let rt = SimulatedRuntime::new();
    let mut rec = SyncRecorder::new(&rt);
    assert_eq!(rec.finish_record(), 0);
    assert_eq!(rec.phase(), RecorderPhase::Uninitialized);
    // No probe without init.
    assert_eq!(rt.probe_count(), 0);
}

#[test]
fn device_probe_happens_once_per_recorder() {
    let rt = SimulatedRuntime::new();
    let mut rec = SyncRecorder::new(&rt);
    for _ in 0..4 {
        rec.init_record().expect("probe");
        rec.finish_record();
    }
    assert_eq!(rt.probe_count(), 1);
}

#[test]
fn second_init_resets_unfinished_session() {
    let rt = SimulatedRuntime::new();
    let clock = ManualClock::new();
    let mut rec = SyncRecorder::with_clock(&rt, clock.clone());

    rec.init_record().expect("probe");
    rec.record(SyncKind::Device, || clock.advance(Duration::from_millis(25)));
    assert_eq!(rec.accumulated(), Duration::from_millis(25));

    rec.init_record().expect("probe");
    rec.record(SyncKind::Device, || clock.advance(Duration::from_millis(3)));
    assert_eq!(rec.finish_record(), 3_000_000);
}

#[test]
fn probe_failure_policies() {
    let rt = SimulatedRuntime::without_device("invalid device context");

    let mut disabled = SyncRecorder::new(&rt);
    disabled.init_record().expect("disable policy swallows the error");
    assert_eq!(disabled.phase(), RecorderPhase::Disabled);
    assert_eq!(disabled.finish_record(), 0);

    let mut strict = SyncRecorder::new(&rt).with_config(RecorderConfig {
        probe_failure: ProbeFailurePolicy::Propagate,
        report_misuse: true,
    });
    assert_eq!(
        strict.init_record(),
        Err(DiagError::DeviceProbe("invalid device context".to_string()))
    );
    assert_eq!(
        strict.try_start_record(SyncKind::Stream),
        Err(RecorderMisuse::NotRecording)
    );
}

#[test]
fn checked_api_surfaces_caller_discipline_errors() {
    let rt = SimulatedRuntime::new();
    let mut rec = SyncRecorder::new(&rt).with_config(RecorderConfig {
        report_misuse: true,
        ..RecorderConfig::default()
    });
    rec.init_record().expect("probe");

    assert_eq!(rec.try_end_record(), Err(RecorderMisuse::UnmatchedEnd));
    rec.try_start_record(SyncKind::Event).expect("open");
    assert_eq!(
        rec.try_start_record(SyncKind::Event),
        Err(RecorderMisuse::NestedStart)
    );
    rec.try_end_record().expect("close");
    assert!(rec.try_finish_record().is_ok());
    assert_eq!(rec.try_finish_record(), Err(RecorderMisuse::NotRecording));
}
