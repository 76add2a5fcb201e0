#![allow(clippy::unwrap_used)]
// Provisioner state machine against the in-memory router.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;

use keenawg_core::{
    AdminState, CancellationToken, CoreError, InterfaceStatus, InterfaceStatusReport,
    InterfaceSummary, ProvisionState, ProvisionStep, ProvisionTimings, Provisioner, Step,
};

use common::{Call, MockRouter, PEER_KEY, busy, down, peer_config, rejected, up};

fn timings(ready_timeout_secs: u64) -> ProvisionTimings {
    ProvisionTimings {
        settle_delay: Duration::from_secs(1),
        poll_interval: Duration::from_secs(1),
        ready_timeout: Duration::from_secs(ready_timeout_secs),
    }
}

// ── Transition table ────────────────────────────────────────────────

#[test]
fn transition_table_is_linear() {
    let mut state = ProvisionState::Pending;
    let mut steps = Vec::new();
    while let Some(step) = state.next_step() {
        steps.push(step);
        state = step.target_state();
    }
    assert_eq!(
        steps,
        [
            ProvisionStep::Create,
            ProvisionStep::Configure,
            ProvisionStep::EnableCapability,
            ProvisionStep::Activate,
            ProvisionStep::AwaitReady,
        ]
    );
    assert_eq!(state, ProvisionState::Ready);
    assert!(state.is_terminal());
}

#[test]
fn failed_state_is_terminal() {
    let failed = ProvisionState::Failed {
        at: ProvisionStep::Activate,
        cause: "x".into(),
    };
    assert_eq!(failed.next_step(), None);
}

// ── Full runs ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn provisions_wg0_after_polling() {
    let router = MockRouter::creating("wg0").with_statuses([Ok(down()), Ok(down()), Ok(up())]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let handle = Provisioner::new(&router)
        .with_timings(timings(30))
        .with_observer(move |state| sink.lock().unwrap().push(state.clone()))
        .run(&peer_config(), "wg0", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handle.id, "wg0");
    assert_eq!(handle.status, InterfaceStatus::Up);
    assert_eq!(
        router.calls(),
        vec![
            Call::ListInterfaces,
            Call::Create("wg0".into()),
            Call::Configure("wg0".into()),
            Call::Capability("wg0".into(), true),
            Call::Admin("wg0".into(), AdminState::Up),
            Call::Status("wg0".into()),
            Call::Status("wg0".into()),
            Call::Status("wg0".into()),
            Call::Save,
        ]
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ProvisionState::Pending,
            ProvisionState::Created,
            ProvisionState::Configured,
            ProvisionState::CapabilityEnabled,
            ProvisionState::Activated,
            ProvisionState::Ready,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn existing_identity_is_rejected_without_mutation() {
    let router = MockRouter {
        existing: vec![InterfaceSummary {
            id: "Wireguard3".into(),
            description: Some("office".into()),
            kind: Some("Wireguard".into()),
            status: InterfaceStatusReport::default(),
            peer_keys: vec![PEER_KEY.into()],
            endpoint: None,
        }],
        ..MockRouter::creating("wg0")
    };

    let err = Provisioner::new(&router)
        .run(&peer_config(), "wg0", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err.source, CoreError::AlreadyExists { ref interface, .. } if interface == "Wireguard3"),
        "got: {:?}",
        err.source
    );
    assert!(matches!(
        err.state,
        ProvisionState::Failed {
            at: ProvisionStep::Create,
            ..
        }
    ));
    assert!(err.handle.is_none());
    assert_eq!(router.calls(), vec![Call::ListInterfaces]);
}

#[tokio::test(start_paused = true)]
async fn configure_failure_reports_step_and_handle() {
    let router = MockRouter {
        fail_configure: true,
        ..MockRouter::creating("Wireguard1")
    };

    let err = Provisioner::new(&router)
        .with_timings(timings(30))
        .run(&peer_config(), "office", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.source.step(), Some(Step::ConfigureInterface));
    let handle = err.handle.unwrap();
    assert_eq!(handle.id, "Wireguard1");
    assert_eq!(handle.status, InterfaceStatus::Failed);
    assert_eq!(router.count(|c| matches!(c, Call::Capability(..))), 0);
    assert_eq!(router.count(|c| matches!(c, Call::Save)), 0);
}

#[tokio::test(start_paused = true)]
async fn save_failure_is_reported_after_ready() {
    let router = MockRouter {
        fail_save: true,
        ..MockRouter::creating("wg0").with_statuses([Ok(up())])
    };

    let err = Provisioner::new(&router)
        .with_timings(timings(30))
        .run(&peer_config(), "wg0", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.source.step(), Some(Step::Save));
    assert!(
        matches!(err.state, ProvisionState::Failed { at: ProvisionStep::Save, .. }),
        "got: {:?}",
        err.state
    );
    assert_eq!(err.handle.unwrap().status, InterfaceStatus::Up);
}

#[tokio::test(start_paused = true)]
async fn observer_sees_a_failed_save() {
    let router = MockRouter {
        fail_save: true,
        ..MockRouter::creating("wg0").with_statuses([Ok(up())])
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    Provisioner::new(&router)
        .with_timings(timings(30))
        .with_observer(move |state| sink.lock().unwrap().push(state.clone()))
        .run(&peer_config(), "wg0", &CancellationToken::new())
        .await
        .unwrap_err();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[seen.len() - 2], ProvisionState::Ready);
    assert!(matches!(
        seen.last(),
        Some(ProvisionState::Failed { at: ProvisionStep::Save, .. })
    ));
}

// ── Individual steps ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn configure_waits_for_settle_delay() {
    let router = MockRouter::creating("wg0");
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");
    let started = Instant::now();

    Provisioner::new(&router)
        .with_timings(timings(30))
        .configure(&mut handle, &peer_config(), "wg0")
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(handle.status, InterfaceStatus::Configured);
}

#[tokio::test(start_paused = true)]
async fn await_ready_stops_at_first_operational_poll() {
    let router = MockRouter::creating("wg0").with_statuses([Ok(up()), Ok(down())]);
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");

    Provisioner::new(&router)
        .await_ready(&mut handle, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(router.count(|c| matches!(c, Call::Status(_))), 1);
    assert_eq!(handle.status, InterfaceStatus::Up);
}

#[tokio::test(start_paused = true)]
async fn await_ready_times_out_when_never_operational() {
    let router = MockRouter::creating("wg0");
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");

    let err = Provisioner::new(&router)
        .with_timings(timings(5))
        .await_ready(&mut handle, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::Timeout {
            interface,
            waited_secs,
            cancelled,
        } => {
            assert_eq!(interface, "wg0");
            assert_eq!(waited_secs, 5);
            assert!(!cancelled);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    // One poll at t=0 plus one per second up to the deadline.
    assert_eq!(router.count(|c| matches!(c, Call::Status(_))), 6);
}

#[tokio::test(start_paused = true)]
async fn await_ready_deadline_bounds_a_slow_poll() {
    let router = MockRouter {
        status_latency: Duration::from_secs(60),
        ..MockRouter::creating("wg0").with_statuses([Ok(up())])
    };
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");
    let started = Instant::now();

    let err = Provisioner::new(&router)
        .with_timings(timings(5))
        .await_ready(&mut handle, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::Timeout { waited_secs: 5, cancelled: false, .. }),
        "got: {err:?}"
    );
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_ne!(handle.status, InterfaceStatus::Up);
}

#[tokio::test(start_paused = true)]
async fn await_ready_retries_transient_errors() {
    let router = MockRouter::creating("wg0").with_statuses([Err(busy()), Ok(up())]);
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");

    Provisioner::new(&router)
        .await_ready(&mut handle, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(router.count(|c| matches!(c, Call::Status(_))), 2);
}

#[tokio::test(start_paused = true)]
async fn await_ready_aborts_on_rejection() {
    let router =
        MockRouter::creating("wg0").with_statuses([Err(rejected("no such interface"))]);
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");

    let err = Provisioner::new(&router)
        .await_ready(&mut handle, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(Step::AwaitReady));
    assert_eq!(router.count(|c| matches!(c, Call::Status(_))), 1);
}

#[tokio::test(start_paused = true)]
async fn await_ready_honours_cancellation() {
    let router = MockRouter::creating("wg0");
    let mut handle = keenawg_core::InterfaceHandle::new("wg0");
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let err = Provisioner::new(&router)
        .with_timings(timings(30))
        .await_ready(&mut handle, &cancel)
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::Timeout { cancelled: true, .. }),
        "got: {err:?}"
    );
    assert_eq!(router.count(|c| matches!(c, Call::Status(_))), 3);
}

#[tokio::test(start_paused = true)]
async fn delete_interface_saves_configuration() {
    let router = MockRouter::default();

    Provisioner::new(&router)
        .delete_interface("Wireguard4")
        .await
        .unwrap();

    assert_eq!(
        router.calls(),
        vec![Call::DeleteInterface("Wireguard4".into()), Call::Save]
    );
}
