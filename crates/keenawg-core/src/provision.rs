// ── Interface provisioner ──
//
// Drives a new WireGuard/AWG interface from "artifact on disk" to "tunnel
// up" through a fixed sequence of router calls:
//
//   Pending ─create─▶ Created ─configure─▶ Configured ─enable global─▶
//   CapabilityEnabled ─activate─▶ Activated ─await ready─▶ Ready
//
// Any step may fail, which ends the run in `Failed { at, cause }`. There is
// no rollback: the error carries the handle of the interface that was left
// behind so the caller can decide to delete it.

use std::fmt;
use std::time::Duration;

use strum::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ProvisionTimings;
use crate::error::{CoreError, Step};
use crate::model::interface::{
    AdminState, Capability, InterfaceHandle, InterfaceKind, InterfaceStatus, InterfaceSummary,
};
use crate::model::peer::PeerConfig;
use crate::router::RouterApi;

// ── State machine ────────────────────────────────────────────────────

/// Where a provisioning run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionState {
    Pending,
    Created,
    Configured,
    CapabilityEnabled,
    Activated,
    Ready,
    Failed { at: ProvisionStep, cause: String },
}

/// One transition of the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProvisionStep {
    #[strum(to_string = "create")]
    Create,
    #[strum(to_string = "configure")]
    Configure,
    #[strum(to_string = "enable global IP")]
    EnableCapability,
    #[strum(to_string = "activate")]
    Activate,
    #[strum(to_string = "await ready")]
    AwaitReady,
    /// Persisting the router configuration once the interface is `Ready`.
    /// Not part of the transition table.
    #[strum(to_string = "save")]
    Save,
}

struct Transition {
    from: ProvisionState,
    step: ProvisionStep,
    to: ProvisionState,
}

const TRANSITIONS: [Transition; 5] = [
    Transition {
        from: ProvisionState::Pending,
        step: ProvisionStep::Create,
        to: ProvisionState::Created,
    },
    Transition {
        from: ProvisionState::Created,
        step: ProvisionStep::Configure,
        to: ProvisionState::Configured,
    },
    Transition {
        from: ProvisionState::Configured,
        step: ProvisionStep::EnableCapability,
        to: ProvisionState::CapabilityEnabled,
    },
    Transition {
        from: ProvisionState::CapabilityEnabled,
        step: ProvisionStep::Activate,
        to: ProvisionState::Activated,
    },
    Transition {
        from: ProvisionState::Activated,
        step: ProvisionStep::AwaitReady,
        to: ProvisionState::Ready,
    },
];

impl ProvisionState {
    /// The step that leaves this state, or `None` for terminal states.
    pub fn next_step(&self) -> Option<ProvisionStep> {
        TRANSITIONS
            .iter()
            .find(|t| t.from == *self)
            .map(|t| t.step)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed { .. })
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Created => f.write_str("created"),
            Self::Configured => f.write_str("configured"),
            Self::CapabilityEnabled => f.write_str("global IP enabled"),
            Self::Activated => f.write_str("activated"),
            Self::Ready => f.write_str("ready"),
            Self::Failed { at, cause } => write!(f, "failed at {at}: {cause}"),
        }
    }
}

impl ProvisionStep {
    /// The state reached when this step succeeds.
    pub fn target_state(self) -> ProvisionState {
        TRANSITIONS
            .iter()
            .find(|t| t.step == self)
            .map_or(ProvisionState::Ready, |t| t.to.clone())
    }
}

impl From<ProvisionStep> for Step {
    fn from(step: ProvisionStep) -> Self {
        match step {
            ProvisionStep::Create => Self::CreateInterface,
            ProvisionStep::Configure => Self::ConfigureInterface,
            ProvisionStep::EnableCapability => Self::EnableCapability,
            ProvisionStep::Activate => Self::Activate,
            ProvisionStep::AwaitReady => Self::AwaitReady,
            ProvisionStep::Save => Self::Save,
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// A provisioning run that did not reach `Ready`.
#[derive(Debug, thiserror::Error)]
#[error("Provisioning {state}")]
pub struct ProvisionError {
    /// Always `ProvisionState::Failed`.
    pub state: ProvisionState,
    /// The interface left on the router, if creation got that far.
    pub handle: Option<InterfaceHandle>,
    #[source]
    pub source: CoreError,
}

// ── Provisioner ──────────────────────────────────────────────────────

type Observer<'a> = Box<dyn Fn(&ProvisionState) + Send + Sync + 'a>;

/// Runs the provisioning sequence against a router.
pub struct Provisioner<'a, R> {
    router: &'a R,
    timings: ProvisionTimings,
    observer: Option<Observer<'a>>,
}

impl<'a, R: RouterApi> Provisioner<'a, R> {
    pub fn new(router: &'a R) -> Self {
        Self {
            router,
            timings: ProvisionTimings::default(),
            observer: None,
        }
    }

    pub fn with_timings(mut self, timings: ProvisionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Receive every state transition, including the final `Failed`.
    pub fn with_observer(mut self, observer: impl Fn(&ProvisionState) + Send + Sync + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn notify(&self, state: &ProvisionState) {
        if let Some(ref observer) = self.observer {
            observer(state);
        }
    }

    /// Provision `peer` as an interface named `name`, then save the router
    /// configuration.
    pub async fn run(
        &self,
        peer: &PeerConfig,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<InterfaceHandle, ProvisionError> {
        let mut state = ProvisionState::Pending;
        let mut handle: Option<InterfaceHandle> = None;
        self.notify(&state);

        while let Some(step) = state.next_step() {
            debug!(%step, "provisioning step");
            match self.execute(step, peer, name, &mut handle, cancel).await {
                Ok(()) => {
                    state = step.target_state();
                    info!(%state, interface = ?handle.as_ref().map(|h| &h.id), "provisioning advanced");
                    self.notify(&state);
                }
                Err(source) => return Err(self.fail(step, handle, source)),
            }
        }

        let Some(handle) = handle else {
            return Err(self.fail(
                ProvisionStep::Create,
                None,
                CoreError::Config {
                    message: "provisioning finished without an interface".into(),
                },
            ));
        };

        if let Err(e) = self.router.save_configuration().await {
            let source = CoreError::remote(Step::Save, handle.id.clone(), e);
            return Err(self.fail(ProvisionStep::Save, Some(handle), source));
        }

        Ok(handle)
    }

    async fn execute(
        &self,
        step: ProvisionStep,
        peer: &PeerConfig,
        name: &str,
        handle: &mut Option<InterfaceHandle>,
        cancel: &CancellationToken,
    ) -> Result<(), CoreError> {
        if step == ProvisionStep::Create {
            *handle = Some(self.create_interface(peer, name).await?);
            return Ok(());
        }

        let Some(current) = handle.as_mut() else {
            return Err(CoreError::Config {
                message: format!("cannot {step} before the interface exists"),
            });
        };

        match step {
            ProvisionStep::Create | ProvisionStep::Save => Ok(()),
            ProvisionStep::Configure => self.configure(current, peer, name).await,
            ProvisionStep::EnableCapability => self.enable_global_capability(current).await,
            ProvisionStep::Activate => self.activate(current).await,
            ProvisionStep::AwaitReady => self.await_ready(current, cancel).await,
        }
    }

    fn fail(
        &self,
        step: ProvisionStep,
        mut handle: Option<InterfaceHandle>,
        source: CoreError,
    ) -> ProvisionError {
        // A failed save leaves the tunnel itself up.
        if step != ProvisionStep::Save {
            if let Some(ref mut h) = handle {
                h.status = InterfaceStatus::Failed;
            }
        }
        let state = ProvisionState::Failed {
            at: step,
            cause: source.to_string(),
        };
        warn!(%state, "provisioning stopped");
        self.notify(&state);
        ProvisionError {
            state,
            handle,
            source,
        }
    }

    // ── Steps ────────────────────────────────────────────────────────

    /// Look for an interface that already serves this peer.
    pub async fn find_existing(
        &self,
        peer: &PeerConfig,
    ) -> Result<Option<InterfaceSummary>, CoreError> {
        let interfaces = self
            .router
            .list_interfaces(InterfaceKind::Wireguard)
            .await
            .map_err(|e| CoreError::remote(Step::ProbeExisting, "wireguard interfaces", e))?;
        Ok(interfaces
            .into_iter()
            .find(|iface| iface.peer_keys.iter().any(|key| key == peer.identity())))
    }

    /// Import the artifact, unless an interface for the same peer exists.
    pub async fn create_interface(
        &self,
        peer: &PeerConfig,
        name: &str,
    ) -> Result<InterfaceHandle, CoreError> {
        if let Some(existing) = self.find_existing(peer).await? {
            return Err(CoreError::AlreadyExists {
                interface: existing.id,
                identity: peer.identity().to_owned(),
            });
        }

        let id = self
            .router
            .create_interface(peer, name)
            .await
            .map_err(|e| CoreError::remote(Step::CreateInterface, name, e))?;
        info!(%id, name, "interface created");
        Ok(InterfaceHandle::new(id))
    }

    /// Wait for the router to settle, then push the full configuration.
    pub async fn configure(
        &self,
        handle: &mut InterfaceHandle,
        peer: &PeerConfig,
        description: &str,
    ) -> Result<(), CoreError> {
        if !self.timings.settle_delay.is_zero() {
            debug!(delay = ?self.timings.settle_delay, "waiting for router to settle");
            tokio::time::sleep(self.timings.settle_delay).await;
        }
        self.router
            .update_interface_config(&handle.id, peer, description)
            .await
            .map_err(|e| CoreError::remote(Step::ConfigureInterface, handle.id.clone(), e))?;
        handle.status = InterfaceStatus::Configured;
        Ok(())
    }

    pub async fn enable_global_capability(
        &self,
        handle: &mut InterfaceHandle,
    ) -> Result<(), CoreError> {
        self.router
            .set_capability_flag(&handle.id, Capability::GlobalIp, true)
            .await
            .map_err(|e| CoreError::remote(Step::EnableCapability, handle.id.clone(), e))
    }

    pub async fn activate(&self, handle: &mut InterfaceHandle) -> Result<(), CoreError> {
        self.router
            .set_admin_state(&handle.id, AdminState::Up)
            .await
            .map_err(|e| CoreError::remote(Step::Activate, handle.id.clone(), e))?;
        handle.status = InterfaceStatus::Activating;
        Ok(())
    }

    /// Poll until the interface is operational, the ready timeout passes or
    /// `cancel` fires. The deadline also bounds a poll that is still in
    /// flight. Transient poll failures are retried on the next tick.
    pub async fn await_ready(
        &self,
        handle: &mut InterfaceHandle,
        cancel: &CancellationToken,
    ) -> Result<(), CoreError> {
        let started = Instant::now();
        let deadline = started + self.timings.ready_timeout;
        let timeout = |cancelled: bool| CoreError::Timeout {
            interface: handle.id.clone(),
            waited_secs: started.elapsed().as_secs(),
            cancelled,
        };

        let mut polls: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(timeout(true));
            }

            polls += 1;
            let status = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(timeout(true)),
                status = self.router.get_interface_status(&handle.id) => status,
                () = tokio::time::sleep_until(deadline) => return Err(timeout(false)),
            };

            match status {
                Ok(report) if report.is_operational() => {
                    info!(id = %handle.id, polls, "interface is up");
                    break;
                }
                Ok(report) => debug!(id = %handle.id, polls, ?report, "interface not ready"),
                Err(e) if e.is_transient() => {
                    warn!(id = %handle.id, polls, error = %e, "status poll failed, retrying");
                }
                Err(e) => return Err(CoreError::remote(Step::AwaitReady, handle.id.clone(), e)),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timeout(false));
            }
            let wait: Duration = self.timings.poll_interval.min(deadline - now);
            tokio::select! {
                () = cancel.cancelled() => return Err(timeout(true)),
                () = tokio::time::sleep(wait) => {}
            }
        }

        handle.status = InterfaceStatus::Up;
        Ok(())
    }

    /// Remove an interface and persist the change.
    pub async fn delete_interface(&self, id: &str) -> Result<(), CoreError> {
        self.router
            .delete_interface(id)
            .await
            .map_err(|e| CoreError::remote(Step::DeleteInterface, id, e))?;
        self.router
            .save_configuration()
            .await
            .map_err(|e| CoreError::remote(Step::Save, id, e))?;
        info!(id, "interface deleted");
        Ok(())
    }
}
