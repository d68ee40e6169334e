//! Drive control state machine.
//!
//! Consumes one status snapshot per poll cycle plus operator request
//! latches, and sequences them into transitions from the table in
//! [`crate::state`]. Drive writes happen only as state-entry effects:
//! entering `Starting` issues start, `Stopping` issues stop, `Emergency`
//! issues emergency stop.
//!
//! Timeouts are evaluated lazily: a state with a timeout fires its timeout
//! trigger on the first evaluation pass that finds it expired and produced
//! no other transition.

use crate::annunciator::{AlarmKind, AlertSeverity, Annunciator};
use crate::error::ControlError;
use crate::state::{DriveState, MAX_EVALUATIONS, STATE_TIMEOUT, Trigger, lookup};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use vfd_common::clock::{Clock, SystemClock};
use vfd_common::drive::transport::RegisterTransport;
use vfd_common::drive::types::{DriveStatus, fault_description};
use vfd_hal::DriveClient;

/// Drive commands issued as state-entry effects.
pub trait DriveActions {
    fn start(&mut self) -> impl Future<Output = bool>;
    fn stop(&mut self) -> impl Future<Output = bool>;
    fn emergency_stop(&mut self) -> impl Future<Output = bool>;
}

impl<T: RegisterTransport> DriveActions for DriveClient<T> {
    async fn start(&mut self) -> bool {
        DriveClient::start(self).await
    }

    async fn stop(&mut self) -> bool {
        DriveClient::stop(self).await
    }

    async fn emergency_stop(&mut self) -> bool {
        DriveClient::emergency_stop(self).await
    }
}

/// One-shot request latches. Repeated requests collapse into one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequests {
    pub start: bool,
    pub stop: bool,
    pub fault_reset: bool,
    pub emergency: bool,
}

/// Clear a latch and report whether it was set.
fn take(latch: &mut bool) -> bool {
    std::mem::take(latch)
}

/// Control state machine for one drive.
pub struct ControlStateMachine<C: Clock = SystemClock> {
    state: DriveState,
    entered_at: Instant,
    requests: ControlRequests,
    last_fault_code: u16,
    clock: C,
}

impl ControlStateMachine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ControlStateMachine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ControlStateMachine<C> {
    /// Create a machine in `Disconnected` reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        let entered_at = clock.now();
        Self {
            state: DriveState::Disconnected,
            entered_at,
            requests: ControlRequests::default(),
            last_fault_code: 0,
            clock,
        }
    }

    #[inline]
    pub fn state(&self) -> DriveState {
        self.state
    }

    /// Pending request latches.
    #[inline]
    pub fn requests(&self) -> ControlRequests {
        self.requests
    }

    /// Time since the last transition (internal ones included).
    pub fn time_in_state(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.entered_at)
    }

    // ─── Requests ───────────────────────────────────────────────────

    /// Latch a start request. Only accepted in `Ready`.
    pub fn request_start(&mut self) -> bool {
        if self.state != DriveState::Ready {
            debug!("Start request ignored in state {}", self.state);
            return false;
        }
        self.requests.start = true;
        info!("Start requested");
        true
    }

    /// Latch a stop request. Only accepted in `Running` or `Starting`.
    pub fn request_stop(&mut self) -> bool {
        if !matches!(self.state, DriveState::Running | DriveState::Starting) {
            debug!("Stop request ignored in state {}", self.state);
            return false;
        }
        self.requests.stop = true;
        info!("Stop requested");
        true
    }

    /// Latch a fault reset request. Only accepted in `Fault`.
    pub fn request_fault_reset(&mut self) -> bool {
        if self.state != DriveState::Fault {
            debug!("Fault reset request ignored in state {}", self.state);
            return false;
        }
        self.requests.fault_reset = true;
        info!("Fault reset requested");
        true
    }

    /// Latch an emergency stop request. Accepted in every state.
    pub fn request_emergency_stop(&mut self) {
        self.requests.emergency = true;
        warn!("Emergency stop requested!");
    }

    // ─── Transitions ────────────────────────────────────────────────

    /// Fire a trigger from the current state.
    ///
    /// Runs exit effects of the old state and entry effects of the new one,
    /// including on re-entry. Internal triggers only reset the state timer.
    pub async fn fire<A: DriveActions>(
        &mut self,
        trigger: Trigger,
        actions: &mut A,
        annunciator: &mut dyn Annunciator,
    ) -> Result<DriveState, ControlError> {
        let from = self.state;
        let Some(to) = lookup(trigger, from) else {
            error!("Invalid trigger {:?} from state {}", trigger, from);
            return Err(ControlError::InvalidTransition {
                trigger,
                state: from,
            });
        };

        self.entered_at = self.clock.now();
        if trigger.is_internal() {
            debug!("{:?} in state {}", trigger, from);
            return Ok(to);
        }

        self.on_exit(from, annunciator);
        self.state = to;
        info!("State {} -> {} ({:?})", from, to, trigger);
        self.on_enter(to, trigger, actions, annunciator).await;
        Ok(to)
    }

    fn on_exit(&mut self, from: DriveState, annunciator: &mut dyn Annunciator) {
        match from {
            DriveState::Disconnected => annunciator.set_alarm(AlarmKind::Communication, false),
            DriveState::Emergency => info!("Emergency stop reset"),
            _ => {}
        }
    }

    async fn on_enter<A: DriveActions>(
        &mut self,
        to: DriveState,
        trigger: Trigger,
        actions: &mut A,
        annunciator: &mut dyn Annunciator,
    ) {
        if matches!(
            to,
            DriveState::Disconnected | DriveState::Fault | DriveState::Emergency
        ) {
            self.clear_motion_requests();
        }

        match to {
            DriveState::Disconnected => {
                warn!("Drive communication lost");
                annunciator.set_alarm(AlarmKind::Communication, true);
            }
            DriveState::Connected => info!("Drive connected, waiting for ready"),
            DriveState::Ready => info!("Drive ready"),
            DriveState::Starting => {
                if !actions.start().await {
                    warn!("Start command write failed");
                }
            }
            DriveState::Running => info!("Drive running"),
            DriveState::Stopping => {
                if !actions.stop().await {
                    warn!("Stop command write failed");
                }
            }
            DriveState::Fault => {
                let message = match trigger {
                    Trigger::StartTimeout => format!(
                        "Drive did not report running within {} s",
                        STATE_TIMEOUT.as_secs()
                    ),
                    Trigger::StopTimeout => format!(
                        "Drive did not report stopped within {} s",
                        STATE_TIMEOUT.as_secs()
                    ),
                    _ => format!(
                        "Drive fault detected: {} ({})",
                        fault_description(self.last_fault_code),
                        self.last_fault_code
                    ),
                };
                error!("Drive in fault state: {}", message);
                annunciator.send_alert(AlertSeverity::Warning, &message);
            }
            DriveState::Emergency => {
                error!("Emergency stop active!");
                if !actions.emergency_stop().await {
                    error!("Emergency stop write failed");
                }
                annunciator.send_alert(AlertSeverity::Critical, "Emergency stop activated!");
            }
        }
    }

    /// Drop pending start and stop requests. A start latched before an
    /// interruption must not run the drive once it is ready again.
    fn clear_motion_requests(&mut self) {
        if self.requests.start || self.requests.stop {
            info!("Pending start/stop requests cleared");
        }
        self.requests.start = false;
        self.requests.stop = false;
    }

    // ─── Evaluation ─────────────────────────────────────────────────

    /// One evaluation pass against a snapshot. Returns the trigger fired,
    /// if any.
    pub async fn evaluate<A: DriveActions>(
        &mut self,
        snapshot: Option<&DriveStatus>,
        actions: &mut A,
        annunciator: &mut dyn Annunciator,
    ) -> Result<Option<Trigger>, ControlError> {
        let trigger = match self.next_trigger(snapshot) {
            Some(trigger) => Some(trigger),
            None => self.expired_timeout(),
        };
        if let Some(trigger) = trigger {
            self.fire(trigger, actions, annunciator).await?;
        }
        Ok(trigger)
    }

    /// Evaluate repeatedly until the state stops changing, at most
    /// [`MAX_EVALUATIONS`] passes. Returns the final state.
    pub async fn spin<A: DriveActions>(
        &mut self,
        snapshot: Option<&DriveStatus>,
        actions: &mut A,
        annunciator: &mut dyn Annunciator,
    ) -> Result<DriveState, ControlError> {
        for _ in 0..MAX_EVALUATIONS {
            let before = self.state;
            self.evaluate(snapshot, actions, annunciator).await?;
            if self.state == before {
                break;
            }
        }
        Ok(self.state)
    }

    /// Decide the next trigger from the snapshot and the latches.
    /// Consumes at most one latch.
    fn next_trigger(&mut self, snapshot: Option<&DriveStatus>) -> Option<Trigger> {
        use DriveState::*;

        let Some(status) = snapshot else {
            return (self.state != Disconnected).then_some(Trigger::Disconnect);
        };

        if self.state == Disconnected {
            return Some(Trigger::Connect);
        }

        if status.fault && self.state != Fault {
            warn!("Drive fault detected: {}", status.fault_code);
            self.last_fault_code = status.fault_code;
            return Some(Trigger::FaultDetected);
        }

        if take(&mut self.requests.emergency) {
            return Some(Trigger::EmergencyStop);
        }

        if self.state == Fault && take(&mut self.requests.fault_reset) {
            return Some(Trigger::FaultReset);
        }

        match self.state {
            Connected if status.ready => Some(Trigger::DriveReady),
            Ready if !status.ready => Some(Trigger::DriveNotReady),
            Ready if take(&mut self.requests.start) => Some(Trigger::StartCommand),
            Starting if status.running => Some(Trigger::Started),
            Starting if take(&mut self.requests.stop) => Some(Trigger::StopCommand),
            Running if !status.running => Some(Trigger::DriveReady),
            Running if take(&mut self.requests.stop) => Some(Trigger::StopCommand),
            Stopping if !status.running && status.ready => Some(Trigger::Stopped),
            _ => None,
        }
    }

    fn expired_timeout(&self) -> Option<Trigger> {
        let trigger = self.state.timeout_trigger()?;
        if self.time_in_state() < STATE_TIMEOUT {
            return None;
        }
        warn!(
            "State {} timed out after {:?}",
            self.state,
            self.time_in_state()
        );
        Some(trigger)
    }
}
