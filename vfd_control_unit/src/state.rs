//! Drive control states and the transition table.
//!
//! The table is plain data checked at fire time. A trigger fired from a
//! state that is not listed as one of its sources is a programmer error and
//! is rejected with `ControlError::InvalidTransition`.

pub mod machine;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Timeout for the states that carry one, measured from state entry.
pub const STATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound of evaluation passes per status snapshot.
pub const MAX_EVALUATIONS: usize = 5;

/// Drive control state. Exactly one is current; initial is `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveState {
    Disconnected,
    Connected,
    Ready,
    Starting,
    Running,
    Stopping,
    Fault,
    Emergency,
}

impl DriveState {
    /// Lowercase state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Ready => "ready",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Fault => "fault",
            Self::Emergency => "emergency",
        }
    }

    /// Timeout trigger for states that have one.
    pub const fn timeout_trigger(self) -> Option<Trigger> {
        match self {
            Self::Disconnected => Some(Trigger::AttemptReconnect),
            Self::Starting => Some(Trigger::StartTimeout),
            Self::Stopping => Some(Trigger::StopTimeout),
            _ => None,
        }
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named transition trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Connect,
    Disconnect,
    /// Timeout placeholder while disconnected; the poll loop does the reconnect.
    AttemptReconnect,
    DriveReady,
    DriveNotReady,
    StartCommand,
    Started,
    StopCommand,
    Stopped,
    StartTimeout,
    StopTimeout,
    FaultDetected,
    FaultReset,
    EmergencyStop,
    EmergencyReset,
}

impl Trigger {
    /// Internal triggers reset the state timer without exit/entry effects.
    pub const fn is_internal(self) -> bool {
        matches!(self, Self::AttemptReconnect)
    }
}

/// Valid source states of a transition.
#[derive(Debug, Clone, Copy)]
pub enum Sources {
    Any,
    Only(&'static [DriveState]),
}

impl Sources {
    pub fn contains(&self, state: DriveState) -> bool {
        match self {
            Self::Any => true,
            Self::Only(states) => states.contains(&state),
        }
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub trigger: Trigger,
    pub sources: Sources,
    pub target: DriveState,
}

const fn row(trigger: Trigger, sources: Sources, target: DriveState) -> Transition {
    Transition {
        trigger,
        sources,
        target,
    }
}

use DriveState as S;

/// The complete transition table.
pub const TRANSITIONS: &[Transition] = &[
    row(Trigger::Connect, Sources::Only(&[S::Disconnected]), S::Connected),
    row(Trigger::Disconnect, Sources::Any, S::Disconnected),
    row(
        Trigger::AttemptReconnect,
        Sources::Only(&[S::Disconnected]),
        S::Disconnected,
    ),
    row(
        Trigger::DriveReady,
        Sources::Only(&[S::Connected, S::Stopping, S::Running]),
        S::Ready,
    ),
    row(Trigger::DriveNotReady, Sources::Only(&[S::Ready]), S::Connected),
    row(Trigger::StartCommand, Sources::Only(&[S::Ready]), S::Starting),
    row(Trigger::Started, Sources::Only(&[S::Starting]), S::Running),
    row(
        Trigger::StopCommand,
        Sources::Only(&[S::Running, S::Starting]),
        S::Stopping,
    ),
    row(Trigger::Stopped, Sources::Only(&[S::Stopping]), S::Ready),
    row(Trigger::StartTimeout, Sources::Only(&[S::Starting]), S::Fault),
    row(Trigger::StopTimeout, Sources::Only(&[S::Stopping]), S::Fault),
    row(Trigger::FaultDetected, Sources::Any, S::Fault),
    row(Trigger::FaultReset, Sources::Only(&[S::Fault]), S::Connected),
    row(Trigger::EmergencyStop, Sources::Any, S::Emergency),
    row(
        Trigger::EmergencyReset,
        Sources::Only(&[S::Emergency]),
        S::Connected,
    ),
];

/// Destination of `trigger` fired from `from`, if the transition exists.
pub fn lookup(trigger: Trigger, from: DriveState) -> Option<DriveState> {
    TRANSITIONS
        .iter()
        .find(|t| t.trigger == trigger && t.sources.contains(from))
        .map(|t| t.target)
}
